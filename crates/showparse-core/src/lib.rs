//! showparse core - schema-validated parsers for device show-command output
//!
//! Turns the semi-structured text network devices print for `show`
//! commands into nested records whose shape is checked against a declared
//! schema. All bindings and the CLI go through this crate.
//!
//! # Architecture
//!
//! ```text
//! Command + Params → Template → Device.execute → Text
//!                                                  ↓
//!                        Line Engine (ordered Rules + Cursor) → Record
//!                                                  ↓
//!                                    Validator (Schema) → Validated Record
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: Same text always produces an identical record
//! - **Validated**: Every returned record satisfies its parser's schema
//! - **Isolated**: Scan state lives for one call; parsers are shared read-only
//! - **Loud**: Rule defects and schema mismatches are typed errors, never defaults

pub mod canonical;
pub mod command;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod parsers;
pub mod path;
pub mod registry;
pub mod schema;
pub mod validator;
pub mod value;

pub use command::{params, CommandParser, CommandTemplate, Params, Parsed};
pub use config::ParserConfig;
pub use device::{Device, FixtureDevice, MapDevice};
pub use error::{DeviceError, Error, Result, ValidationError};
pub use path::KeyPath;
pub use registry::{builtin, Registry};
pub use schema::Schema;
pub use validator::{validate, ValidationReport, Validator};
pub use value::{Record, Value};

/// Parse captured `output` of a built-in `command` with default settings
pub fn parse_output(command: &str, output: &str) -> Result<Record> {
    builtin()
        .parse_output(command, output, &ParserConfig::default())
        .map(|parsed| parsed.record)
}
