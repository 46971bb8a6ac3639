//! Built-in command parsers
//!
//! Each parser is a lazily built static: rules compile once on first use
//! and are shared read-only afterwards, so a parser can be used from any
//! number of threads at once.

pub mod arp;
pub mod controllers;
pub mod lldp;

use crate::command::CommandParser;

pub use arp::ARP;
pub use controllers::{COHERENT_DSP, OPTICS};
pub use lldp::{LLDP, LLDP_NEIGHBORS_DETAIL, LLDP_TRAFFIC};

/// Every built-in parser, in registration order
pub fn all() -> Vec<&'static CommandParser> {
    vec![
        &*LLDP,
        &*LLDP_TRAFFIC,
        &*LLDP_NEIGHBORS_DETAIL,
        &*COHERENT_DSP,
        &*OPTICS,
        &*ARP,
    ]
}
