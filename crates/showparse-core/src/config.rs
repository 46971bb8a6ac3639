//! Parser configuration
//!
//! One [`ParserConfig`] governs a parse call: how strictly the record is
//! validated, whether near-miss lines are reported, and which captured
//! tokens count as "no value". Loaded from JSON by the CLI; every field
//! has a default so partial files are fine.

use crate::{Error, Result};

/// Placeholder tokens devices print instead of a value
pub const DEFAULT_PLACEHOLDERS: &[&str] = &["Unavailable", "None", "N/A", "Incomplete"];

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Reject record keys the schema does not declare
    pub strict: bool,
    /// Report lines that start like a rule but match none
    pub report_unrecognized: bool,
    /// Captured text equal to one of these (ignoring case) stores nothing
    pub placeholders: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            strict: true,
            report_unrecognized: true,
            placeholders: DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ParserConfig {
    /// Parse a JSON configuration document
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }

    pub fn is_placeholder(&self, text: &str) -> bool {
        let text = text.trim();
        self.placeholders.iter().any(|p| p.eq_ignore_ascii_case(text))
    }
}
