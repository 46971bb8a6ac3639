//! Execution capability — where raw command output comes from
//!
//! The core never talks to a device itself. Callers hand parsers anything
//! implementing [`Device`]: a live session wrapper, or one of the canned
//! fixtures below for tests and offline parsing.

use std::collections::BTreeMap;

use crate::error::DeviceError;

/// Runs a command and returns its textual output
pub trait Device {
    fn execute(&self, command: &str) -> Result<String, DeviceError>;
}

impl<D: Device + ?Sized> Device for &D {
    fn execute(&self, command: &str) -> Result<String, DeviceError> {
        (**self).execute(command)
    }
}

/// Returns the same output for every command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureDevice {
    output: String,
}

impl FixtureDevice {
    pub fn new(output: impl Into<String>) -> Self {
        FixtureDevice {
            output: output.into(),
        }
    }
}

impl Device for FixtureDevice {
    fn execute(&self, _command: &str) -> Result<String, DeviceError> {
        Ok(self.output.clone())
    }
}

/// Returns canned output per exact command string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapDevice {
    outputs: BTreeMap<String, String>,
}

impl MapDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: &str, output: impl Into<String>) -> Self {
        self.outputs.insert(command.to_string(), output.into());
        self
    }
}

impl Device for MapDevice {
    fn execute(&self, command: &str) -> Result<String, DeviceError> {
        self.outputs
            .get(command)
            .cloned()
            .ok_or_else(|| DeviceError::NoOutput(command.to_string()))
    }
}
