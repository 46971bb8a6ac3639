//! Python bindings for showparse
//!
//! Thin wrapper around `showparse-core`; no parsing logic lives here.
//! Records cross the boundary as JSON strings.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use showparse_core::value::record_to_json;
use showparse_core::ParserConfig;

/// Parse captured show-command output and return the record as JSON.
///
/// Args:
///     command: Concrete command, e.g. "show controllers optics 0/0/0/0"
///     text: Output the device printed for that command
///     strict: Reject keys the schema does not declare (default True)
///
/// Returns:
///     JSON string of the validated record
///
/// Raises:
///     ValueError: Unknown command, blank output, rule defect, or a
///         record that does not satisfy the command's schema
#[pyfunction]
#[pyo3(signature = (command, text, strict = true))]
fn parse(command: &str, text: &str, strict: bool) -> PyResult<String> {
    let config = ParserConfig {
        strict,
        ..ParserConfig::default()
    };
    let parsed = showparse_core::builtin()
        .parse_output(command, text, &config)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    serde_json::to_string_pretty(&record_to_json(&parsed.record))
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// Supported command templates.
#[pyfunction]
fn commands() -> Vec<&'static str> {
    showparse_core::builtin().commands()
}

/// Schema of a command's record as JSON.
///
/// Args:
///     command: Command template or concrete command
///
/// Raises:
///     ValueError: If no parser handles the command
#[pyfunction]
fn schema(command: &str) -> PyResult<String> {
    let registry = showparse_core::builtin();
    let parser = match registry.get(command) {
        Some(parser) => parser,
        None => {
            registry
                .lookup(command)
                .map_err(|e| PyValueError::new_err(e.to_string()))?
                .0
        }
    };
    serde_json::to_string_pretty(&parser.schema().to_json())
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// SHA-256 fingerprint of the record parsed from `text`.
#[pyfunction]
fn fingerprint(command: &str, text: &str) -> PyResult<String> {
    let parsed = showparse_core::builtin()
        .parse_output(command, text, &ParserConfig::default())
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(showparse_core::canonical::fingerprint(&parsed.record))
}

/// showparse Python module — schema-validated show-command parsing
#[pymodule]
fn showparse(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(commands, m)?)?;
    m.add_function(wrap_pyfunction!(schema, m)?)?;
    m.add_function(wrap_pyfunction!(fingerprint, m)?)?;
    Ok(())
}
