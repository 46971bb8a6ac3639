//! Per-command parsers
//!
//! A [`CommandParser`] bundles everything one show command needs: the
//! command template, the ordered rule set, and the schema its record must
//! satisfy.
//!
//! # Pipeline
//!
//! `params → template → device.execute → blank check → line engine → validator`

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::ParserConfig;
use crate::device::Device;
use crate::engine::{self, Cursor, Diagnostic, RuleSet};
use crate::path::KeyPath;
use crate::schema::Schema;
use crate::validator::Validator;
use crate::value::Record;
use crate::{Error, Result};

/// Call-time values for a template's `{placeholders}`
pub type Params = BTreeMap<String, String>;

/// Slot holding the entity path of a [`CommandParser::keyed_by`] parser
pub const KEY_SLOT: &str = "key";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?P<name>\w+)\}").expect("static regex must compile"));

// ── Command Templates ─────────────────────────────────────

/// A command string with named placeholders, e.g.
/// `show controllers optics {port}`
#[derive(Debug, Clone)]
pub struct CommandTemplate {
    text: &'static str,
    matcher: Regex,
    placeholders: Vec<String>,
}

impl CommandTemplate {
    pub fn new(text: &'static str) -> Self {
        let mut pattern = String::from("(?i)^");
        let mut placeholders = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
                continue;
            };
            pattern.push_str(&literal_pattern(&text[last..whole.start()]));
            pattern.push_str(&format!(r"(?P<{}>\S+)", name.as_str()));
            placeholders.push(name.as_str().to_string());
            last = whole.end();
        }
        pattern.push_str(&literal_pattern(&text[last..]));
        pattern.push('$');

        CommandTemplate {
            text,
            matcher: Regex::new(&pattern).expect("command template must compile"),
            placeholders,
        }
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Fill placeholders from `params`
    ///
    /// # Errors
    /// `MissingParameter` naming the first placeholder without a value.
    pub fn format(&self, params: &Params) -> Result<String> {
        if let Some(missing) = self.placeholders.iter().find(|p| !params.contains_key(*p)) {
            return Err(Error::MissingParameter {
                command: self.text.to_string(),
                name: missing.clone(),
            });
        }
        let command = PLACEHOLDER.replace_all(self.text, |caps: &regex::Captures| {
            params
                .get(&caps["name"])
                .cloned()
                .unwrap_or_default()
        });
        Ok(command.into_owned())
    }

    /// Match a concrete command back to its parameters
    pub fn matches(&self, command: &str) -> Option<Params> {
        let caps = self.matcher.captures(command.trim())?;
        Some(
            self.placeholders
                .iter()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}

fn literal_pattern(literal: &str) -> String {
    regex::escape(literal).replace(' ', r"\s+")
}

// ── Parsers ───────────────────────────────────────────────

/// A validated parse result plus the scan diagnostics behind it
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub command: String,
    pub record: Record,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parser for one device command
#[derive(Debug, Clone)]
pub struct CommandParser {
    template: CommandTemplate,
    rules: RuleSet,
    schema: Schema,
    keyed_by: Option<&'static str>,
}

impl CommandParser {
    pub fn new(template: &'static str, rules: RuleSet, schema: impl Into<Schema>) -> Self {
        CommandParser {
            template: CommandTemplate::new(template),
            rules,
            schema: schema.into(),
            keyed_by: None,
        }
    }

    /// Start the scan below the value of a command parameter, for commands
    /// whose output never repeats the entity it describes. The entity path
    /// is also recorded in the [`KEY_SLOT`] slot.
    pub fn keyed_by(mut self, param: &'static str) -> Self {
        self.keyed_by = Some(param);
        self
    }

    pub fn template(&self) -> &CommandTemplate {
        &self.template
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Execute the command on `device` and return the validated record
    pub fn parse(&self, device: &dyn Device, params: &Params) -> Result<Record> {
        self.run(device, params, &ParserConfig::default())
            .map(|parsed| parsed.record)
    }

    /// Execute the command on `device` with an explicit configuration
    pub fn run(
        &self,
        device: &dyn Device,
        params: &Params,
        config: &ParserConfig,
    ) -> Result<Parsed> {
        let command = self.template.format(params)?;
        let output = device.execute(&command)?;
        self.parse_output(&command, &output, params, config)
    }

    /// Parse output already fetched for `command`
    ///
    /// # Errors
    /// - `EmptyParser` when `output` is blank; no rule is evaluated
    /// - `Coercion` / `PathConflict` / `UnsetSlot` / `EmptyKey` for rule defects
    /// - `Validation` when the record does not satisfy the schema
    pub fn parse_output(
        &self,
        command: &str,
        output: &str,
        params: &Params,
        config: &ParserConfig,
    ) -> Result<Parsed> {
        if output.trim().is_empty() {
            return Err(Error::EmptyParser {
                command: command.to_string(),
            });
        }
        debug!(command, lines = output.lines().count(), "parsing");

        let scan = engine::parse_lines(output.lines(), &self.rules, self.start(params)?, config)?;
        Validator::new(config.strict).validate(&self.schema, &scan.record)?;

        debug!(command, diagnostics = scan.diagnostics.len(), "parsed");
        Ok(Parsed {
            command: command.to_string(),
            record: scan.record,
            diagnostics: scan.diagnostics,
        })
    }

    fn start(&self, params: &Params) -> Result<Cursor> {
        match self.keyed_by {
            None => Ok(Cursor::new()),
            Some(param) => {
                let key = params.get(param).ok_or_else(|| Error::MissingParameter {
                    command: self.template.text().to_string(),
                    name: param.to_string(),
                })?;
                Ok(Cursor::new().descended(KeyPath::root().child(key.as_str()), Some(KEY_SLOT)))
            }
        }
    }
}

/// Build a parameter map from `(name, value)` pairs
pub fn params<const N: usize>(pairs: [(&str, &str); N]) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{FixtureDevice, MapDevice};
    use crate::engine::rule::assign;
    use crate::engine::{Coerce, Rule};
    use crate::error::{DeviceError, ValidationError};
    use crate::schema::{integer, record, table};
    use std::cell::Cell;

    fn counter_parser() -> CommandParser {
        CommandParser::new(
            "show counters {port}",
            RuleSet::new(vec![
                Rule::new("rx", r"^Rx:\s*(?P<rx>\S+)$").step(assign("rx", Coerce::Int)),
                Rule::new("tx", r"^Tx:\s*(?P<tx>\S+)$").step(assign("tx", Coerce::Int)),
            ]),
            table(record().required("rx", integer()).optional("tx", integer())),
        )
        .keyed_by("port")
    }

    /// Counts executions so tests can assert short-circuiting
    struct CountingDevice {
        output: &'static str,
        calls: Cell<usize>,
    }

    impl Device for CountingDevice {
        fn execute(&self, _command: &str) -> std::result::Result<String, DeviceError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.output.to_string())
        }
    }

    // ── Templates ──────────────────────────────────────

    #[test]
    fn test_template_format() {
        let t = CommandTemplate::new("show controllers optics {port}");
        assert_eq!(t.placeholders(), &["port".to_string()]);
        assert_eq!(
            t.format(&params([("port", "0/0/0/0")])).unwrap(),
            "show controllers optics 0/0/0/0"
        );
    }

    #[test]
    fn test_template_missing_param() {
        let t = CommandTemplate::new("show controllers optics {port}");
        assert_eq!(
            t.format(&Params::new()),
            Err(Error::MissingParameter {
                command: "show controllers optics {port}".into(),
                name: "port".into(),
            })
        );
    }

    #[test]
    fn test_template_matches_command() {
        let t = CommandTemplate::new("show controllers coherentDSP {port}");
        assert_eq!(
            t.matches("  show controllers  coherentdsp 0/1/0/0 "),
            Some(params([("port", "0/1/0/0")]))
        );
        assert_eq!(t.matches("show controllers optics 0/1/0/0"), None);
    }

    #[test]
    fn test_template_without_placeholders() {
        let t = CommandTemplate::new("show lldp traffic");
        assert_eq!(t.matches("show lldp traffic"), Some(Params::new()));
        assert_eq!(t.matches("show lldp"), None);
        assert_eq!(t.format(&Params::new()).unwrap(), "show lldp traffic");
    }

    // ── Parse pipeline ─────────────────────────────────

    #[test]
    fn test_parse_keyed_by_param() {
        let device = MapDevice::new().with("show counters 1/1", "Rx: 10\nTx: 0x20\n");
        let record = counter_parser()
            .parse(&device, &params([("port", "1/1")]))
            .unwrap();
        assert_eq!(
            crate::value::record_to_json(&record),
            serde_json::json!({"1/1": {"rx": 10, "tx": 32}})
        );
    }

    #[test]
    fn test_blank_output_fails_before_rules() {
        let device = CountingDevice {
            output: "  \n\t\n",
            calls: Cell::new(0),
        };
        let err = counter_parser()
            .parse(&device, &params([("port", "1/1")]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::EmptyParser {
                command: "show counters 1/1".into()
            }
        );
        assert_eq!(device.calls.get(), 1);
    }

    #[test]
    fn test_unmatched_output_is_empty_result() {
        let parser = CommandParser::new(
            "show counters",
            counter_parser().rules().clone(),
            record().required("rx", integer()),
        );
        let err = parser
            .parse(&FixtureDevice::new("nothing useful here"), &Params::new())
            .unwrap_err();
        assert!(err.is_empty_result());
    }

    #[test]
    fn test_schema_mismatch_propagates() {
        let err = counter_parser()
            .parse(&FixtureDevice::new("Tx: 5"), &params([("port", "1/1")]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::Validation(ValidationError::MissingRequiredKey {
                path: KeyPath::root().child("1/1"),
                key: "rx".into(),
            })
        );
    }

    #[test]
    fn test_device_error_propagates() {
        let err = counter_parser()
            .parse(&MapDevice::new(), &params([("port", "9")]))
            .unwrap_err();
        assert!(matches!(err, Error::Device(DeviceError::NoOutput(_))));
    }

    #[test]
    fn test_missing_param_fails_before_execute() {
        let device = CountingDevice {
            output: "Rx: 1",
            calls: Cell::new(0),
        };
        assert!(counter_parser().parse(&device, &Params::new()).is_err());
        assert_eq!(device.calls.get(), 0);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let device = FixtureDevice::new("Rx: 10\nTx: 20\n");
        let p = params([("port", "1/1")]);
        let first = counter_parser().parse(&device, &p).unwrap();
        for _ in 0..100 {
            assert_eq!(counter_parser().parse(&device, &p).unwrap(), first);
        }
    }
}
