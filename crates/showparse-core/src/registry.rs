//! Command registry — maps concrete command strings to parsers

use tracing::debug;

use crate::command::{CommandParser, Params, Parsed};
use crate::config::ParserConfig;
use crate::device::Device;
use crate::{parsers, Error, Result};

/// An ordered set of command parsers
#[derive(Debug, Clone, Default)]
pub struct Registry<'a> {
    parsers: Vec<&'a CommandParser>,
}

impl<'a> Registry<'a> {
    pub fn new() -> Self {
        Registry {
            parsers: Vec::new(),
        }
    }

    pub fn register(&mut self, parser: &'a CommandParser) -> &mut Self {
        self.parsers.push(parser);
        self
    }

    /// Parser and parameters for a concrete command such as
    /// `show controllers optics 0/0/0/0`
    ///
    /// # Errors
    /// `UnknownCommand` when no registered template matches.
    pub fn lookup(&self, command: &str) -> Result<(&'a CommandParser, Params)> {
        self.parsers
            .iter()
            .find_map(|p| p.template().matches(command).map(|params| (*p, params)))
            .ok_or_else(|| Error::UnknownCommand(command.trim().to_string()))
    }

    /// Parser registered under exactly this template text
    pub fn get(&self, template: &str) -> Option<&'a CommandParser> {
        self.parsers
            .iter()
            .copied()
            .find(|p| p.template().text() == template)
    }

    /// Template texts, in registration order
    pub fn commands(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.template().text()).collect()
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Look up `command`, execute it on `device` and parse the output
    pub fn parse(
        &self,
        device: &dyn Device,
        command: &str,
        config: &ParserConfig,
    ) -> Result<Parsed> {
        let (parser, params) = self.lookup(command)?;
        debug!(template = parser.template().text(), "dispatch");
        parser.run(device, &params, config)
    }

    /// Parse output already captured for `command`
    pub fn parse_output(
        &self,
        command: &str,
        output: &str,
        config: &ParserConfig,
    ) -> Result<Parsed> {
        let (parser, params) = self.lookup(command)?;
        let command = parser.template().format(&params)?;
        parser.parse_output(&command, output, &params, config)
    }
}

/// Registry of every built-in parser
pub fn builtin() -> Registry<'static> {
    Registry {
        parsers: parsers::all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::params;
    use crate::device::MapDevice;
    use crate::engine::rule::assign;
    use crate::engine::{Coerce, Rule, RuleSet};
    use crate::schema::{integer, record};

    #[test]
    fn test_builtin_commands() {
        assert_eq!(
            builtin().commands(),
            vec![
                "show lldp",
                "show lldp traffic",
                "show lldp neighbors detail",
                "show controllers coherentDSP {port}",
                "show controllers optics {port}",
                "show arp",
            ]
        );
    }

    #[test]
    fn test_lookup_extracts_params() {
        let registry = builtin();
        let (parser, p) = registry.lookup("show controllers optics 0/0/0/3").unwrap();
        assert_eq!(parser.template().text(), "show controllers optics {port}");
        assert_eq!(p, params([("port", "0/0/0/3")]));
    }

    #[test]
    fn test_lookup_is_exact_per_template() {
        let registry = builtin();
        let (lldp, _) = registry.lookup("show lldp").unwrap();
        let (traffic, _) = registry.lookup("SHOW LLDP TRAFFIC").unwrap();
        assert_eq!(lldp.template().text(), "show lldp");
        assert_eq!(traffic.template().text(), "show lldp traffic");
    }

    #[test]
    fn test_lookup_unknown_command() {
        assert_eq!(
            builtin().lookup("show version").unwrap_err(),
            Error::UnknownCommand("show version".into())
        );
    }

    #[test]
    fn test_get_by_template() {
        assert!(builtin().get("show arp").is_some());
        assert!(builtin().get("show arp detail").is_none());
    }

    #[test]
    fn test_custom_registry_parse() {
        let parser = CommandParser::new(
            "show uptime",
            RuleSet::new(vec![Rule::new("uptime", r"^Uptime:\s*(?P<seconds>\d+)$")
                .step(assign("seconds", Coerce::Int))]),
            record().required("seconds", integer()),
        );
        let mut registry = Registry::new();
        registry.register(&parser);
        assert_eq!(registry.len(), 1);

        let device = MapDevice::new().with("show uptime", "Uptime: 42\n");
        let parsed = registry
            .parse(&device, "show uptime", &ParserConfig::default())
            .unwrap();
        assert_eq!(parsed.command, "show uptime");
        assert_eq!(
            crate::value::record_to_json(&parsed.record),
            serde_json::json!({"seconds": 42})
        );
    }

    #[test]
    fn test_parse_output_with_builtin() {
        let parsed = builtin()
            .parse_output(
                "show lldp",
                "Status: ACTIVE\n",
                &ParserConfig::default(),
            )
            .unwrap();
        assert_eq!(
            crate::value::record_to_json(&parsed.record),
            serde_json::json!({"enabled": true, "status": "active"})
        );
    }
}
