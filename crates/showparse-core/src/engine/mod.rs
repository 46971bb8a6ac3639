//! Line-pattern engine — folds matched lines into a nested record
//!
//! # Architecture
//!
//! ```text
//! text → lines → first matching Rule → Steps → Record
//!                      ↓ (no match)
//!              text block? → append line
//!              near miss?  → Diagnostic (scan continues)
//! ```
//!
//! The scan is a single forward pass. All accumulation state (record,
//! cursor, open text block, diagnostics) lives in one [`Scanner`] created
//! per call and dropped at the end, so nothing is shared across calls.

pub mod coerce;
pub mod cursor;
pub mod rule;

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::path::KeyPath;
use crate::value::{Record, Value};
use crate::{Error, Result};

pub use coerce::Coerce;
pub use cursor::{Cursor, Target};
pub use rule::{KeySource, Rule, RuleSet, Step, Trim};

/// `NAME = value` pairs, as printed in alarm counter grids
static PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<name>[A-Za-z][\w-]*)\s*=\s*(?P<value>[^\s=]+)")
        .expect("static regex must compile")
});

// ── Scan Result Types ─────────────────────────────────────

/// A line that looked relevant but matched no rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    /// The line as matched (after trimming)
    pub text: String,
    /// Rule whose literal prefix the line starts with
    pub near: &'static str,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "warning [unrecognized] at line {}: {:?} (resembles rule '{}')",
            self.line, self.text, self.near
        )
    }
}

/// Output of one scan: the accumulated record plus diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scan {
    pub record: Record,
    pub diagnostics: Vec<Diagnostic>,
}

// ── Public API ────────────────────────────────────────────

/// Scan `lines` once, in order, applying the first matching rule to each.
///
/// # Errors
/// Fails on rule defects only: a capture that cannot be coerced to its
/// declared type, a write through a non-mapping, an unset slot, or a
/// descend whose key captured nothing.
/// Unmatched lines never fail the scan.
pub fn parse_lines<'a, I>(
    lines: I,
    rules: &RuleSet,
    cursor: Cursor,
    config: &ParserConfig,
) -> Result<Scan>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scanner = Scanner {
        rules,
        config,
        cursor,
        record: Record::new(),
        text: None,
        diagnostics: Vec::new(),
    };
    for (index, raw) in lines.into_iter().enumerate() {
        scanner.feed(index + 1, raw)?;
    }
    scanner.flush_text();
    Ok(Scan {
        record: scanner.record,
        diagnostics: scanner.diagnostics,
    })
}

/// Convenience wrapper: split `text` into lines and scan from the root
pub fn parse_text(text: &str, rules: &RuleSet, config: &ParserConfig) -> Result<Scan> {
    parse_lines(text.lines(), rules, Cursor::new(), config)
}

// ── Scanner ───────────────────────────────────────────────

/// An open multi-line text block
#[derive(Debug)]
struct TextBlock {
    path: KeyPath,
    field: &'static str,
    lines: Vec<String>,
}

struct Scanner<'s> {
    rules: &'s RuleSet,
    config: &'s ParserConfig,
    cursor: Cursor,
    record: Record,
    text: Option<TextBlock>,
    diagnostics: Vec<Diagnostic>,
}

impl Scanner<'_> {
    fn feed(&mut self, line_no: usize, raw: &str) -> Result<()> {
        let rules = self.rules;
        let line = rules.trim().apply(raw);
        if line.trim().is_empty() {
            self.flush_text();
            return Ok(());
        }

        if let Some((rule, caps)) = rules.first_match(line) {
            self.flush_text();
            debug!(rule = rule.name(), line = line_no, "matched");
            return self.apply(rule, &caps, line, line_no);
        }

        if let Some(block) = self.text.as_mut() {
            block.lines.push(raw.trim_end().to_string());
            return Ok(());
        }

        if self.config.report_unrecognized {
            if let Some(near) = rules.near_miss(line) {
                warn!(line = line_no, rule = near.name(), text = %line, "unrecognized line");
                self.diagnostics.push(Diagnostic {
                    line: line_no,
                    text: line.to_string(),
                    near: near.name(),
                });
            }
        }
        Ok(())
    }

    fn apply(&mut self, rule: &Rule, caps: &Captures, line: &str, line_no: usize) -> Result<()> {
        for step in rule.steps() {
            match step {
                Step::Assign {
                    target,
                    field,
                    group,
                    coerce,
                } => {
                    let captured = self.capture(caps, group, coerce, rule, field, line_no)?;
                    let Some(value) = captured else {
                        continue;
                    };
                    let path = self.resolve(*target, rule, line_no)?;
                    self.mapping_at(&path, rule, line_no)?
                        .insert(field.to_string(), value);
                }
                Step::Set {
                    target,
                    field,
                    value,
                } => {
                    let path = self.resolve(*target, rule, line_no)?;
                    self.mapping_at(&path, rule, line_no)?
                        .insert(field.to_string(), value.clone());
                }
                Step::Descend {
                    from,
                    under,
                    key,
                    slot,
                } => {
                    let key = match key {
                        KeySource::Group(group) => caps
                            .name(group)
                            .map(|m| m.as_str().trim())
                            .filter(|k| !k.is_empty())
                            .ok_or_else(|| Error::EmptyKey {
                                line: line_no,
                                rule: rule.name().to_string(),
                                group: group.to_string(),
                            })?
                            .to_string(),
                        KeySource::Literal(name) => name.to_string(),
                    };
                    let mut path = self.resolve(*from, rule, line_no)?;
                    for segment in under.iter() {
                        path = path.child(*segment);
                    }
                    let path = path.child(key);
                    self.mapping_at(&path, rule, line_no)?;
                    self.cursor = self.cursor.descended(path, *slot);
                }
                Step::Restore { slot } => {
                    self.cursor = self.cursor.restored(slot).ok_or_else(|| Error::UnsetSlot {
                        line: line_no,
                        rule: rule.name().to_string(),
                        slot: slot.to_string(),
                    })?;
                }
                Step::Append {
                    target,
                    field,
                    group,
                    coerce,
                } => {
                    let captured = self.capture(caps, group, coerce, rule, field, line_no)?;
                    let Some(value) = captured else {
                        continue;
                    };
                    let path = self.resolve(*target, rule, line_no)?;
                    let mapping = self.mapping_at(&path, rule, line_no)?;
                    match mapping
                        .entry(field.to_string())
                        .or_insert_with(|| Value::Array(Vec::new()))
                    {
                        Value::Array(items) => items.push(value),
                        _ => {
                            return Err(Error::PathConflict {
                                line: line_no,
                                rule: rule.name().to_string(),
                                path: path.child(*field),
                            })
                        }
                    }
                }
                Step::Pairs { target, coerce } => {
                    let path = self.resolve(*target, rule, line_no)?;
                    for pair in PAIR.captures_iter(line) {
                        let name = pair["name"].to_lowercase().replace('-', "_");
                        let text = &pair["value"];
                        if self.config.is_placeholder(text) {
                            continue;
                        }
                        let value = coerce.apply(text).ok_or_else(|| Error::Coercion {
                            line: line_no,
                            rule: rule.name().to_string(),
                            field: name.clone(),
                            text: text.to_string(),
                            target: coerce.target_name().to_string(),
                        })?;
                        self.mapping_at(&path, rule, line_no)?.insert(name, value);
                    }
                }
                Step::BeginText {
                    target,
                    field,
                    group,
                } => {
                    let path = self.resolve(*target, rule, line_no)?;
                    self.mapping_at(&path, rule, line_no)?;
                    let first = group
                        .and_then(|g| caps.name(g))
                        .map(|m| m.as_str().trim())
                        .filter(|s| !s.is_empty());
                    self.text = Some(TextBlock {
                        path,
                        field,
                        lines: first.map(|s| vec![s.to_string()]).unwrap_or_default(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Read and coerce a capture group.
    ///
    /// `Ok(None)` when there is nothing to store: the group did not
    /// participate, captured only whitespace, or captured a placeholder.
    fn capture(
        &self,
        caps: &Captures,
        group: &str,
        coerce: &Coerce,
        rule: &Rule,
        field: &str,
        line_no: usize,
    ) -> Result<Option<Value>> {
        let text = caps.name(group).map(|m| m.as_str().trim());
        if *coerce == Coerce::Present {
            return Ok(Some(Value::Boolean(text.is_some())));
        }
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        if self.config.is_placeholder(text) {
            debug!(rule = rule.name(), field, text, "placeholder skipped");
            return Ok(None);
        }
        coerce
            .apply(text)
            .map(Some)
            .ok_or_else(|| Error::Coercion {
                line: line_no,
                rule: rule.name().to_string(),
                field: field.to_string(),
                text: text.to_string(),
                target: coerce.target_name().to_string(),
            })
    }

    fn resolve(&self, target: Target, rule: &Rule, line_no: usize) -> Result<KeyPath> {
        self.cursor.resolve(target).ok_or_else(|| match target {
            Target::Slot(slot) => Error::UnsetSlot {
                line: line_no,
                rule: rule.name().to_string(),
                slot: slot.to_string(),
            },
            // Root and Current always resolve
            _ => Error::PathConflict {
                line: line_no,
                rule: rule.name().to_string(),
                path: KeyPath::root(),
            },
        })
    }

    /// Get or create the mapping at `path`
    fn mapping_at(&mut self, path: &KeyPath, rule: &Rule, line_no: usize) -> Result<&mut Record> {
        mapping_at(&mut self.record, path).ok_or_else(|| Error::PathConflict {
            line: line_no,
            rule: rule.name().to_string(),
            path: path.clone(),
        })
    }

    fn flush_text(&mut self) {
        let Some(block) = self.text.take() else {
            return;
        };
        if block.lines.is_empty() {
            return;
        }
        if let Some(mapping) = mapping_at(&mut self.record, &block.path) {
            mapping.insert(block.field.to_string(), Value::String(block.lines.join("\n")));
        }
    }
}

/// Walk `path` from `record`, creating empty mappings along the way.
/// `None` if a non-mapping value sits on the path.
fn mapping_at<'r>(record: &'r mut Record, path: &KeyPath) -> Option<&'r mut Record> {
    let mut mapping = record;
    for segment in path.segments() {
        match mapping
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Record::new()))
        {
            Value::Object(inner) => mapping = inner,
            _ => return None,
        }
    }
    Some(mapping)
}

// ── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::rule::{append, assign, descend, pairs, restore, section, set, text};
    use super::*;
    use crate::value::record_to_json;

    fn scan(input: &str, rules: &RuleSet) -> Scan {
        parse_text(input, rules, &ParserConfig::default()).unwrap()
    }

    fn json(scan: &Scan) -> serde_json::Value {
        record_to_json(&scan.record)
    }

    fn table_rules() -> RuleSet {
        RuleSet::new(vec![
            Rule::new("entry", r"^Entry:\s*(?P<name>\S+)$")
                .step(descend(&["entries"], "name").slot("entry")),
            Rule::new("value", r"^Value:\s*(?P<value>\S+)$").step(assign("value", Coerce::Int)),
            Rule::new("alarms", r"^Alarms:$").step(section(Target::Slot("entry"), "alarms")),
            Rule::new("alarm", r"^Alarm\s+(?P<alarm>\S+)$")
                .step(append("names", Coerce::Str).group("alarm")),
            Rule::new("back", r"^End alarms$").step(restore("entry")),
            Rule::new("note", r"^Note:\s*(?P<note>\S+)$").step(assign("note", Coerce::Str)),
            Rule::new("total", r"^Total:\s*(?P<total>\d+)$")
                .step(assign("total", Coerce::Int).at(Target::Root)),
        ])
    }

    // ── Assign / coerce ────────────────────────────────

    #[test]
    fn test_assign_last_match_wins() {
        let rules = RuleSet::new(vec![
            Rule::new("v", r"^Value:\s*(?P<value>\S+)$").step(assign("value", Coerce::Int))
        ]);
        let s = scan("Value: 1\nValue: 0x10\n", &rules);
        assert_eq!(json(&s), serde_json::json!({"value": 16}));
    }

    #[test]
    fn test_coercion_failure_is_fatal() {
        let rules = RuleSet::new(vec![
            Rule::new("v", r"^Value:\s*(?P<value>\S+)$").step(assign("value", Coerce::Int))
        ]);
        let err = parse_text("Value: 1\nValue: ten", &rules, &ParserConfig::default()).unwrap_err();
        assert_eq!(
            err,
            Error::Coercion {
                line: 2,
                rule: "v".into(),
                field: "value".into(),
                text: "ten".into(),
                target: "integer".into(),
            }
        );
    }

    #[test]
    fn test_placeholder_stores_nothing() {
        let rules = RuleSet::new(vec![
            Rule::new("v", r"^Value:\s*(?P<value>\S+)$").step(assign("value", Coerce::Int))
        ]);
        let s = scan("Value: Unavailable", &rules);
        assert!(s.record.is_empty());
    }

    #[test]
    fn test_status_token_normalised_and_flag_derived() {
        let rules = RuleSet::new(vec![Rule::new("status", r"^Status:\s*(?P<status>\w+)$")
            .step(assign("status", Coerce::Lower))
            .step(assign("enabled", Coerce::Flag(&["active"])).group("status"))]);
        let s = scan("Status: ACTIVE", &rules);
        assert_eq!(json(&s), serde_json::json!({"status": "active", "enabled": true}));
    }

    #[test]
    fn test_present_flag_from_optional_group() {
        let rules = RuleSet::new(vec![Rule::new(
            "auto",
            r"^Auto Negotiation - (?P<supported>supported)?(?:not supported)?,\s*(?P<enabled>enabled)?",
        )
        .step(assign("supported", Coerce::Present))
        .step(assign("enabled", Coerce::Present))]);
        let s = scan("Auto Negotiation - not supported, disabled", &rules);
        assert_eq!(json(&s), serde_json::json!({"supported": false, "enabled": false}));
        let s = scan("Auto Negotiation - supported, enabled", &rules);
        assert_eq!(json(&s), serde_json::json!({"supported": true, "enabled": true}));
    }

    #[test]
    fn test_set_constant() {
        let rules = RuleSet::new(vec![
            Rule::new("static", r"^static entry$").step(set("origin", "static"))
        ]);
        assert_eq!(json(&scan("static entry", &rules)), serde_json::json!({"origin": "static"}));
    }

    // ── Descend / sections ─────────────────────────────

    #[test]
    fn test_descend_creates_keyed_entries() {
        let s = scan(
            "Entry: a\nValue: 1\nEntry: b\nValue: 2\nTotal: 2\n",
            &table_rules(),
        );
        assert_eq!(
            json(&s),
            serde_json::json!({
                "entries": {"a": {"value": 1}, "b": {"value": 2}},
                "total": 2,
            })
        );
    }

    #[test]
    fn test_descend_reuses_existing_entry() {
        let s = scan("Entry: a\nValue: 1\nEntry: b\nEntry: a\nNote: x\n", &table_rules());
        assert_eq!(
            json(&s),
            serde_json::json!({"entries": {"a": {"value": 1, "note": "x"}, "b": {}}})
        );
    }

    #[test]
    fn test_sections_and_append_per_entry() {
        let input = "\
Entry: a
Alarms:
Alarm LOS
Alarm LOF
End alarms
Value: 7
Entry: b
Alarms:
Alarm AIS
";
        let s = scan(input, &table_rules());
        assert_eq!(
            json(&s),
            serde_json::json!({
                "entries": {
                    "a": {"value": 7, "alarms": {"names": ["LOS", "LOF"]}},
                    "b": {"alarms": {"names": ["AIS"]}},
                }
            })
        );
    }

    #[test]
    fn test_sibling_entries_do_not_share_state() {
        let s = scan("Entry: a\nValue: 1\nEntry: b\nNote: only-b\n", &table_rules());
        let entries = s.record["entries"].as_object().unwrap();
        assert!(entries["a"].as_object().unwrap().get("note").is_none());
        assert!(entries["b"].as_object().unwrap().get("value").is_none());
    }

    #[test]
    fn test_section_from_unset_slot_fails() {
        let err = parse_text("Alarms:", &table_rules(), &ParserConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnsetSlot { line: 1, .. }));
    }

    #[test]
    fn test_empty_section_is_kept_and_validates_as_optional() {
        use crate::schema::{integer, list_of, record, string, table};
        use crate::validator::validate;

        let s = scan("Entry: a\nValue: 1\nAlarms:\n", &table_rules());
        assert_eq!(
            json(&s),
            serde_json::json!({"entries": {"a": {"value": 1, "alarms": {}}}})
        );
        let schema = record().required(
            "entries",
            table(
                record()
                    .optional("value", integer())
                    .optional("alarms", table(list_of(string()))),
            ),
        );
        assert!(validate(&schema.into(), &s.record).is_ok());
    }

    #[test]
    fn test_blank_descend_key_is_fatal() {
        let rules = RuleSet::new(vec![
            Rule::new("entry", r"^Entry:\s*(?P<name>\S*)$")
                .step(descend(&["entries"], "name")),
            Rule::new("value", r"^Value:\s*(?P<value>\d+)$").step(assign("value", Coerce::Int)),
        ]);
        let input = "Entry: a\nValue: 1\nEntry:\nValue: 2";
        let err = parse_text(input, &rules, &ParserConfig::default()).unwrap_err();
        assert_eq!(
            err,
            Error::EmptyKey {
                line: 3,
                rule: "entry".into(),
                group: "name".into(),
            }
        );
    }

    #[test]
    fn test_append_onto_scalar_is_path_conflict() {
        let rules = RuleSet::new(vec![
            Rule::new("one", r"^One (?P<x>\S+)$").step(assign("x", Coerce::Str)),
            Rule::new("many", r"^Many (?P<x>\S+)$").step(append("x", Coerce::Str)),
        ]);
        let err = parse_text("One a\nMany b", &rules, &ParserConfig::default()).unwrap_err();
        assert!(matches!(err, Error::PathConflict { line: 2, .. }));
    }

    #[test]
    fn test_initial_cursor_is_honoured() {
        let rules = RuleSet::new(vec![
            Rule::new("v", r"^Value:\s*(?P<value>\d+)$").step(assign("value", Coerce::Int))
        ]);
        let start = Cursor::at(KeyPath::root().child("port").child("0/0/0/0"));
        let s = parse_lines(["Value: 3"], &rules, start, &ParserConfig::default()).unwrap();
        assert_eq!(json(&s), serde_json::json!({"port": {"0/0/0/0": {"value": 3}}}));
    }

    // ── Pairs ──────────────────────────────────────────

    #[test]
    fn test_pairs_on_one_line() {
        let rules = RuleSet::new(vec![
            Rule::new("grid", r"^\S+\s*=\s*\d+").step(pairs(Coerce::Int))
        ]);
        let s = scan("LOS = 0 LOF = 2\nFEC-UNC = 5     SD_BER = 1", &rules);
        assert_eq!(
            json(&s),
            serde_json::json!({"los": 0, "lof": 2, "fec_unc": 5, "sd_ber": 1})
        );
    }

    // ── Text blocks ────────────────────────────────────

    fn text_rules() -> RuleSet {
        RuleSet::new(vec![
            Rule::new("desc", r"^System Description:\s*(?P<text>.*)$")
                .step(text("system_description").group("text")),
            Rule::new("name", r"^System Name:\s*(?P<system_name>.+)$")
                .step(assign("system_name", Coerce::Str)),
        ])
    }

    #[test]
    fn test_text_block_ends_at_blank_line() {
        let input = "System Description: \nLine one\nLine two\n\nunrelated\n";
        let s = scan(input, &text_rules());
        assert_eq!(
            json(&s),
            serde_json::json!({"system_description": "Line one\nLine two"})
        );
    }

    #[test]
    fn test_text_block_ends_at_next_rule() {
        let input = "System Description: first\nsecond\nSystem Name: R1\nnot captured\n";
        let s = scan(input, &text_rules());
        assert_eq!(
            json(&s),
            serde_json::json!({"system_description": "first\nsecond", "system_name": "R1"})
        );
    }

    #[test]
    fn test_text_block_flushed_at_end_of_input() {
        let s = scan("System Description:\nonly line", &text_rules());
        assert_eq!(json(&s), serde_json::json!({"system_description": "only line"}));
    }

    #[test]
    fn test_empty_text_block_stores_nothing() {
        let s = scan("System Description:\n\nSystem Name: R1", &text_rules());
        assert_eq!(json(&s), serde_json::json!({"system_name": "R1"}));
    }

    // ── Diagnostics ────────────────────────────────────

    #[test]
    fn test_near_miss_reported_and_scan_continues() {
        let input = "Total: many\nValue: 4\n-----\n";
        let s = scan(input, &table_rules());
        assert_eq!(json(&s), serde_json::json!({"value": 4}));
        assert_eq!(s.diagnostics.len(), 1);
        assert_eq!(s.diagnostics[0].line, 1);
        assert_eq!(s.diagnostics[0].near, "total");
    }

    #[test]
    fn test_near_miss_inside_text_block_is_collected() {
        let input = "System Description: Cisco IOS\nsystem name: lower-case\n";
        let s = scan(input, &text_rules());
        assert_eq!(
            json(&s),
            serde_json::json!({"system_description": "Cisco IOS\nsystem name: lower-case"})
        );
        assert!(s.diagnostics.is_empty());

        let s = scan("system name: lower-case", &text_rules());
        assert!(s.record.is_empty());
        assert_eq!(s.diagnostics.len(), 1);
        assert_eq!(s.diagnostics[0].near, "name");
    }

    #[test]
    fn test_near_miss_reporting_can_be_disabled() {
        let config = ParserConfig {
            report_unrecognized: false,
            ..ParserConfig::default()
        };
        let s = parse_text("Total: many", &table_rules(), &config).unwrap();
        assert!(s.diagnostics.is_empty());
    }

    #[test]
    fn test_blank_and_noise_lines_are_ignored() {
        let s = scan("\n   \n=====\nbanner text\n", &table_rules());
        assert!(s.record.is_empty());
        assert!(s.diagnostics.is_empty());
    }

    #[test]
    fn test_scan_is_deterministic() {
        let input = "Entry: b\nValue: 2\nEntry: a\nValue: 1\nTotal: 2\n";
        let first = scan(input, &table_rules());
        for _ in 0..100 {
            assert_eq!(scan(input, &table_rules()), first);
        }
    }
}
