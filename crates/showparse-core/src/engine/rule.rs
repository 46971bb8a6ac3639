//! Rules — ordered (pattern, steps) pairs
//!
//! A rule pairs one line pattern with the steps that place its captures
//! into the record. Rules are plain data declared per parser; the engine
//! loop in [`super::parse_lines`] is the only code that interprets them.
//!
//! Rule authors order rules from most to least specific: the first rule
//! whose pattern matches a line wins.

use regex::{Captures, Regex};

use super::coerce::Coerce;
use super::cursor::Target;
use crate::value::Value;

/// Where a descend step takes its key from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// The text of a named capture group (e.g. an interface name)
    Group(&'static str),
    /// A fixed key; used for section headers
    Literal(&'static str),
}

/// One placement action performed when a rule matches
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Set `field` from capture `group` (last match wins)
    Assign {
        target: Target,
        field: &'static str,
        group: &'static str,
        coerce: Coerce,
    },
    /// Set `field` to a constant
    Set {
        target: Target,
        field: &'static str,
        value: Value,
    },
    /// Create or reuse a nested mapping at `from / under... / key` and make
    /// it current, optionally recording it in a named slot
    Descend {
        from: Target,
        under: &'static [&'static str],
        key: KeySource,
        slot: Option<&'static str>,
    },
    /// Make a previously recorded slot current again
    Restore { slot: &'static str },
    /// Push a coerced capture onto the list `field`
    Append {
        target: Target,
        field: &'static str,
        group: &'static str,
        coerce: Coerce,
    },
    /// Assign every `NAME = value` pair on the line; names are lower-cased
    /// with dashes turned into underscores
    Pairs { target: Target, coerce: Coerce },
    /// Start a multi-line text block stored into `field`; the optional
    /// group supplies text from the marker line itself
    BeginText {
        target: Target,
        field: &'static str,
        group: Option<&'static str>,
    },
}

// ── Step constructors ─────────────────────────────────────

/// Assign capture `field` (same-named group) into the current mapping
pub fn assign(field: &'static str, coerce: Coerce) -> Step {
    Step::Assign {
        target: Target::Current,
        field,
        group: field,
        coerce,
    }
}

/// Set a constant into the current mapping
pub fn set(field: &'static str, value: impl Into<Value>) -> Step {
    Step::Set {
        target: Target::Current,
        field,
        value: value.into(),
    }
}

/// Descend from the root into `under... / <group text>`
pub fn descend(under: &'static [&'static str], group: &'static str) -> Step {
    Step::Descend {
        from: Target::Root,
        under,
        key: KeySource::Group(group),
        slot: None,
    }
}

/// Switch into a fixed-name section below `from`
pub fn section(from: Target, name: &'static str) -> Step {
    Step::Descend {
        from,
        under: &[],
        key: KeySource::Literal(name),
        slot: None,
    }
}

pub fn restore(slot: &'static str) -> Step {
    Step::Restore { slot }
}

/// Append capture `field` (same-named group) to the list `field`
pub fn append(field: &'static str, coerce: Coerce) -> Step {
    Step::Append {
        target: Target::Current,
        field,
        group: field,
        coerce,
    }
}

pub fn pairs(coerce: Coerce) -> Step {
    Step::Pairs {
        target: Target::Current,
        coerce,
    }
}

/// Begin a multi-line text block for `field`
pub fn text(field: &'static str) -> Step {
    Step::BeginText {
        target: Target::Current,
        field,
        group: None,
    }
}

impl Step {
    /// Retarget the step (for a descend: change where it starts from)
    pub fn at(mut self, to: Target) -> Self {
        match &mut self {
            Step::Assign { target, .. }
            | Step::Set { target, .. }
            | Step::Append { target, .. }
            | Step::Pairs { target, .. }
            | Step::BeginText { target, .. } => *target = to,
            Step::Descend { from, .. } => *from = to,
            Step::Restore { .. } => {}
        }
        self
    }

    /// Read from a differently named capture group
    pub fn group(mut self, name: &'static str) -> Self {
        match &mut self {
            Step::Assign { group, .. } | Step::Append { group, .. } => *group = name,
            Step::BeginText { group, .. } => *group = Some(name),
            Step::Descend { key, .. } => *key = KeySource::Group(name),
            _ => {}
        }
        self
    }

    /// Record a descend's destination under a named slot
    pub fn slot(mut self, name: &'static str) -> Self {
        if let Step::Descend { slot, .. } = &mut self {
            *slot = Some(name);
        }
        self
    }

    fn group_name(&self) -> Option<&'static str> {
        match self {
            Step::Assign { group, .. } | Step::Append { group, .. } => Some(group),
            Step::BeginText { group, .. } => *group,
            Step::Descend {
                key: KeySource::Group(g),
                ..
            } => Some(g),
            _ => None,
        }
    }
}

// ── Rules ─────────────────────────────────────────────────

/// A line pattern plus the steps that place its captures
#[derive(Debug, Clone)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    prefix: Option<String>,
    steps: Vec<Step>,
}

impl Rule {
    /// Build a rule from a static pattern.
    ///
    /// # Panics
    /// Rule patterns are compile-time constants; an invalid pattern is a
    /// programmer error and panics on first use of the parser.
    pub fn new(name: &'static str, pattern: &str) -> Self {
        Rule {
            name,
            pattern: Regex::new(pattern).expect("static regex must compile"),
            prefix: literal_prefix(pattern),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        debug_assert!(
            step.group_name()
                .map_or(true, |g| self.pattern.capture_names().flatten().any(|n| n == g)),
            "rule '{}' step references a group its pattern does not define",
            self.name
        );
        self.steps.push(step);
        self
    }

    /// Override the literal prefix used to flag near-miss lines;
    /// an empty prefix disables flagging for this rule
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn captures<'t>(&self, line: &'t str) -> Option<Captures<'t>> {
        self.pattern.captures(line)
    }

    fn near_miss(&self, line: &str) -> bool {
        self.prefix
            .as_deref()
            .is_some_and(|p| line.get(..p.len()).is_some_and(|head| head.eq_ignore_ascii_case(p)))
    }
}

/// Leading literal text of an anchored pattern, used to recognise lines
/// that look like they should have matched. Needs at least three
/// characters to be meaningful.
fn literal_prefix(pattern: &str) -> Option<String> {
    let body = pattern.strip_prefix('^')?;
    let literal: String = body
        .chars()
        .take_while(|c| !"\\.[](){}?*+|^$".contains(*c))
        .collect();
    let literal = literal.trim_end();
    (literal.len() >= 3).then(|| literal.to_string())
}

/// How lines are trimmed before matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Trim {
    /// Strip leading and trailing whitespace
    #[default]
    Both,
    /// Strip trailing whitespace only; indentation is significant
    End,
}

impl Trim {
    pub fn apply(self, line: &str) -> &str {
        match self {
            Trim::Both => line.trim(),
            Trim::End => line.trim_end(),
        }
    }
}

/// The ordered rule list of one parser
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    trim: Trim,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet {
            rules,
            trim: Trim::Both,
        }
    }

    pub fn with_trim(mut self, trim: Trim) -> Self {
        self.trim = trim;
        self
    }

    pub fn trim(&self) -> Trim {
        self.trim
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule (in declaration order) matching the line
    pub fn first_match<'r, 't>(&'r self, line: &'t str) -> Option<(&'r Rule, Captures<'t>)> {
        self.rules
            .iter()
            .find_map(|rule| rule.captures(line).map(|caps| (rule, caps)))
    }

    /// Rule whose literal prefix the line starts with, if any
    pub fn near_miss(&self, line: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.near_miss(line))
    }
}
