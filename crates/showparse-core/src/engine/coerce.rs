//! Captured-text coercions
//!
//! Every value a rule stores passes through a [`Coerce`] first. Numeric
//! literals are parsed by a bounded literal parser (decimal or
//! `0x`-prefixed hexadecimal); nothing is ever evaluated as an expression.

use crate::value::Value;

/// Conversion applied to captured text before it is stored
#[derive(Debug, Clone, PartialEq)]
pub enum Coerce {
    /// Trimmed text as-is
    Str,
    /// Trimmed, lower-cased text (canonical form for state tokens)
    Lower,
    /// Decimal or `0x` hexadecimal integer literal
    Int,
    /// Floating point literal (`12.5`, `-1.02`, `1.0E-5`)
    Float,
    /// MAC address in dotted, colon or dash notation, lower-cased
    Mac,
    /// `true` when the lower-cased token is one of the listed values
    Flag(&'static [&'static str]),
    /// `true` when the capture group participated in the match, else `false`
    Present,
    /// Split on a separator into a list of trimmed, non-empty strings
    Split(char),
}

impl Coerce {
    /// Name of the produced type, for error messages
    pub fn target_name(&self) -> &'static str {
        match self {
            Coerce::Str | Coerce::Lower => "string",
            Coerce::Int => "integer",
            Coerce::Float => "float",
            Coerce::Mac => "mac address",
            Coerce::Flag(_) | Coerce::Present => "boolean",
            Coerce::Split(_) => "list",
        }
    }

    /// Convert captured text. `None` means the text is not a valid
    /// literal of the target type.
    pub fn apply(&self, text: &str) -> Option<Value> {
        let text = text.trim();
        match self {
            Coerce::Str => Some(Value::String(text.to_string())),
            Coerce::Lower => Some(Value::String(text.to_lowercase())),
            Coerce::Int => parse_int_literal(text).map(Value::Integer),
            Coerce::Float => parse_float_literal(text).map(Value::Float),
            Coerce::Mac => normalize_mac(text).map(Value::String),
            Coerce::Flag(truthy) => {
                let token = text.to_lowercase();
                Some(Value::Boolean(truthy.iter().any(|t| *t == token)))
            }
            Coerce::Present => Some(Value::Boolean(true)),
            Coerce::Split(sep) => Some(Value::Array(
                text.split(*sep)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            )),
        }
    }
}

// ── Literal parsers ───────────────────────────────────────

/// Parse a decimal or `0x`/`0X`-prefixed hexadecimal integer.
///
/// Accepts an optional leading sign. Rejects empty digit strings,
/// embedded whitespace, and anything that overflows `i64`.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let magnitude = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            i64::from_str_radix(hex, 16).ok()?
        }
        None => {
            if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            body.parse::<i64>().ok()?
        }
    };

    if negative {
        magnitude.checked_neg()
    } else {
        Some(magnitude)
    }
}

/// Parse a float literal; integers are accepted and widened
pub fn parse_float_literal(text: &str) -> Option<f64> {
    let valid = !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if !valid {
        return None;
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Validate a MAC address and return it lower-cased in its original notation.
///
/// Accepted: `843d.c638.b980`, `84:3d:c6:38:b9:80`, `84-3D-C6-38-B9-80`.
pub fn normalize_mac(text: &str) -> Option<String> {
    let groups: Vec<&str> = if text.contains('.') {
        text.split('.').collect()
    } else if text.contains(':') {
        text.split(':').collect()
    } else {
        text.split('-').collect()
    };

    let shape_ok = match groups.len() {
        3 => groups.iter().all(|g| g.len() == 4),
        6 => groups.iter().all(|g| g.len() == 2),
        _ => false,
    };
    if !shape_ok || !groups.iter().all(|g| g.bytes().all(|b| b.is_ascii_hexdigit())) {
        return None;
    }
    Some(text.to_ascii_lowercase())
}
