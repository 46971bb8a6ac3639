//! Schema declarations — the expected shape of a parsed record
//!
//! A schema is a closed tree of nodes:
//!
//! - [`Schema::Typed`] — a concrete leaf type (string, integer, float, boolean)
//! - [`Schema::Enum`] — a leaf restricted to literal string values
//! - [`Schema::List`] — a list whose items share one schema
//! - [`Schema::Record`] — a mapping of named fields, each required or
//!   optional, plus an optional wildcard for tables keyed by dynamic
//!   identifiers (interface names, port labels)
//!
//! Schemas are built once per parser and never mutated afterwards;
//! validation only borrows them.

/// Leaf types a schema can demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Integer,
    Float,
    Boolean,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a record field's key is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Must be present
    Required(String),
    /// May be absent; validated when present
    Optional(String),
    /// Wildcard: any key not otherwise declared; at least one entry unless
    /// the table sits below an optional key
    Any,
}

/// One field of a record schema
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Key,
    pub schema: Schema,
}

/// A mapping schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSchema {
    pub fields: Vec<Field>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &str, schema: impl Into<Schema>) -> Self {
        self.fields.push(Field {
            key: Key::Required(name.to_string()),
            schema: schema.into(),
        });
        self
    }

    pub fn optional(mut self, name: &str, schema: impl Into<Schema>) -> Self {
        self.fields.push(Field {
            key: Key::Optional(name.to_string()),
            schema: schema.into(),
        });
        self
    }

    /// Accept any other key, validating its value against `schema`
    pub fn any(mut self, schema: impl Into<Schema>) -> Self {
        self.fields.push(Field {
            key: Key::Any,
            schema: schema.into(),
        });
        self
    }

    /// Schema of a literally named field, required or optional
    pub fn named(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| match &f.key {
            Key::Required(n) | Key::Optional(n) => n == name,
            Key::Any => false,
        })
    }

    pub fn wildcard(&self) -> Option<&Schema> {
        self.fields
            .iter()
            .find(|f| f.key == Key::Any)
            .map(|f| &f.schema)
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| match &f.key {
            Key::Required(n) => Some(n.as_str()),
            _ => None,
        })
    }
}

/// A schema node
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Typed(Kind),
    Enum(Vec<String>),
    List(Box<Schema>),
    Record(RecordSchema),
}

impl From<RecordSchema> for Schema {
    fn from(record: RecordSchema) -> Self {
        Schema::Record(record)
    }
}

impl From<Kind> for Schema {
    fn from(kind: Kind) -> Self {
        Schema::Typed(kind)
    }
}

// ── Constructors ──────────────────────────────────────────

pub fn string() -> Schema {
    Schema::Typed(Kind::String)
}

pub fn integer() -> Schema {
    Schema::Typed(Kind::Integer)
}

pub fn float() -> Schema {
    Schema::Typed(Kind::Float)
}

pub fn boolean() -> Schema {
    Schema::Typed(Kind::Boolean)
}

/// Leaf restricted to the given literal values
pub fn one_of(values: &[&str]) -> Schema {
    Schema::Enum(values.iter().map(|v| v.to_string()).collect())
}

pub fn list_of(items: impl Into<Schema>) -> Schema {
    Schema::List(Box::new(items.into()))
}

/// A table keyed by dynamic identifiers, each entry validated by `entry`
pub fn table(entry: impl Into<Schema>) -> Schema {
    Schema::Record(RecordSchema::new().any(entry))
}

pub fn record() -> RecordSchema {
    RecordSchema::new()
}

// ── Rendering ─────────────────────────────────────────────

impl Schema {
    /// Render the schema as a JSON description.
    ///
    /// Leaves render as their type name, enums as `{"enum": [...]}`,
    /// lists as a one-element array, records as objects where optional
    /// keys carry a trailing `?` and the wildcard is `"*"`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Schema::Typed(kind) => serde_json::Value::String(kind.name().to_string()),
            Schema::Enum(values) => serde_json::json!({ "enum": values }),
            Schema::List(items) => serde_json::Value::Array(vec![items.to_json()]),
            Schema::Record(record) => {
                let mut obj = serde_json::Map::new();
                for field in &record.fields {
                    let key = match &field.key {
                        Key::Required(n) => n.clone(),
                        Key::Optional(n) => format!("{}?", n),
                        Key::Any => "*".to_string(),
                    };
                    obj.insert(key, field.schema.to_json());
                }
                serde_json::Value::Object(obj)
            }
        }
    }

    /// Short description used in type-mismatch messages
    pub fn describe(&self) -> String {
        match self {
            Schema::Typed(kind) => kind.name().to_string(),
            Schema::Enum(values) => format!("one of [{}]", values.join(", ")),
            Schema::List(items) => format!("list of {}", items.describe()),
            Schema::Record(_) => "mapping".to_string(),
        }
    }
}
