//! Schema validator — checks a parsed record against its declared shape
//!
//! The validator walks a [`Schema`] and a [`Value`] together. It is total
//! and side-effect free: neither the schema nor the value is mutated, and
//! every violation is reported with the key path where it was found.
//!
//! # Checks
//!
//! 1. **Types** — a typed leaf must hold exactly the declared kind
//! 2. **Enums** — an enumerated leaf must hold one of its literal values
//! 3. **Keys** — required keys present; undeclared keys rejected in strict mode
//! 4. **Wildcards** — every dynamic key validated against the wildcard schema
//! 5. **Emptiness** — an empty record, or a wildcard table without entries
//!    reached only through required keys, is reported as
//!    [`ValidationError::EmptyResult`]. A table under an optional key may be
//!    empty: a section header with no rows is partial data, not missing data.

use crate::error::ValidationError;
use crate::path::KeyPath;
use crate::schema::{Key, Kind, RecordSchema, Schema};
use crate::value::{Record, Value};

// ── Validation Result Types ───────────────────────────────

/// Result of validation — accumulates every violation found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no violations were found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// First violation in walk order, if any
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }
}

/// Walks schemas against values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    strict: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::strict()
    }
}

impl Validator {
    /// Keys outside the schema are violations
    pub fn strict() -> Self {
        Validator { strict: true }
    }

    /// Keys outside the schema are ignored
    pub fn lenient() -> Self {
        Validator { strict: false }
    }

    pub fn new(strict: bool) -> Self {
        Validator { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Check a whole parsed record, reporting every violation.
    ///
    /// An empty record is reported as a single `EmptyResult` at the root;
    /// no further checks run, since "nothing extracted" is the meaningful
    /// failure and the missing-key errors would only restate it.
    pub fn check(&self, schema: &Schema, record: &Record) -> ValidationReport {
        let mut report = ValidationReport::new();
        if record.is_empty() {
            report.add(ValidationError::EmptyResult {
                path: KeyPath::root(),
            });
            return report;
        }
        let root = KeyPath::root();
        match schema {
            Schema::Record(fields) => self.walk_record(fields, record, &root, true, &mut report),
            other => report.add(ValidationError::TypeMismatch {
                path: root,
                expected: other.describe(),
                actual: "mapping".to_string(),
            }),
        }
        report
    }

    /// Validate a record, failing with the first violation
    pub fn validate(&self, schema: &Schema, record: &Record) -> Result<(), ValidationError> {
        self.check(schema, record).into_result()
    }

    /// `required` is false once the walk has passed through an optional key
    fn walk(
        &self,
        schema: &Schema,
        value: &Value,
        path: &KeyPath,
        required: bool,
        report: &mut ValidationReport,
    ) {
        match schema {
            Schema::Typed(kind) => {
                if !kind_matches(*kind, value) {
                    report.add(mismatch(schema, value, path));
                }
            }
            Schema::Enum(allowed) => match value {
                Value::String(s) if allowed.iter().any(|a| a == s) => {}
                Value::String(s) => report.add(ValidationError::InvalidEnumValue {
                    path: path.clone(),
                    value: s.clone(),
                    allowed: allowed.clone(),
                }),
                other => report.add(mismatch(schema, other, path)),
            },
            Schema::List(items) => match value {
                Value::Array(arr) => {
                    for (i, item) in arr.iter().enumerate() {
                        self.walk(items, item, &path.child(i.to_string()), required, report);
                    }
                }
                other => report.add(mismatch(schema, other, path)),
            },
            Schema::Record(record) => match value {
                Value::Object(map) => self.walk_record(record, map, path, required, report),
                other => report.add(mismatch(schema, other, path)),
            },
        }
    }

    fn walk_record(
        &self,
        schema: &RecordSchema,
        map: &Record,
        path: &KeyPath,
        required: bool,
        report: &mut ValidationReport,
    ) {
        for key in schema.required_keys() {
            if !map.contains_key(key) {
                report.add(ValidationError::MissingRequiredKey {
                    path: path.clone(),
                    key: key.to_string(),
                });
            }
        }

        let wildcard = schema.wildcard();
        let mut wildcard_entries = 0usize;
        for (key, value) in map {
            let child = path.child(key.as_str());
            if let Some(field) = schema.named(key) {
                let field_required = required && matches!(field.key, Key::Required(_));
                self.walk(&field.schema, value, &child, field_required, report);
            } else if let Some(entry) = wildcard {
                wildcard_entries += 1;
                self.walk(entry, value, &child, required, report);
            } else if self.strict {
                report.add(ValidationError::UnexpectedKey {
                    path: path.clone(),
                    key: key.clone(),
                });
            }
        }

        if required && wildcard.is_some() && wildcard_entries == 0 {
            report.add(ValidationError::EmptyResult { path: path.clone() });
        }
    }
}

/// Validate a record with the default (strict) validator
pub fn validate(schema: &Schema, record: &Record) -> Result<(), ValidationError> {
    Validator::strict().validate(schema, record)
}

// ── Helpers ───────────────────────────────────────────────

fn kind_matches(kind: Kind, value: &Value) -> bool {
    matches!(
        (kind, value),
        (Kind::String, Value::String(_))
            | (Kind::Integer, Value::Integer(_))
            | (Kind::Float, Value::Float(_))
            | (Kind::Boolean, Value::Boolean(_))
    )
}

fn mismatch(schema: &Schema, value: &Value, path: &KeyPath) -> ValidationError {
    ValidationError::TypeMismatch {
        path: path.clone(),
        expected: schema.describe(),
        actual: value.type_name().to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;
    use crate::value::record_from_json;
    use proptest::prelude::*;

    fn rec(json: serde_json::Value) -> Record {
        record_from_json(&json).unwrap()
    }

    fn neighbor_schema() -> Schema {
        record()
            .required(
                "interfaces",
                table(
                    record()
                        .required("port_id", string())
                        .optional("vlan_id", integer()),
                ),
            )
            .required("total_entries", integer())
            .into()
    }

    fn global_schema() -> Schema {
        record()
            .required("enabled", boolean())
            .optional("status", one_of(&["active", "inactive"]))
            .optional("hello_timer", integer())
            .into()
    }

    #[test]
    fn test_valid_record_passes() {
        let r = rec(serde_json::json!({
            "interfaces": {"Gi1/0/1": {"port_id": "Gi0/1", "vlan_id": 1}},
            "total_entries": 1,
        }));
        assert_eq!(validate(&neighbor_schema(), &r), Ok(()));
    }

    #[test]
    fn test_optional_key_absent_is_fine() {
        let r = rec(serde_json::json!({"enabled": true}));
        assert!(validate(&global_schema(), &r).is_ok());
    }

    #[test]
    fn test_optional_key_present_is_validated() {
        let r = rec(serde_json::json!({"enabled": true, "hello_timer": "30"}));
        let err = validate(&global_schema(), &r).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                path: KeyPath::root().child("hello_timer"),
                expected: "integer".into(),
                actual: "string".into(),
            }
        );
    }

    #[test]
    fn test_missing_required_key_names_path() {
        let r = rec(serde_json::json!({
            "interfaces": {"Gi1/0/1": {"vlan_id": 1}},
            "total_entries": 1,
        }));
        let err = validate(&neighbor_schema(), &r).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredKey {
                path: KeyPath::root().child("interfaces").child("Gi1/0/1"),
                key: "port_id".into(),
            }
        );
    }

    #[test]
    fn test_enum_membership() {
        let r = rec(serde_json::json!({"enabled": true, "status": "ACTIVE"}));
        match validate(&global_schema(), &r).unwrap_err() {
            ValidationError::InvalidEnumValue { value, allowed, .. } => {
                assert_eq!(value, "ACTIVE");
                assert_eq!(allowed, vec!["active", "inactive"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_enum_with_non_string_is_type_mismatch() {
        let r = rec(serde_json::json!({"enabled": true, "status": 1}));
        assert!(matches!(
            validate(&global_schema(), &r),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_integer_is_not_float() {
        let s: Schema = record().required("q_factor", float()).into();
        let r = rec(serde_json::json!({"q_factor": 12}));
        assert!(validate(&s, &r).is_err());
    }

    #[test]
    fn test_empty_record_is_empty_result() {
        let err = validate(&global_schema(), &Record::new()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyResult { path: KeyPath::root() });
    }

    #[test]
    fn test_empty_wildcard_table_is_empty_result() {
        let r = rec(serde_json::json!({"interfaces": {}, "total_entries": 0}));
        let err = validate(&neighbor_schema(), &r).unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyResult {
                path: KeyPath::root().child("interfaces")
            }
        );
    }

    #[test]
    fn test_empty_table_under_optional_key_is_accepted() {
        let schema: Schema = record()
            .required("controller_state", string())
            .optional("alarm_information", table(integer()))
            .into();
        let r = rec(serde_json::json!({"controller_state": "up", "alarm_information": {}}));
        assert!(validate(&schema, &r).is_ok());
    }

    #[test]
    fn test_empty_table_below_optional_key_is_accepted() {
        let schema: Schema = table(
            record()
                .required("controller_state", string())
                .optional("optics_status", record().optional("alarm_statistics", table(integer()))),
        )
        .into();
        let r = rec(serde_json::json!({
            "0/0/0/0": {"controller_state": "up", "optics_status": {"alarm_statistics": {}}},
        }));
        assert!(validate(&schema, &r).is_ok());
    }

    #[test]
    fn test_strict_rejects_unknown_key() {
        let r = rec(serde_json::json!({"enabled": true, "bogus": 1}));
        assert_eq!(
            validate(&global_schema(), &r),
            Err(ValidationError::UnexpectedKey {
                path: KeyPath::root(),
                key: "bogus".into()
            })
        );
    }

    #[test]
    fn test_lenient_ignores_unknown_key() {
        let r = rec(serde_json::json!({"enabled": true, "bogus": 1}));
        assert!(Validator::lenient().validate(&global_schema(), &r).is_ok());
    }

    #[test]
    fn test_list_items_validated_with_index_path() {
        let s: Schema = record().required("alarms", list_of(string())).into();
        let r = rec(serde_json::json!({"alarms": ["LOS", 3]}));
        let err = validate(&s, &r).unwrap_err();
        assert_eq!(err.path(), &KeyPath::root().child("alarms").child("1"));
    }

    #[test]
    fn test_check_accumulates_all_errors() {
        let r = rec(serde_json::json!({
            "interfaces": {"a": {}, "b": {"port_id": 5}},
        }));
        let report = Validator::strict().check(&neighbor_schema(), &r);
        assert!(!report.is_valid());
        // total_entries missing, a.port_id missing, b.port_id mistyped
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let schema = neighbor_schema();
        let r = rec(serde_json::json!({"interfaces": {"x": {"port_id": "p"}}, "total_entries": 1}));
        let (schema_before, record_before) = (schema.clone(), r.clone());
        let _ = Validator::strict().check(&schema, &r);
        assert_eq!(schema, schema_before);
        assert_eq!(r, record_before);
    }

    proptest! {
        #[test]
        fn prop_wildcard_table_accepts_n_entries(
            keys in proptest::collection::btree_set("[A-Za-z0-9/]{1,12}", 1..20)
        ) {
            let mut interfaces = serde_json::Map::new();
            for key in &keys {
                interfaces.insert(key.clone(), serde_json::json!({"port_id": key}));
            }
            let r = rec(serde_json::json!({
                "interfaces": interfaces,
                "total_entries": keys.len(),
            }));
            prop_assert!(validate(&neighbor_schema(), &r).is_ok());
            prop_assert_eq!(r["interfaces"].as_object().unwrap().len(), keys.len());
        }

        #[test]
        fn prop_dropping_required_key_is_reported(
            timer in 0i64..100_000,
            status in prop_oneof!["active", "inactive"]
        ) {
            let full = rec(serde_json::json!({
                "enabled": true,
                "status": status,
                "hello_timer": timer,
            }));
            prop_assert!(validate(&global_schema(), &full).is_ok());
            let mut partial = full.clone();
            partial.remove("enabled");
            prop_assert_eq!(
                validate(&global_schema(), &partial),
                Err(ValidationError::MissingRequiredKey {
                    path: KeyPath::root(),
                    key: "enabled".into(),
                })
            );
        }
    }
}
