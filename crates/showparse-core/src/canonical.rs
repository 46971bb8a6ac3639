//! Canonical form and fingerprint of a parsed record
//!
//! Records use ordered maps throughout, so the compact JSON form is
//! already canonical: one byte string per distinct record. The SHA-256 of
//! that string is the record's fingerprint, which makes "parsing the same
//! text twice yields the same record" a one-line comparison.

use sha2::{Digest, Sha256};

use crate::value::Record;

/// Compact JSON with sorted keys
pub fn canonical_json(record: &Record) -> String {
    // Serializing string-keyed maps of plain values cannot fail
    serde_json::to_string(record).unwrap_or_default()
}

/// SHA-256 hex digest of the canonical form
pub fn fingerprint(record: &Record) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(record).as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}
