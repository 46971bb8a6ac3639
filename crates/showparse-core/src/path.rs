//! Key paths into a nested record
//!
//! Paths address a location in a [`Record`](crate::Record) as a sequence of
//! mapping keys. They are used both by the validator (to name where a
//! violation occurred) and by the line engine cursor (to name where the
//! next matched field lands).

/// A sequence of mapping keys from the record root
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// The record root
    pub fn root() -> Self {
        KeyPath(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path one level below this one
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.into());
        KeyPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        KeyPath(iter.into_iter().map(Into::into).collect())
    }
}

/// Rendered as `$.interfaces["Gi2/0/15"].chassis_id`; keys that are not
/// plain identifiers are quoted.
impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            let plain = !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if plain {
                write!(f, ".{}", segment)?;
            } else {
                write!(f, "[{:?}]", segment)?;
            }
        }
        Ok(())
    }
}
