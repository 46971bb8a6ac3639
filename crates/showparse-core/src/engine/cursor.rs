//! Scan cursor — where matched fields land
//!
//! The cursor is a plain value: a "current" path plus named slots
//! (e.g. `port`, `section`). Context-switching steps never mutate a cursor
//! in place; they return a new one, so two slots can never alias the same
//! nested mapping by accident.

use std::collections::BTreeMap;

use crate::path::KeyPath;

/// Where a step reads or writes relative to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The record root
    Root,
    /// Whatever the last descend made current
    Current,
    /// A named slot recorded by an earlier descend
    Slot(&'static str),
}

/// Mutable accumulation state for one scan, passed by value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    current: KeyPath,
    slots: BTreeMap<&'static str, KeyPath>,
}

impl Cursor {
    /// A cursor positioned at the record root
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor positioned at `path`
    pub fn at(path: KeyPath) -> Self {
        Cursor {
            current: path,
            slots: BTreeMap::new(),
        }
    }

    pub fn current(&self) -> &KeyPath {
        &self.current
    }

    pub fn slot(&self, name: &str) -> Option<&KeyPath> {
        self.slots.get(name)
    }

    /// Resolve a target to a concrete path; `None` for an unset slot
    pub fn resolve(&self, target: Target) -> Option<KeyPath> {
        match target {
            Target::Root => Some(KeyPath::root()),
            Target::Current => Some(self.current.clone()),
            Target::Slot(name) => self.slots.get(name).cloned(),
        }
    }

    /// A new cursor whose current path is `path`, optionally recording it
    /// under `slot`
    pub fn descended(&self, path: KeyPath, slot: Option<&'static str>) -> Cursor {
        let mut slots = self.slots.clone();
        if let Some(name) = slot {
            slots.insert(name, path.clone());
        }
        Cursor {
            current: path,
            slots,
        }
    }

    /// A new cursor whose current path is the given slot's path
    pub fn restored(&self, slot: &str) -> Option<Cursor> {
        let path = self.slots.get(slot)?.clone();
        Some(Cursor {
            current: path,
            slots: self.slots.clone(),
        })
    }
}
