//! Session variable memory.
//!
//! Values are kept as the display text the evaluator produced, since a result
//! like `5 meters` or `1.2 x 10^30` has no faithful numeric form. Keys are
//! case-sensitive and drawn from `[0-9A-Za-z_]`.

mod snapshot;
mod substitute;

pub use snapshot::{SaveDir, Snapshot};

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// Name of the binding that tracks the most recent result.
pub const LAST: &str = "_";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    bindings: BTreeMap<String, String>,
    next_auto_index: u64,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            bindings: BTreeMap::new(),
            next_auto_index: 1,
        }
    }
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, auto-naming it when `name` is `None`. Returns the name
    /// actually used.
    ///
    /// An explicit name is used verbatim, so `Some("3")` overwrites the third
    /// auto-indexed slot without touching the counter. The counter stops at
    /// `u64::MAX` rather than wrapping.
    pub fn store<V: Into<String>>(&mut self, name: Option<&str>, value: V) -> String {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let name = self.next_auto_index.to_string();
                self.next_auto_index = self.next_auto_index.saturating_add(1);
                name
            }
        };
        self.bindings.insert(name.clone(), value.into());
        name
    }

    pub fn update_last<V: Into<String>>(&mut self, value: V) {
        self.bindings.insert(LAST.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        match self.bindings.remove(name) {
            Some(_) => Ok(()),
            None => Err(Error::NoSuchVariable(name.to_string())),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// User-named variables, `$`-prefixed, for completion.
    pub fn named_variables(&self) -> BTreeSet<String> {
        self.bindings
            .keys()
            .filter(|key| key.as_str() != LAST && !is_auto_name(key))
            .map(|key| format!("${}", key))
            .collect()
    }

    /// Listing of every binding in byte order of the key, so `$10` comes
    /// before `$2`.
    pub fn dump(&self) -> String {
        if self.is_empty() {
            return String::from("  Memory is empty.");
        }

        self.bindings
            .iter()
            .map(|(key, value)| format!("  ${} = {}", key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[cfg(test)]
    pub fn next_auto_index(&self) -> u64 {
        self.next_auto_index
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.bindings.clone(), self.next_auto_index)
    }

    /// Replaces the whole state with the snapshot's.
    pub fn absorb(&mut self, snapshot: Snapshot) {
        let (bindings, next_auto_index) = snapshot.into_parts();
        self.bindings = bindings;
        self.next_auto_index = next_auto_index;
    }
}

fn is_auto_name(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}
