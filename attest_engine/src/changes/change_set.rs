//! Named changes owned by one assessment
//!
//! Steps receive the set by `&mut` and may register new changes into it. A
//! change registered after the owning assessment granted its allowance is
//! allowed immediately, so it can be applied in the same run.

use super::change::{BoxError, Change};
use crate::logging::codes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: BTreeMap<String, Change>,
    #[serde(skip)]
    allow_new: bool,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change under `name`.
    ///
    /// A same-named change is replaced only while it has no effect to undo.
    /// One that is in effect or poisoned stays registered so cleanup still
    /// sees it; the new change is dropped and the existing one returned.
    pub fn insert(&mut self, name: impl Into<String>, mut change: Change) -> &mut Change {
        if self.allow_new {
            change.allow();
        }
        match self.changes.entry(name.into()) {
            btree_map::Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                if existing.is_in_effect() || existing.is_poisoned() {
                    log_warning!(codes::change::NAME_CONFLICT, "Change name already in use; keeping the registered change",
                        "target" => existing.target_name,
                        "rejected_target" => change.target_name
                    );
                } else {
                    *existing = change;
                }
                existing
            }
            btree_map::Entry::Vacant(entry) => entry.insert(change),
        }
    }

    /// Build and register a change in one call
    pub fn register<A, R>(
        &mut self,
        name: impl Into<String>,
        target_name: impl Into<String>,
        description: impl Into<String>,
        target_object: Value,
        apply: A,
        revert: R,
    ) -> &mut Change
    where
        A: Fn(&Value) -> Result<Value, BoxError> + Send + Sync + 'static,
        R: Fn(&Value) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.insert(
            name,
            Change::new(target_name, description, target_object, apply, revert),
        )
    }

    /// Allow every current change and every change registered from now on
    pub(crate) fn allow_all(&mut self) {
        self.allow_new = true;
        for change in self.changes.values_mut() {
            change.allow();
        }
    }

    pub fn allows_new(&self) -> bool {
        self.allow_new
    }

    pub fn get(&self, name: &str) -> Option<&Change> {
        self.changes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Change> {
        self.changes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.changes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Change)> {
        self.changes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Change)> {
        self.changes.iter_mut()
    }

    /// Changes currently in effect on the target
    pub fn in_effect(&self) -> impl Iterator<Item = (&String, &Change)> {
        self.changes.iter().filter(|(_, change)| change.is_in_effect())
    }
}
