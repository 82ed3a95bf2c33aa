//! Snapshot diffing
//!
//! Compares two flat snapshots field by field and emits a changeset. Pure and
//! total: any combination of present/absent snapshots and values is accepted,
//! and the same inputs always produce the same changeset.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::snapshot::Snapshot;

/// Placeholder rendered for a side that has no value for a field
pub const MISSING_VALUE: &str = "N/A";

/// Old/new value pair for a single changed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: String,
    pub new: String,
}

/// Field-level delta between two snapshots. Empty means "no observable
/// change"; whether that still gets persisted is the caller's call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changeset {
    fields: BTreeMap<String, FieldChange>,
}

impl Changeset {
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldChange> {
        self.fields.iter()
    }
}

fn is_empty_value(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

/// Compute the changeset between two snapshots.
///
/// A missing snapshot degrades to the empty mapping, so `diff(None, after)`
/// is a pure creation diff and `diff(before, None)` a pure deletion diff.
/// A field is emitted only when its two sides differ and at least one side is
/// non-empty; `None` and `""` count as equally empty, so an optional field
/// toggling between them never produces an entry.
pub fn diff(old: Option<&Snapshot>, new: Option<&Snapshot>) -> Changeset {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    if let Some(old) = old {
        names.extend(old.field_names());
    }
    if let Some(new) = new {
        names.extend(new.field_names());
    }

    let mut fields = BTreeMap::new();
    for name in names {
        let old_value = old.and_then(|s| s.get(name));
        let new_value = new.and_then(|s| s.get(name));

        if is_empty_value(old_value) && is_empty_value(new_value) {
            continue;
        }
        if old_value == new_value {
            continue;
        }

        fields.insert(
            name.to_string(),
            FieldChange {
                old: old_value.unwrap_or(MISSING_VALUE).to_string(),
                new: new_value.unwrap_or(MISSING_VALUE).to_string(),
            },
        );
    }

    Changeset { fields }
}
