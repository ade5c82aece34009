//! Figure and equation label numbering
//!
//!     A batch of documents is scanned once, left to right, and every label inside a numbered block
//!     gets a display number (see [numbering] for the rules). The resulting [LabelTable] is then
//!     used read-only to rewrite references, see [replace_references].
//!
//!     A table can also come from a typesetting engine's auxiliary file, see [harvest_aux_labels].

pub mod harvest;
pub mod numbering;
pub mod references;
pub mod tokens;

pub use harvest::harvest_aux_labels;
pub use numbering::{collect_labels_with, collect_sequential_labels, NumberingCursor};
pub use references::{replace_references, Language};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label → display number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable(BTreeMap<String, String>);

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    /// Insert unless the label is already numbered; returns whether it was inserted
    pub fn insert_first(&mut self, label: impl Into<String>, number: impl Into<String>) -> bool {
        match self.0.entry(label.into()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(number.into());
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        LabelTable(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
