//! The exchange package container
//!
//!     A package is an opaque path → bytes map. Zipping it is the caller's business. Every quiz
//!     inside is addressed by a hash of its version id, so exporting the same quiz twice always
//!     lands on the same paths.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const MANIFEST_PATH: &str = "imsmanifest.xml";
pub const ASSET_DIR: &str = "web_resources";
pub const META_FILE: &str = "assessment_meta.xml";

/// Deterministic quiz identifier: `g` followed by the 32 hex digits of a name-based (v5) UUID
pub fn quiz_identifier(version_id: &str) -> String {
    let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, version_id.as_bytes());
    format!("g{}", id.simple())
}

/// Blob paths of one quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizPaths {
    pub identifier: String,
    pub items: String,
    pub meta: String,
}

impl QuizPaths {
    pub fn for_identifier(identifier: &str) -> Self {
        QuizPaths {
            identifier: identifier.to_string(),
            items: format!("{identifier}/{identifier}.xml"),
            meta: format!("{identifier}/{META_FILE}"),
        }
    }

    pub fn for_version(version_id: &str) -> Self {
        Self::for_identifier(&quiz_identifier(version_id))
    }
}

/// A binary asset referenced from prompts as `[[img:<name>]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Asset {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Asset {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn path(&self) -> String {
        asset_path(&self.name)
    }
}

pub fn asset_path(name: &str) -> String {
    format!("{ASSET_DIR}/{name}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.blobs.insert(path.into(), bytes.into())
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.blobs.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.contains_key(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.blobs.remove(path)
    }

    /// A blob as UTF-8 text; `None` when absent
    pub fn text(&self, path: &str) -> Option<Result<&str, CodecError>> {
        self.get(path).map(|bytes| {
            std::str::from_utf8(bytes)
                .map_err(|e| CodecError::ParseError(format!("{path} is not UTF-8: {e}")))
        })
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.blobs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn asset(&self, name: &str) -> Option<Asset> {
        self.get(&asset_path(name)).map(|bytes| Asset::new(name, bytes))
    }

    /// Quiz identifier → paths, derived from the item documents present
    pub fn index(&self) -> BTreeMap<String, QuizPaths> {
        self.paths()
            .filter_map(|path| {
                let (dir, file) = path.split_once('/')?;
                let stem = file.strip_suffix(".xml")?;
                (dir == stem && dir.starts_with('g'))
                    .then(|| (dir.to_string(), QuizPaths::for_identifier(dir)))
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<Vec<u8>>> FromIterator<(K, V)> for Package {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Package {
            blobs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
