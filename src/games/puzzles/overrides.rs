//! Player-supplied replacements for images that fail to load.

use super::types::{AssetKey, ImageRef};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

/// Maps original asset keys to replacement references.
///
/// Upsert-only during a session. Keys and references are opaque; they are
/// stored and handed back without interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageOverrideRegistry {
    overrides: BTreeMap<AssetKey, ImageRef>,
    failed: BTreeSet<AssetKey>,
}

impl ImageOverrideRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `reference` for `key`, returning the reference it replaced.
    #[instrument(skip(self, reference))]
    pub fn set_override(
        &mut self,
        key: &str,
        reference: impl Into<ImageRef>,
    ) -> Option<ImageRef> {
        self.failed.remove(key);
        let previous = self.overrides.insert(key.to_string(), reference.into());
        info!(replaced = previous.is_some(), "Image override stored");
        previous
    }

    /// The override for `key`, or `key` itself.
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.overrides.get(key).map(String::as_str).unwrap_or(key)
    }

    /// The override for `key`, if one was supplied.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.overrides.get(key).map(String::as_str)
    }

    /// Records that the resource behind `key` failed to load.
    #[instrument(skip(self))]
    pub fn report_load_failure(&mut self, key: &str) {
        if self.overrides.contains_key(key) {
            debug!("Override already present, keeping it");
        }
        self.failed.insert(key.to_string());
    }

    /// True while a load failure is recorded for `key` and no override
    /// is stored for it.
    pub fn needs_override(&self, key: &str) -> bool {
        self.failed.contains(key) && !self.overrides.contains_key(key)
    }

    /// Number of stored overrides.
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Returns true if no override is stored.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Iterates over `(key, reference)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides
            .iter()
            .map(|(key, reference)| (key.as_str(), reference.as_str()))
    }

    /// Drops every override and failure record.
    pub(crate) fn clear(&mut self) {
        self.overrides.clear();
        self.failed.clear();
    }
}
