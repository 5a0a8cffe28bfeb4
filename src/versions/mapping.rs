//! Version → instance address lookup.
//!
//! # Responsibilities
//! - Store the base address of every running instance
//! - Resolve the `latest` alias to a concrete release
//! - Return an explicit not-found for unknown versions
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, no locking)
//! - No fallback address: an unknown version is always `None`

use std::collections::HashMap;
use url::Url;

use crate::versions::Version;

/// Immutable mapping from version to the base URL of the instance serving it.
#[derive(Debug, Clone, Default)]
pub struct VersionMapping {
    versions: HashMap<Version, Url>,
    latest: Option<Version>,
}

impl VersionMapping {
    /// Build a mapping from `(version, base)` pairs.
    ///
    /// `latest` names the release the `latest` alias resolves to; it must be one
    /// of the supplied versions or the alias stays unmapped.
    pub fn new(entries: impl IntoIterator<Item = (Version, Url)>, latest: Option<Version>) -> Self {
        let versions: HashMap<Version, Url> = entries
            .into_iter()
            .filter(|(v, _)| !v.is_latest())
            .collect();
        let latest = latest.filter(|v| versions.contains_key(v));
        Self { versions, latest }
    }

    /// Base address for `version`, e.g. `http://localhost:8081/`.
    pub fn base(&self, version: &Version) -> Option<&Url> {
        if version.is_latest() {
            return self.latest.as_ref().and_then(|v| self.versions.get(v));
        }
        self.versions.get(version)
    }

    /// The concrete release `latest` resolves to.
    pub fn latest(&self) -> Option<&Version> {
        self.latest.as_ref()
    }

    /// All concrete versions, in precedence order.
    pub fn versions(&self) -> Vec<&Version> {
        let mut versions: Vec<&Version> = self.versions.keys().collect();
        versions.sort();
        versions
    }

    /// Number of concrete versions (the alias is not counted).
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Base URL of an instance listening on a local port.
pub fn local_base(port: u16) -> Url {
    Url::parse(&format!("http://localhost:{}", port)).expect("localhost URL with a u16 port always parses")
}
