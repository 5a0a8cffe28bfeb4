//! In-memory asset bundle.
//!
//! Useful for bundles compiled into the binary with `include_bytes!` and for
//! tests that should not touch the filesystem.

use std::collections::BTreeMap;

use super::{check_name, AssetError, AssetSource, BundleEntry};

#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    dirs: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `file` with `bytes` under directory `dir`.
    pub fn with_file(mut self, dir: &str, file: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.dirs
            .entry(dir.to_string())
            .or_default()
            .insert(file.to_string(), bytes.into());
        self
    }

    /// Add an empty directory.
    pub fn with_dir(mut self, dir: &str) -> Self {
        self.dirs.entry(dir.to_string()).or_default();
        self
    }

    /// Add a file at the top level of the bundle.
    pub fn with_top_level_file(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.to_string(), bytes.into());
        self
    }
}

impl AssetSource for MemoryAssetSource {
    fn entries(&self) -> Result<Vec<BundleEntry>, AssetError> {
        let dirs = self.dirs.keys().map(|name| BundleEntry {
            name: name.clone(),
            is_dir: true,
        });
        let files = self.files.keys().map(|name| BundleEntry {
            name: name.clone(),
            is_dir: false,
        });
        let mut entries: Vec<BundleEntry> = dirs.chain(files).collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, dir: &str, file: &str) -> Result<Vec<u8>, AssetError> {
        check_name(dir)?;
        check_name(file)?;
        self.dirs
            .get(dir)
            .and_then(|files| files.get(file))
            .cloned()
            .ok_or_else(|| AssetError::NotFound {
                dir: dir.to_string(),
                file: file.to_string(),
            })
    }
}
