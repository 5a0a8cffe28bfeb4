//! Asset bundle backed by a directory on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{check_name, AssetError, AssetSource, BundleEntry};

/// Reads version directories from `root`.
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssetSource {
    fn entries(&self) -> Result<Vec<BundleEntry>, AssetError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(AssetError::List)? {
            let entry = entry.map_err(AssetError::List)?;
            let is_dir = entry.file_type().map_err(AssetError::List)?.is_dir();
            entries.push(BundleEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, dir: &str, file: &str) -> Result<Vec<u8>, AssetError> {
        check_name(dir)?;
        check_name(file)?;

        let path = self.root.join(dir).join(file);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AssetError::NotFound {
                dir: dir.to_string(),
                file: file.to_string(),
            }),
            Err(source) => Err(AssetError::Read {
                dir: dir.to_string(),
                file: file.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_and_reads() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("1.0.0")).unwrap();
        fs::write(tmp.path().join("1.0.0").join("agentbaker"), b"bin").unwrap();
        fs::write(tmp.path().join("README"), b"notes").unwrap();

        let source = DirAssetSource::new(tmp.path());
        let entries = source.entries().unwrap();
        assert_eq!(
            entries,
            vec![
                BundleEntry { name: "1.0.0".into(), is_dir: true },
                BundleEntry { name: "README".into(), is_dir: false },
            ]
        );
        assert_eq!(source.read("1.0.0", "agentbaker").unwrap(), b"bin");
        assert!(matches!(
            source.read("1.0.0", "missing"),
            Err(AssetError::NotFound { .. })
        ));
        assert!(matches!(source.read("..", "agentbaker"), Err(AssetError::InvalidName(_))));
    }

    #[test]
    fn test_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let source = DirAssetSource::new(tmp.path().join("nope"));
        assert!(matches!(source.entries(), Err(AssetError::List(_))));
    }
}
