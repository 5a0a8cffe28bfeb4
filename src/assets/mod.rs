//! Binary asset sources.
//!
//! # Data Flow
//! ```text
//! asset bundle (directory on disk, in-memory bundle)
//!     → AssetSource::entries() (top-level listing)
//!     → AssetSource::read(dir, file) (payload bytes)
//!     → supervisor::discovery builds AssetEntry values
//! ```
//!
//! # Design Decisions
//! - Read-only: sources never mutate the bundle
//! - Names are single path components; separators are rejected so a
//!   source can never read outside its bundle

pub mod dir;
pub mod memory;

pub use dir::DirAssetSource;
pub use memory::MemoryAssetSource;

/// Error type for asset source access.
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("could not list asset bundle: {0}")]
    List(#[source] std::io::Error),

    #[error("asset '{dir}/{file}' not found")]
    NotFound { dir: String, file: String },

    #[error("could not read asset '{dir}/{file}': {source}")]
    Read {
        dir: String,
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid asset name '{0}'")]
    InvalidName(String),
}

/// A top-level entry of an asset bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read-only access to a bundle of per-version directories.
pub trait AssetSource: Send + Sync {
    /// List the top-level entries of the bundle.
    fn entries(&self) -> Result<Vec<BundleEntry>, AssetError>;

    /// Read `file` inside the top-level directory `dir`.
    fn read(&self, dir: &str, file: &str) -> Result<Vec<u8>, AssetError>;
}

/// Reject anything that is not a single, normal path component.
pub(crate) fn check_name(name: &str) -> Result<(), AssetError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(AssetError::InvalidName(name.to_string()));
    }
    Ok(())
}
