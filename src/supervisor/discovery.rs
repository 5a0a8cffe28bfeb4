//! Asset bundle discovery.
//!
//! # Responsibilities
//! - Enumerate version directories in an asset source
//! - Validate each directory name as a release version
//! - Load the payload stored under the fixed binary name
//!
//! # Design Decisions
//! - Fail fast: a single malformed entry aborts discovery
//! - Non-directory entries at the top level are ignored
//! - Entries are returned in precedence order so port allocation is stable

use crate::assets::AssetSource;
use crate::supervisor::DiscoveryError;
use crate::versions::Version;

/// One version's executable payload, read from the asset bundle.
#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub version: Version,
    pub payload: Vec<u8>,
}

/// Read every version directory and its payload from `source`.
pub fn discover(source: &dyn AssetSource, binary_name: &str) -> Result<Vec<AssetEntry>, DiscoveryError> {
    let listing = source.entries().map_err(DiscoveryError::Bundle)?;

    let mut entries = Vec::new();
    for item in listing.into_iter().filter(|e| e.is_dir) {
        let version = Version::parse(&item.name).map_err(|source| DiscoveryError::InvalidVersion {
            name: item.name.clone(),
            source,
        })?;
        if version.is_latest() {
            return Err(DiscoveryError::ReservedName);
        }

        let payload = source
            .read(&item.name, binary_name)
            .map_err(|source| DiscoveryError::MissingPayload {
                version: version.clone(),
                binary: binary_name.to_string(),
                source,
            })?;

        tracing::debug!(version = %version, bytes = payload.len(), "Discovered version");
        entries.push(AssetEntry { version, payload });
    }

    if entries.is_empty() {
        return Err(DiscoveryError::Empty);
    }

    entries.sort_by(|a, b| a.version.cmp(&b.version));
    Ok(entries)
}
