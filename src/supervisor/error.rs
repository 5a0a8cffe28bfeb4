//! Startup error types for the instance supervisor.
//!
//! Every variant is fatal: the router never serves with a partial mapping.

use std::time::Duration;

use crate::assets::AssetError;
use crate::versions::{Version, VersionError};

/// The asset bundle is unreadable or malformed.
#[derive(thiserror::Error, Debug)]
pub enum DiscoveryError {
    #[error("could not read the asset bundle: {0}")]
    Bundle(#[source] AssetError),

    #[error("asset directory '{name}' is not a valid version: {source}")]
    InvalidVersion {
        name: String,
        #[source]
        source: VersionError,
    },

    #[error("asset directory 'latest' is reserved for the latest alias")]
    ReservedName,

    #[error("could not read payload '{binary}' for version {version}: {source}")]
    MissingPayload {
        version: Version,
        binary: String,
        #[source]
        source: AssetError,
    },

    #[error("asset bundle contains no versions")]
    Empty,
}

/// An instance could not be extracted or started.
#[derive(thiserror::Error, Debug)]
pub enum LaunchError {
    #[error("no free port left to allocate for version {version}")]
    PortsExhausted { version: Version },

    #[error("could not extract binary for version {version}: {source}")]
    Extract {
        version: Version,
        #[source]
        source: std::io::Error,
    },

    #[error("could not start binary for version {version}: {source}")]
    Spawn {
        version: Version,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {timeout:?} launching version {version}")]
    Timeout { version: Version, timeout: Duration },

    #[error("launch task for version {version} aborted: {reason}")]
    Aborted { version: Version, reason: String },
}

impl LaunchError {
    /// The version whose launch failed.
    pub fn version(&self) -> &Version {
        match self {
            Self::PortsExhausted { version }
            | Self::Extract { version, .. }
            | Self::Spawn { version, .. }
            | Self::Timeout { version, .. }
            | Self::Aborted { version, .. } => version,
        }
    }
}

/// Top-level supervisor startup failure.
#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("configured latest version is invalid: {0}")]
    InvalidLatest(#[source] VersionError),

    #[error("configured latest version {0} is not in the asset bundle")]
    UnknownLatest(Version),

    #[error("could not prepare extraction directory: {0}")]
    ExtractDir(#[source] std::io::Error),

    #[error("port {port} is reserved but falls in the instance port range {first}..={last}")]
    ReservedPort { port: u16, first: u16, last: u32 },
}
