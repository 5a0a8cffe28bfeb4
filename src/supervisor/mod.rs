//! Instance supervisor subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (blocking, once):
//!     AssetSource
//!     → discovery.rs (validate version dirs, read payloads)
//!     → select latest (configured pin or highest release)
//!     → launcher.rs (allocate ports, extract, spawn)
//!     → build_mapping (version → http://localhost:<port>)
//!     → VersionMapping handed to the HTTP layer
//!
//! Shutdown:
//!     Supervisor::shutdown → kill every instance → remove temp dir
//! ```
//!
//! # Design Decisions
//! - The HTTP layer only sees the `VersionMapping`, never process handles
//! - No health monitoring or restart: a crashed instance stays down
//! - Any startup failure is fatal; no partial mapping is ever published

pub mod discovery;
pub mod error;
pub mod launcher;
pub mod ports;

pub use discovery::{discover, AssetEntry};
pub use error::{DiscoveryError, LaunchError, SupervisorError};
pub use launcher::{launch, Instance, LaunchOptions};
pub use ports::PortAllocator;

use std::time::Duration;
use tempfile::TempDir;

use crate::assets::AssetSource;
use crate::config::InstancesConfig;
use crate::versions::{Version, VersionMapping};

/// Owns every launched instance for the lifetime of the router.
#[derive(Debug)]
pub struct Supervisor {
    ports: PortAllocator,
    instances: Vec<Instance>,
    // Removed on drop when the extraction dir was not configured.
    _extract_dir: Option<TempDir>,
}

impl Supervisor {
    /// Discover, launch and map every version in `source`.
    pub async fn start(
        config: &InstancesConfig,
        source: &dyn AssetSource,
    ) -> Result<(Self, VersionMapping), SupervisorError> {
        Self::start_reserving(config, source, None).await
    }

    /// Like [`Supervisor::start`], but fails before anything is extracted
    /// when `reserved` (the listener port) would be handed to an instance.
    pub async fn start_reserving(
        config: &InstancesConfig,
        source: &dyn AssetSource,
        reserved: Option<u16>,
    ) -> Result<(Self, VersionMapping), SupervisorError> {
        let entries = discover(source, &config.binary_name)?;
        if let Some(port) = reserved {
            check_reserved(port, config.base_port, entries.len())?;
        }

        let pin = config
            .latest
            .as_deref()
            .map(Version::parse)
            .transpose()
            .map_err(SupervisorError::InvalidLatest)?;
        let latest = select_latest(&entries, pin)?;

        let (temp_dir, extract_dir) = match &config.extract_dir {
            Some(dir) => (None, dir.clone()),
            None => {
                let dir = tempfile::Builder::new()
                    .prefix("bakery-router-")
                    .tempdir()
                    .map_err(SupervisorError::ExtractDir)?;
                let path = dir.path().to_path_buf();
                (Some(dir), path)
            }
        };

        tracing::info!(
            versions = entries.len(),
            latest = %latest,
            base_port = config.base_port,
            "Launching instances"
        );

        let ports = PortAllocator::new(config.base_port);
        let options = LaunchOptions {
            extract_dir,
            binary_name: config.binary_name.clone(),
            port_flag: config.port_flag.clone(),
            timeout: Duration::from_secs(config.launch_timeout_secs),
        };
        let instances = launch(entries, &ports, &options).await?;
        let mapping = build_mapping(&instances, latest);

        Ok((
            Self {
                ports,
                instances,
                _extract_dir: temp_dir,
            },
            mapping,
        ))
    }

    /// Running instances, in port order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// The allocator that assigned every instance port.
    pub fn ports(&self) -> &PortAllocator {
        &self.ports
    }

    /// Stop every instance and clean up extracted binaries.
    pub async fn shutdown(mut self) {
        for instance in &mut self.instances {
            instance.stop().await;
        }
        tracing::info!(instances = self.instances.len(), "Supervisor stopped");
    }
}

/// Pick the release `latest` resolves to.
///
/// A configured pin must name a discovered version. Otherwise the highest
/// stable release wins, falling back to the highest pre-release when the
/// bundle holds nothing else.
pub fn select_latest(entries: &[AssetEntry], pin: Option<Version>) -> Result<Version, SupervisorError> {
    if let Some(pin) = pin {
        if entries.iter().any(|e| e.version == pin) {
            return Ok(pin);
        }
        return Err(SupervisorError::UnknownLatest(pin));
    }

    let stable = entries.iter().filter(|e| !e.version.is_prerelease()).map(|e| &e.version).max();
    stable
        .or_else(|| entries.iter().map(|e| &e.version).max())
        .cloned()
        .ok_or(SupervisorError::Discovery(DiscoveryError::Empty))
}

/// Fail when `port` lies in the `count` ports allocated from `base`.
fn check_reserved(port: u16, base: u16, count: usize) -> Result<(), SupervisorError> {
    let first = u32::from(base);
    let last = first.saturating_add(u32::try_from(count).unwrap_or(u32::MAX).saturating_sub(1));
    if count > 0 && (first..=last).contains(&u32::from(port)) {
        return Err(SupervisorError::ReservedPort { port, first: base, last });
    }
    Ok(())
}

/// Collapse launched instances into the published mapping.
pub fn build_mapping(instances: &[Instance], latest: Version) -> VersionMapping {
    VersionMapping::new(
        instances.iter().map(|i| (i.version.clone(), i.base.clone())),
        Some(latest),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(v: &str) -> AssetEntry {
        AssetEntry {
            version: Version::parse(v).unwrap(),
            payload: Vec::new(),
        }
    }

    #[test]
    fn test_latest_is_highest_stable() {
        let entries = vec![entry("1.0.0"), entry("1.10.0"), entry("1.9.0"), entry("2.0.0-rc.1")];
        assert_eq!(select_latest(&entries, None).unwrap().as_str(), "1.10.0");

        let entries = vec![entry("2.0.0-rc.1"), entry("2.0.0-rc.2")];
        assert_eq!(select_latest(&entries, None).unwrap().as_str(), "2.0.0-rc.2");
    }

    #[test]
    fn test_reserved_port_range() {
        assert!(check_reserved(8080, 8081, 3).is_ok());
        assert!(check_reserved(8084, 8081, 3).is_ok());
        assert!(matches!(
            check_reserved(8083, 8081, 3),
            Err(SupervisorError::ReservedPort { port: 8083, first: 8081, last: 8083 })
        ));
        assert!(check_reserved(8081, 8081, 0).is_ok());
    }

    #[test]
    fn test_latest_pin() {
        let entries = vec![entry("1.0.0"), entry("1.1.0")];
        let pin = Version::parse("1.0.0").unwrap();
        assert_eq!(select_latest(&entries, Some(pin.clone())).unwrap(), pin);

        let missing = Version::parse("3.0.0").unwrap();
        assert!(matches!(
            select_latest(&entries, Some(missing)),
            Err(SupervisorError::UnknownLatest(_))
        ));
    }
}
