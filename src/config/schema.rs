//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Inbound and outbound timeouts.
    pub timeouts: TimeoutConfig,

    /// Asset bundle and instance launch settings.
    pub instances: InstancesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Timeout configuration. The request timeout bounds both the inbound
/// request and the forward to an instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout to an instance, in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Asset bundle and instance launch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstancesConfig {
    /// Directory holding one subdirectory per version.
    pub assets_dir: PathBuf,

    /// File name of the executable inside each version directory.
    pub binary_name: String,

    /// Where payloads are extracted. A private temp dir when unset.
    pub extract_dir: Option<PathBuf>,

    /// First port handed to an instance; later instances count up from here.
    pub base_port: u16,

    /// Flag passed before the port argument.
    pub port_flag: String,

    /// Deadline for extracting a single version, in seconds.
    pub launch_timeout_secs: u64,

    /// Version the `latest` alias resolves to. Highest release when unset.
    pub latest: Option<String>,
}

impl Default for InstancesConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("binaries"),
            binary_name: "agentbaker".to_string(),
            extract_dir: None,
            base_port: 8081,
            port_flag: "--port".to_string(),
            launch_timeout_secs: 30,
            latest: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter; `RUST_LOG` takes precedence.
    pub log_filter: String,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Bind address of the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "bakery_router=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RouterConfig = toml::from_str(
            r#"
            [instances]
            assets_dir = "/opt/bakery/binaries"
            latest = "1.2.0"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.instances.assets_dir, PathBuf::from("/opt/bakery/binaries"));
        assert_eq!(config.instances.binary_name, "agentbaker");
        assert_eq!(config.instances.base_port, 8081);
        assert_eq!(config.instances.latest.as_deref(), Some("1.2.0"));
        assert!(!config.observability.metrics_enabled);
    }
}
