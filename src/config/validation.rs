//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Detect a listener that collides with the instance port range
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::RouterConfig;
use crate::versions::Version;

/// A single semantic problem with the configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a host:port address")]
    BindAddress(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    BodyLimit,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("instances.base_port must be greater than zero")]
    BasePort,

    #[error("instances.base_port {0} collides with the listener port")]
    PortCollision(u16),

    #[error("instances.{0} must not be empty")]
    Empty(&'static str),

    #[error("instances.binary_name '{0}' must be a plain file name")]
    BinaryName(String),

    #[error("instances.latest '{0}' is not a release version")]
    Latest(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Port of a `host:port` listener address. The host may be a name
/// (`localhost:8080`); it is not resolved here.
pub fn listener_port(address: &str) -> Option<u16> {
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Some(addr.port());
    }
    let (host, port) = address.rsplit_once(':')?;
    if host.is_empty() || host.contains(':') {
        return None;
    }
    port.parse().ok()
}

/// Check `config` for semantic errors.
///
/// Only a listener on `instances.base_port` itself is caught here. The full
/// instance range depends on how many versions the bundle holds, so the
/// supervisor checks it again after discovery.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match listener_port(&config.listener.bind_address) {
        Some(port) if port == config.instances.base_port => {
            errors.push(ValidationError::PortCollision(config.instances.base_port));
        }
        Some(_) => {}
        None => errors.push(ValidationError::BindAddress(config.listener.bind_address.clone())),
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    let instances = &config.instances;
    if instances.base_port == 0 {
        errors.push(ValidationError::BasePort);
    }
    if instances.launch_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("launch_timeout_secs"));
    }
    if instances.binary_name.is_empty() {
        errors.push(ValidationError::Empty("binary_name"));
    } else if instances.binary_name.contains(['/', '\\']) || instances.binary_name == ".." {
        errors.push(ValidationError::BinaryName(instances.binary_name.clone()));
    }
    if instances.port_flag.is_empty() {
        errors.push(ValidationError::Empty("port_flag"));
    }
    if let Some(latest) = &instances.latest {
        match Version::parse(latest) {
            Ok(v) if !v.is_latest() => {}
            _ => errors.push(ValidationError::Latest(latest.clone())),
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(config.observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RouterConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = RouterConfig::default();
        config.listener.bind_address = "localhost".into();
        config.timeouts.request_secs = 0;
        config.instances.binary_name = "../agentbaker".into();
        config.instances.latest = Some("newest".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("localhost".into()),
                ValidationError::ZeroTimeout("request_secs"),
                ValidationError::BinaryName("../agentbaker".into()),
                ValidationError::Latest("newest".into()),
            ]
        );
    }

    #[test]
    fn test_hostname_bind_address() {
        let mut config = RouterConfig::default();
        config.listener.bind_address = "localhost:8080".into();
        assert_eq!(validate_config(&config), Ok(()));

        config.listener.bind_address = "localhost:8081".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::PortCollision(8081)])
        );
    }

    #[test]
    fn test_listener_port() {
        assert_eq!(listener_port("127.0.0.1:8080"), Some(8080));
        assert_eq!(listener_port("[::1]:9000"), Some(9000));
        assert_eq!(listener_port("router.internal:80"), Some(80));
        assert_eq!(listener_port("localhost"), None);
        assert_eq!(listener_port(":8080"), None);
        assert_eq!(listener_port("localhost:http"), None);
        assert_eq!(listener_port("::1:8080"), None);
    }

    #[test]
    fn test_port_collision() {
        let mut config = RouterConfig::default();
        config.instances.base_port = 8080;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::PortCollision(8080)])
        );
    }
}
