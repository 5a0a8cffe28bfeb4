//! Startup orchestration.
//!
//! # Responsibilities
//! - Launch every instance and build the version mapping
//! - Bind the listener and serve until shutdown
//! - Stop the instances once the server has drained
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only once every instance is started)
//! - A shutdown signal during startup abandons it; started instances are killed

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::assets::AssetSource;
use crate::config::{listener_port, RouterConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::supervisor::{Supervisor, SupervisorError};

/// Fatal error while starting or serving.
#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error("could not bind listener on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start instances from `source`, then serve until `shutdown` fires.
pub async fn run(config: RouterConfig, source: &dyn AssetSource, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Subscribed before launching so a signal during startup is not lost.
    let mut signal = shutdown.subscribe();
    let reserved = listener_port(&config.listener.bind_address);
    let started = tokio::select! {
        biased;
        _ = signal.recv() => None,
        started = Supervisor::start_reserving(&config.instances, source, reserved) => Some(started?),
    };
    // Dropping an unfinished start kills whatever it had spawned.
    let Some((supervisor, mapping)) = started else {
        tracing::info!("Shutdown requested during startup");
        return Ok(());
    };

    metrics::record_instances(supervisor.instances().len());
    for instance in supervisor.instances() {
        tracing::info!(version = %instance.version, base = %instance.base, "Version mapped");
    }
    if let Some(latest) = mapping.latest() {
        tracing::info!(version = %latest, "Latest alias mapped");
    }

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(source) => {
            supervisor.shutdown().await;
            return Err(StartupError::Bind {
                address: config.listener.bind_address.clone(),
                source,
            });
        }
    };

    let server = HttpServer::new(config, mapping);
    let served = server.run(listener, signal).await;

    supervisor.shutdown().await;
    served.map_err(StartupError::Serve)
}
