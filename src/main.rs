//! Version-aware router for bootstrap-data instances.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 BAKERY ROUTER                │
//!                       │                                              │
//!   Client Request      │  ┌────────┐   ┌──────────┐   ┌───────────┐  │
//!   ────────────────────┼─▶│  http  │──▶│ routing  │──▶│ versions  │  │
//!                       │  │ server │   │ envelope │   │  mapping  │  │
//!                       │  └────────┘   └──────────┘   └─────┬─────┘  │
//!                       │                                     ▼        │
//!   Client Response     │  ┌────────┐                  ┌───────────┐  │      Instance
//!   ◀───────────────────┼──│ relay  │◀─────────────────│  forward  │◀─┼───── (one per
//!                       │  └────────┘                  └───────────┘  │       version)
//!                       │                                              │
//!                       │  Startup: assets → supervisor (discover,     │
//!                       │           extract, spawn) → mapping          │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use bakery_router::assets::DirAssetSource;
use bakery_router::config::{load_config, validate_config, ConfigError, RouterConfig};
use bakery_router::lifecycle::{self, signals, Shutdown};
use bakery_router::observability::logging;

#[derive(Parser)]
#[command(name = "bakery-router")]
#[command(about = "Routes bootstrap-data RPCs to per-version instances", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides `listener.bind_address`.
    #[arg(long)]
    addr: Option<String>,

    /// Asset bundle directory, overrides `instances.assets_dir`.
    #[arg(long)]
    assets_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(addr) = cli.addr {
        config.listener.bind_address = addr;
    }
    if let Some(dir) = cli.assets_dir {
        config.instances.assets_dir = dir;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        assets_dir = %config.instances.assets_dir.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "bakery-router starting"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let source = DirAssetSource::new(config.instances.assets_dir.clone());
    if let Err(e) = lifecycle::run(config, &source, shutdown).await {
        tracing::error!(error = %e, "Router failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
