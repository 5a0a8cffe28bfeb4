//! Instance extraction and process launch.
//!
//! # Responsibilities
//! - Allocate one local port per version
//! - Write each payload to a private executable file
//! - Start the extracted binary with its port argument
//!
//! # Design Decisions
//! - Ports are allocated in entry order before any task runs, so the
//!   version → port assignment is the same on every start
//! - All-or-nothing: on any failure the started instances are killed
//! - Started is treated as ready; there is no readiness probe

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::task::JoinSet;
use url::Url;

use crate::supervisor::{AssetEntry, LaunchError, PortAllocator};
use crate::versions::{local_base, Version};

/// How long a stopping instance gets to exit before it is abandoned.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Settings shared by every launch.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Directory the payloads are extracted under (one subdirectory per version).
    pub extract_dir: PathBuf,
    /// File name of the extracted binary.
    pub binary_name: String,
    /// Flag that precedes the port argument, e.g. `--port`.
    pub port_flag: String,
    /// Deadline for extracting a single version.
    pub timeout: Duration,
}

/// A running instance of one version.
#[derive(Debug)]
pub struct Instance {
    pub version: Version,
    pub port: u16,
    pub base: Url,
    child: Child,
}

impl Instance {
    /// OS process id, `None` once the process has been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Kill the process and wait briefly for it to exit.
    pub async fn stop(&mut self) {
        if let Err(e) = self.child.start_kill() {
            tracing::debug!(version = %self.version, error = %e, "Instance already exited");
            return;
        }
        match tokio::time::timeout(STOP_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => tracing::info!(version = %self.version, %status, "Instance stopped"),
            Ok(Err(e)) => tracing::warn!(version = %self.version, error = %e, "Failed to reap instance"),
            Err(_) => tracing::warn!(version = %self.version, "Instance did not exit in time"),
        }
    }
}

/// Extract and start every entry. Either every instance is running or none is.
pub async fn launch(
    entries: Vec<AssetEntry>,
    ports: &PortAllocator,
    options: &LaunchOptions,
) -> Result<Vec<Instance>, LaunchError> {
    let mut planned = Vec::with_capacity(entries.len());
    for entry in entries {
        let port = ports.allocate().ok_or_else(|| LaunchError::PortsExhausted {
            version: entry.version.clone(),
        })?;
        planned.push((entry, port));
    }

    let extracted = extract_all(planned, options).await?;

    // Spawned only after every write handle is closed; a fork racing an open
    // handle to another version's binary makes exec fail with ETXTBSY.
    let mut instances: Vec<Instance> = Vec::with_capacity(extracted.len());
    for (version, port, path) in extracted {
        match spawn(&path, &options.port_flag, port) {
            Ok(child) => {
                let base = local_base(port);
                tracing::info!(version = %version, port, pid = ?child.id(), "Instance started");
                instances.push(Instance { version, port, base, child });
            }
            Err(source) => {
                tracing::error!(version = %version, error = %source, "Instance failed to start");
                for instance in &mut instances {
                    instance.stop().await;
                }
                return Err(LaunchError::Spawn { version, source });
            }
        }
    }
    Ok(instances)
}

/// Write every payload concurrently, returning `(version, port, path)` in port order.
async fn extract_all(
    planned: Vec<(AssetEntry, u16)>,
    options: &LaunchOptions,
) -> Result<Vec<(Version, u16, PathBuf)>, LaunchError> {
    let mut tasks = JoinSet::new();
    let mut task_versions = HashMap::new();

    for (entry, port) in planned {
        let dir = options.extract_dir.join(entry.version.as_str());
        let path = dir.join(&options.binary_name);
        let timeout = options.timeout;
        let version = entry.version.clone();

        let handle = tasks.spawn(async move {
            match tokio::time::timeout(timeout, extract(&dir, &path, &entry.payload)).await {
                Ok(Ok(())) => Ok((entry.version, port, path)),
                Ok(Err(source)) => Err(LaunchError::Extract {
                    version: entry.version,
                    source,
                }),
                Err(_) => Err(LaunchError::Timeout {
                    version: entry.version,
                    timeout,
                }),
            }
        });
        task_versions.insert(handle.id(), version);
    }

    let mut extracted = Vec::with_capacity(task_versions.len());
    let mut first_error = None;
    while let Some(joined) = tasks.join_next_with_id().await {
        let outcome = match joined {
            Ok((_, outcome)) => outcome,
            Err(e) => match task_versions.remove(&e.id()) {
                Some(version) => Err(LaunchError::Aborted {
                    version,
                    reason: e.to_string(),
                }),
                None => continue,
            },
        };
        match outcome {
            Ok(done) => extracted.push(done),
            Err(e) => {
                tracing::error!(version = %e.version(), error = %e, "Extraction failed");
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }
    extracted.sort_by_key(|(_, port, _)| *port);
    Ok(extracted)
}

async fn extract(dir: &Path, path: &Path, payload: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await?;
    file.write_all(payload).await?;
    file.sync_all().await?;
    drop(file);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    }
    Ok(())
}

fn spawn(path: &Path, port_flag: &str, port: u16) -> std::io::Result<Child> {
    Command::new(path)
        .arg(port_flag)
        .arg(port.to_string())
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
}
