//! Version-aware router for bootstrap-data instances.
//!
//! At startup the [`supervisor`] extracts one executable per version from an
//! asset bundle, starts each on its own local port and publishes a
//! [`versions::VersionMapping`]. The [`http`] server then resolves every RPC
//! to a version (bare body → `latest`, `{"ABVersion","Req"}` envelope →
//! pinned) and forwards it to that instance.

pub mod assets;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod supervisor;
pub mod versions;

pub use config::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use supervisor::Supervisor;
pub use versions::{Version, VersionMapping};
