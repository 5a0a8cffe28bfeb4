//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → routing::resolve (version + payload)
//!     → VersionMapping lookup
//!     → forward.rs (POST to the instance, relay response)
//!     → error.rs (classified failure if any step fails)
//!     → Send to client
//! ```

pub mod error;
pub mod forward;
pub mod request;
pub mod server;

pub use error::RouteError;
pub use forward::Forwarder;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, HEALTHZ_PATH};
