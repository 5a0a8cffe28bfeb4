//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming body bytes (one of the RPC endpoints)
//!     → envelope.rs (bare vs. {"ABVersion","Req"} envelope)
//!     → Return: (version, payload) or MalformedRequest
//!     → VersionMapping lookup (http layer)
//! ```
//!
//! # Design Decisions
//! - One generic resolver shared by every endpoint
//! - Endpoints only bind a path to a payload type
//! - Deterministic: same input always resolves the same way

pub mod endpoints;
pub mod envelope;

pub use endpoints::{
    DistroSigImageConfig, Endpoint, LatestSigImageConfig, NodeBootstrapData, NodeBootstrapDataRequest,
    SigImageConfigRequest,
};
pub use envelope::{resolve, MalformedRequest, Payload, Resolved, VersionedRequest};
