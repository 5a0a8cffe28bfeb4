//! Version subsystem.
//!
//! # Data Flow
//! ```text
//! asset directory name / client "ABVersion"
//!     → version.rs (validate, order by precedence)
//!     → mapping.rs (version → http://localhost:<port>)
//!     → Return: base address or explicit not-found
//! ```

pub mod mapping;
pub mod version;

pub use mapping::{local_base, VersionMapping};
pub use version::{Version, VersionError, LATEST};
