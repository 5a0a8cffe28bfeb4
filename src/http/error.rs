//! Per-request error taxonomy.
//!
//! Every variant maps to a status code and a machine-readable code so callers
//! can tell "fix your request" from "try again" from "no such version".
//! Messages never include instance addresses or process details.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;

use crate::routing::MalformedRequest;
use crate::versions::Version;

#[derive(thiserror::Error, Debug)]
pub enum RouteError {
    #[error("malformed request: {0}")]
    Malformed(#[from] MalformedRequest),

    #[error("could not read request body: {0}")]
    Body(#[source] axum::Error),

    #[error("version {0} not found")]
    VersionNotFound(Version),

    #[error("instance for version {version} is unavailable: {source}")]
    UpstreamUnavailable {
        version: Version,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("instance for version {version} did not respond within {timeout:?}")]
    UpstreamTimeout { version: Version, timeout: Duration },

    #[error("instance for version {version} returned status {status}")]
    UpstreamStatus { version: Version, status: StatusCode },

    #[error("could not encode request for version {version}: {source}")]
    Encode {
        version: Version,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not build instance request for version {0}")]
    Target(Version),
}

impl RouteError {
    /// HTTP status returned to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Malformed(_) | Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::VersionNotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable { .. } | Self::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Encode { .. } | Self::Target(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed(_) | Self::Body(_) => "MALFORMED_REQUEST",
            Self::VersionNotFound(_) => "VERSION_NOT_FOUND",
            Self::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamTimeout { .. } => "UPSTREAM_TIMEOUT",
            Self::UpstreamStatus { .. } => "UPSTREAM_ERROR_STATUS",
            Self::Encode { .. } | Self::Target(_) => "INTERNAL_ERROR",
        }
    }

    /// The version the request resolved to, when resolution got that far.
    pub fn version(&self) -> Option<&Version> {
        match self {
            Self::Malformed(_) | Self::Body(_) => None,
            Self::VersionNotFound(version)
            | Self::Target(version)
            | Self::UpstreamUnavailable { version, .. }
            | Self::UpstreamTimeout { version, .. }
            | Self::UpstreamStatus { version, .. }
            | Self::Encode { version, .. } => Some(version),
        }
    }

    /// Metrics label for the version. Only versions present in the mapping
    /// are used verbatim; a client-supplied unknown version is `unknown`.
    pub fn version_label(&self) -> String {
        match self {
            Self::VersionNotFound(_) => "unknown".to_string(),
            _ => self.version().map_or_else(|| "none".to_string(), ToString::to_string),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "error_code": self.error_code(),
        });
        if let Self::UpstreamStatus { status, .. } = self {
            body["upstream_status"] = status.as_u16().into();
        }
        body
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, axum::Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let v = Version::parse("9.9.9").unwrap();

        let err = RouteError::from(MalformedRequest::EmptyBody);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.version().is_none());

        let err = RouteError::VersionNotFound(v.clone());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_json()["error"], "version 9.9.9 not found");
        assert_eq!(err.to_json()["error_code"], "VERSION_NOT_FOUND");

        let err = RouteError::UpstreamStatus {
            version: v,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_json()["upstream_status"], 500);
    }

    #[test]
    fn test_version_label_is_bounded() {
        let err = RouteError::VersionNotFound(Version::parse("1.0.0-a8f3e1").unwrap());
        assert_eq!(err.version_label(), "unknown");

        let err = RouteError::from(MalformedRequest::NoContent);
        assert_eq!(err.version_label(), "none");

        let err = RouteError::UpstreamTimeout {
            version: Version::parse("1.1.0").unwrap(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.version_label(), "1.1.0");
    }
}
