//! Dual-format request resolution.
//!
//! # Responsibilities
//! - Accept either a bare payload or a `{"ABVersion", "Req"}` envelope
//! - Decide the target version (`latest` for bare payloads)
//! - Reject bodies that are invalid under both shapes
//!
//! # Design Decisions
//! - Pure function of the body bytes: resolving twice gives the same result
//! - A structural decode failure never falls back to the bare shape
//! - Only JSON objects are accepted; arrays never match either shape
//! - "Absent payload" means missing, `null`, or equal to `T::default()`.
//!   A payload whose fields are all legitimately default cannot be told
//!   apart from an absent one and is rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::versions::{Version, VersionError};

/// Inner request payload carried by an endpoint.
pub trait Payload: Serialize + DeserializeOwned + Default + PartialEq + Send + Sync + 'static {
    /// True when the payload carries content.
    fn is_present(&self) -> bool {
        *self != Self::default()
    }
}

impl<T> Payload for T where T: Serialize + DeserializeOwned + Default + PartialEq + Send + Sync + 'static {}

/// A request pinned to an explicit version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedRequest<T> {
    /// Release to route to, or `latest`.
    #[serde(rename = "ABVersion", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// The payload forwarded to the instance.
    #[serde(rename = "Req", default, skip_serializing_if = "Option::is_none")]
    pub req: Option<T>,
}

/// The outcome of resolving a request body.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub version: Version,
    pub payload: T,
}

/// Why a request body was rejected before any forwarding.
#[derive(thiserror::Error, Debug)]
pub enum MalformedRequest {
    #[error("empty body")]
    EmptyBody,

    #[error("could not decode request body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("version set without a request body: ABVersion requires Req")]
    VersionWithoutRequest,

    #[error("no valid request content")]
    NoContent,

    #[error("no valid request content: {0}")]
    BareDecode(#[source] serde_json::Error),

    #[error("version required: Req requires ABVersion")]
    VersionRequired,

    #[error("invalid ABVersion: {0}")]
    InvalidVersion(#[source] VersionError),
}

/// Resolve `body` into a target version and payload of type `T`.
pub fn resolve<T: Payload>(body: &[u8]) -> Result<Resolved<T>, MalformedRequest> {
    if body.is_empty() {
        return Err(MalformedRequest::EmptyBody);
    }

    let value: Value = serde_json::from_slice(body).map_err(MalformedRequest::Decode)?;
    if !value.is_object() {
        return Err(MalformedRequest::NotAnObject);
    }

    let envelope = VersionedRequest::<T>::deserialize(&value).map_err(MalformedRequest::Decode)?;
    let version = envelope.version.unwrap_or_default();

    match envelope.req.filter(T::is_present) {
        None => {
            if !version.is_empty() {
                return Err(MalformedRequest::VersionWithoutRequest);
            }
            let payload = T::deserialize(&value).map_err(MalformedRequest::BareDecode)?;
            if !payload.is_present() {
                return Err(MalformedRequest::NoContent);
            }
            Ok(Resolved {
                version: Version::latest(),
                payload,
            })
        }
        Some(payload) => {
            if version.is_empty() {
                return Err(MalformedRequest::VersionRequired);
            }
            let version = Version::parse(&version).map_err(MalformedRequest::InvalidVersion)?;
            Ok(Resolved { version, payload })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase", default)]
    struct Config {
        r#type: String,
        data: String,
    }

    fn config() -> Config {
        Config {
            r#type: "test".into(),
            data: "data".into(),
        }
    }

    #[test]
    fn test_resolve_cases() {
        struct Case {
            name: &'static str,
            body: &'static [u8],
            want: Option<(&'static str, Config)>,
        }

        let cases = vec![
            Case { name: "empty body", body: b"", want: None },
            Case { name: "bad json", body: b"{", want: None },
            Case { name: "version without req", body: br#"{"ABVersion":"1.0.0"}"#, want: None },
            Case { name: "bare body without known fields", body: br#"{"Random": "data"}"#, want: None },
            Case {
                name: "bare body routes to latest",
                body: br#"{"Type": "test", "Data": "data"}"#,
                want: Some(("latest", config())),
            },
            Case {
                name: "req without version",
                body: br#"{"Req":{"Type": "test", "Data": "data"}}"#,
                want: None,
            },
            Case {
                name: "versioned request",
                body: br#"{"ABVersion":"1.0.0","Req":{"Type": "test", "Data": "data"}}"#,
                want: Some(("1.0.0", config())),
            },
            Case {
                name: "explicit latest",
                body: br#"{"ABVersion":"latest","Req":{"Type": "test"}}"#,
                want: Some(("latest", Config { r#type: "test".into(), data: String::new() })),
            },
            Case {
                name: "version set, empty req",
                body: br#"{"ABVersion":"1.0.0","Req":{}}"#,
                want: None,
            },
            Case {
                name: "version set, null req",
                body: br#"{"ABVersion":"1.0.0","Req":null}"#,
                want: None,
            },
            Case {
                name: "invalid version",
                body: br#"{"ABVersion":"one","Req":{"Type": "test"}}"#,
                want: None,
            },
            Case { name: "type mismatch", body: br#"{"ABVersion":1,"Req":{"Type":"x"}}"#, want: None },
            Case { name: "positional array", body: br#"["1.0.0",{"Type":"x"}]"#, want: None },
        ];

        for case in cases {
            let got = resolve::<Config>(case.body);
            match (&case.want, got) {
                (None, Err(_)) => {}
                (None, Ok(r)) => panic!("{}: got {:?}, want error", case.name, r),
                (Some(_), Err(e)) => panic!("{}: got error {}, want success", case.name, e),
                (Some((version, payload)), Ok(r)) => {
                    assert_eq!(r.version.as_str(), *version, "{}", case.name);
                    assert_eq!(&r.payload, payload, "{}", case.name);
                }
            }
        }
    }

    #[test]
    fn test_structural_failure_does_not_fall_back() {
        assert!(matches!(resolve::<Config>(b"{"), Err(MalformedRequest::Decode(_))));
        assert!(matches!(resolve::<Config>(b"[1"), Err(MalformedRequest::Decode(_))));
        // Valid envelope, but the bare shape does not fit `Config`.
        assert!(matches!(
            resolve::<Config>(br#"{"Type": 5}"#),
            Err(MalformedRequest::BareDecode(_))
        ));
    }

    #[test]
    fn test_non_object_bodies_are_rejected() {
        let bodies: [&[u8]; 4] = [br#"["1.0.0",{"Type":"x"}]"#, b"null", b"\"1.0.0\"", b"42"];
        for body in bodies {
            assert!(
                matches!(resolve::<Config>(body), Err(MalformedRequest::NotAnObject)),
                "{}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(resolve::<Config>(b""), Err(MalformedRequest::EmptyBody)));
        assert!(matches!(
            resolve::<Config>(br#"{"ABVersion":"1.0.0"}"#),
            Err(MalformedRequest::VersionWithoutRequest)
        ));
        assert!(matches!(
            resolve::<Config>(br#"{"Req":{"Data":"x"}}"#),
            Err(MalformedRequest::VersionRequired)
        ));
        assert!(matches!(resolve::<Config>(b"{}"), Err(MalformedRequest::NoContent)));
        assert!(matches!(
            resolve::<Config>(br#"{"ABVersion":"1.0","Req":{"Data":"x"}}"#),
            Err(MalformedRequest::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let body = br#"{"ABVersion":"1.1.0","Req":{"Type":"x","Data":"y"}}"#;
        let first = resolve::<Config>(body).unwrap();
        let second = resolve::<Config>(body).unwrap();
        assert_eq!(first, second);
    }
}
