//! Release version identifier.
//!
//! # Responsibilities
//! - Validate release tags (`[v]MAJOR.MINOR.PATCH[-PRE][+BUILD]`)
//! - Represent the reserved `latest` alias
//! - Order release tags by semantic-version precedence
//!
//! # Design Decisions
//! - Parsed once at construction; the original text is kept for display and
//!   map lookups so `v1.0.0` and `1.0.0` stay distinct versions
//! - Build metadata does not affect precedence, the original text breaks ties

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The reserved alias that routes to the designated latest release.
pub const LATEST: &str = "latest";

/// Error returned when a string is not a valid version.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("version is empty")]
    Empty,

    #[error("version '{0}' must have the form MAJOR.MINOR.PATCH")]
    Shape(String),

    #[error("version '{version}' has an invalid numeric component '{component}'")]
    Numeric { version: String, component: String },

    #[error("version '{version}' has an invalid identifier '{identifier}'")]
    Identifier { version: String, identifier: String },
}

/// A validated release version, or the `latest` alias.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    release: Option<Release>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Release {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Vec<String>,
}

impl Version {
    /// Parse and validate a version string.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        if s.is_empty() {
            return Err(VersionError::Empty);
        }
        if s == LATEST {
            return Ok(Self::latest());
        }
        let release = parse_release(s)?;
        Ok(Self {
            raw: s.to_string(),
            release: Some(release),
        })
    }

    /// The `latest` alias.
    pub fn latest() -> Self {
        Self {
            raw: LATEST.to_string(),
            release: None,
        }
    }

    /// Returns true for the `latest` alias.
    pub fn is_latest(&self) -> bool {
        self.release.is_none()
    }

    /// Returns true if this release carries a pre-release tag (e.g. `-rc.1`).
    pub fn is_prerelease(&self) -> bool {
        self.release.as_ref().is_some_and(|r| !r.pre.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn parse_release(s: &str) -> Result<Release, VersionError> {
    let body = s.strip_prefix('v').unwrap_or(s);

    let (body, build) = match body.split_once('+') {
        Some((b, meta)) => (b, Some(meta)),
        None => (body, None),
    };
    let (core, pre) = match body.split_once('-') {
        Some((c, p)) => (c, Some(p)),
        None => (body, None),
    };

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() != 3 {
        return Err(VersionError::Shape(s.to_string()));
    }

    let mut nums = [0u64; 3];
    for (slot, part) in nums.iter_mut().zip(&parts) {
        *slot = parse_numeric(s, part)?;
    }

    let pre = match pre {
        Some(p) => p
            .split('.')
            .map(|id| check_identifier(s, id).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    if let Some(meta) = build {
        for id in meta.split('.') {
            check_identifier(s, id)?;
        }
    }

    Ok(Release {
        major: nums[0],
        minor: nums[1],
        patch: nums[2],
        pre,
    })
}

fn parse_numeric(version: &str, part: &str) -> Result<u64, VersionError> {
    let bad = || VersionError::Numeric {
        version: version.to_string(),
        component: part.to_string(),
    };
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(bad());
    }
    part.parse().map_err(|_| bad())
}

fn check_identifier<'a>(version: &str, id: &'a str) -> Result<&'a str, VersionError> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(VersionError::Identifier {
            version: version.to_string(),
            identifier: id.to_string(),
        });
    }
    Ok(id)
}

/// Pre-release identifier precedence: numeric < alphanumeric, numerics by value.
fn cmp_identifier(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl Ord for Release {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    for (a, b) in self.pre.iter().zip(&other.pre) {
                        let ord = cmp_identifier(a, b);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    self.pre.len().cmp(&other.pre.len())
                }
            })
    }
}

impl PartialOrd for Release {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Version {}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

/// Releases sort by precedence; `latest` sorts after every release.
impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.release, &other.release) {
            (Some(a), Some(b)) => a.cmp(b).then_with(|| self.raw.cmp(&other.raw)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_accepts_release_tags() {
        for s in ["1.0.0", "v0.20240503.0", "10.2.33-rc.1", "1.0.0+build.5", "1.0.0-alpha-1+sha.abc"] {
            assert!(Version::parse(s).is_ok(), "{s} should parse");
        }
        assert!(v("latest").is_latest());
        assert!(v("1.0.0-rc.1").is_prerelease());
        assert!(!v("1.0.0").is_prerelease());
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(Version::parse(""), Err(VersionError::Empty));
        for s in ["1.0", "1.0.0.0", "a.b.c", "01.0.0", "1..0", "1.0.0-", "1.0.0-rc!", "1.0.0+", "Latest", "../1.0.0"] {
            assert!(Version::parse(s).is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn test_precedence() {
        assert!(v("1.0.0") < v("1.1.0"));
        assert!(v("1.9.0") < v("1.10.0"));
        assert!(v("1.0.0-rc.1") < v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.2") < v("1.0.0-alpha.10"));
        assert!(v("1.0.0-1") < v("1.0.0-alpha"));
        assert!(v("99.0.0") < v("latest"));
        assert_ne!(v("1.0.0"), v("v1.0.0"));
        assert_ne!(v("1.0.0").cmp(&v("v1.0.0")), Ordering::Equal);
    }

    #[test]
    fn test_display_round_trips_text() {
        assert_eq!(v("v2.3.4+meta").to_string(), "v2.3.4+meta");
        assert_eq!(Version::latest().as_str(), LATEST);
    }
}
