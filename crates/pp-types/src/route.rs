//! Well-known application paths and the remembered post-sign-in destination.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entry point of the sign-in flow.
pub const SIGN_IN_PATH: &str = "/signin";
/// Account creation page.
pub const SIGN_UP_PATH: &str = "/signup";
/// Where a visitor lands after signing in when nothing else was requested.
pub const DEFAULT_LANDING_PATH: &str = "/";

/// A validated local location to return to once sign-in succeeds.
///
/// Only absolute local paths are accepted. Protocol-relative (`//host`),
/// backslash-prefixed and scheme-qualified values are rejected so the value
/// can never redirect off-site. The sign-in pages themselves are rejected as
/// well to avoid bouncing back into the flow.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReturnTo(String);

impl ReturnTo {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if !raw.starts_with('/') || raw.starts_with("//") || raw.starts_with("/\\") {
            return None;
        }
        if raw.chars().any(|c| c.is_control()) {
            return None;
        }
        let path = raw.split(['?', '#']).next().unwrap_or(raw);
        if path == SIGN_IN_PATH || path == SIGN_UP_PATH {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Destination after sign-in: the remembered location or the landing path.
    pub fn destination(return_to: Option<&ReturnTo>) -> &str {
        return_to.map(ReturnTo::as_str).unwrap_or(DEFAULT_LANDING_PATH)
    }
}

impl fmt::Display for ReturnTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ReturnTo {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ReturnTo::parse(&value).ok_or_else(|| format!("not a local path: {}", value))
    }
}

impl From<ReturnTo> for String {
    fn from(value: ReturnTo) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_local_paths() {
        assert_eq!(ReturnTo::parse("/projects").unwrap().as_str(), "/projects");
        assert_eq!(ReturnTo::parse(" /projects/42?tab=steps ").unwrap().as_str(), "/projects/42?tab=steps");
        assert_eq!(ReturnTo::parse("/").unwrap().as_str(), "/");
    }

    #[test]
    fn test_rejects_offsite_and_loops() {
        for raw in [
            "",
            "projects",
            "//evil.example",
            "/\\evil.example",
            "https://evil.example/",
            "javascript:alert(1)",
            "/signin",
            "/signin?from=/x",
            "/signup",
            "/pro\njects",
        ] {
            assert!(ReturnTo::parse(raw).is_none(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_destination_defaults_to_landing() {
        assert_eq!(ReturnTo::destination(None), DEFAULT_LANDING_PATH);
        let to = ReturnTo::parse("/reports").unwrap();
        assert_eq!(ReturnTo::destination(Some(&to)), "/reports");
    }
}
