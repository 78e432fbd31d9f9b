//! Tokens handed back in the URL fragment after following a magic link.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{
    error::{ClientError, ClientResult}, wire::TokenSet
};

/// Tokens and link type from a redirect fragment.
#[derive(Clone, Debug)]
pub struct FragmentTokens {
    pub tokens: TokenSet,
    /// `magiclink`, `signup`, `recovery`, ...
    pub kind: Option<String>,
}

/// Parse `#access_token=…&refresh_token=…&expires_in=…`.
///
/// Returns `Ok(None)` when the fragment carries no tokens at all, and the
/// backend's description when it carries an error instead.
pub fn parse_fragment(fragment: &str, now: DateTime<Utc>) -> ClientResult<Option<FragmentTokens>> {
    let raw = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut pairs: HashMap<String, String> = url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect();

    if let Some(description) = pairs.remove("error_description").or_else(|| pairs.remove("error")) {
        return Err(ClientError::Rejected(description));
    }
    let Some(access_token) = pairs.remove("access_token").filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let refresh_token = pairs
        .remove("refresh_token")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientError::Decode("redirect fragment has no refresh_token".to_string()))?;

    let number = |key: &str| pairs.get(key).and_then(|v| v.parse::<i64>().ok());
    let tokens = TokenSet::from_parts(access_token, refresh_token, number("expires_at"), number("expires_in"), now);

    Ok(Some(FragmentTokens {
        tokens,
        kind: pairs.get("type").cloned(),
    }))
}
