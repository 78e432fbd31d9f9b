//! Response bodies of the auth service and their mapping onto domain types.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pp_types::{Identity, Session};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

impl From<UserResponse> for Identity {
    fn from(user: UserResponse) -> Self {
        Identity {
            id: user.id.into(),
            email: user.email.filter(|e| !e.is_empty()),
            full_name: user.user_metadata.and_then(|m| m.full_name),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: UserResponse,
}

/// Sign-up answers with a full session, or just the user while the email
/// still needs confirming.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

/// Error bodies differ between services; any of these may carry the text.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Human-readable message from an error response body, falling back to the
/// raw text.
pub(crate) fn error_message(body: &str, status: u16) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("request failed with status {status}")
            } else {
                trimmed.to_string()
            }
        })
}

/// Tokens of the signed-in session.
#[derive(Clone, Debug)]
pub struct TokenSet {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    pub(crate) fn from_parts(
        access_token: String,
        refresh_token: String,
        expires_at: Option<i64>,
        expires_in: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| expires_in.map(|secs| now + Duration::seconds(secs)));
        Self {
            access_token: SecretString::from(access_token),
            refresh_token: SecretString::from(refresh_token),
            expires_at,
        }
    }

    /// Expired, or about to within the refresh margin.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        const MARGIN_SECS: i64 = 30;
        self.expires_at
            .is_some_and(|at| at - Duration::seconds(MARGIN_SECS) <= now)
    }
}

/// Current sign-in held by the client.
#[derive(Clone, Debug)]
pub(crate) struct AuthState {
    pub tokens: TokenSet,
    pub session: Session,
}

impl AuthState {
    pub fn from_token_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let tokens = TokenSet::from_parts(
            response.access_token,
            response.refresh_token,
            response.expires_at,
            response.expires_in,
            now,
        );
        Self::new(tokens, response.user.into())
    }

    pub fn new(tokens: TokenSet, identity: Identity) -> Self {
        let session = Session {
            identity,
            expires_at: tokens.expires_at,
        };
        Self { tokens, session }
    }

    pub fn persisted(&self) -> PersistedAuth {
        PersistedAuth {
            access_token: self.tokens.access_token.expose_secret().to_string(),
            refresh_token: self.tokens.refresh_token.expose_secret().to_string(),
            expires_at: self.tokens.expires_at,
            identity: self.session.identity.clone(),
        }
    }
}

/// Storage format of a sign-in between page loads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedAuth {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub identity: Identity,
}

impl From<PersistedAuth> for AuthState {
    fn from(saved: PersistedAuth) -> Self {
        let tokens = TokenSet {
            access_token: SecretString::from(saved.access_token),
            refresh_token: SecretString::from(saved.refresh_token),
            expires_at: saved.expires_at,
        };
        AuthState::new(tokens, saved.identity)
    }
}
