use portfolio_store::StoreError;
use session_core::SessionError;
use thiserror::Error;

/// Errors that can occur talking to the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Request never got a response
    #[error("request failed: {0}")]
    Transport(String),

    /// Backend answered with an error status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("not signed in")]
    NotSignedIn,

    /// The auth redirect carried an error instead of tokens
    #[error("{0}")]
    Rejected(String),
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<ClientError> for SessionError {
    fn from(err: ClientError) -> Self {
        match err {
            // the auth service reports bad credentials and duplicate users as 4xx
            ClientError::Api { status, message } if (400..500).contains(&status) => SessionError::Rejected(message),
            ClientError::Rejected(message) => SessionError::Rejected(message),
            ClientError::NotSignedIn => SessionError::NotSignedIn,
            other => SessionError::transport(other),
        }
    }
}

impl From<ClientError> for StoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotSignedIn => StoreError::Session(SessionError::NotSignedIn),
            ClientError::Decode(message) => StoreError::Decode {
                context: "backend response".to_string(),
                message,
            },
            other => StoreError::backend(other),
        }
    }
}
