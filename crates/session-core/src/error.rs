use thiserror::Error;

/// Errors surfaced by session store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The backend could not be reached or answered with something unusable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend refused the request; the message is meant for the user.
    #[error("{0}")]
    Rejected(String),

    /// Re-authentication with the current password failed.
    #[error("Old password is incorrect.")]
    IncorrectPassword,

    #[error("not signed in")]
    NotSignedIn,

    #[error("profile lookup failed: {0}")]
    Profile(String),
}

impl SessionError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Reasons a gate refuses to hand out an [`Authorized`](crate::gate::Authorized) proof.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("session is still resolving")]
    Pending,

    #[error("not signed in")]
    Denied,

    #[error("gate has been torn down")]
    TornDown,
}
