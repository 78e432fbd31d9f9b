use session_core::SessionError;
use thiserror::Error;

/// Errors raised by the data store and the services built on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Project not found, or not owned by the caller
    #[error("project '{id}' not found")]
    ProjectNotFound { id: String },

    #[error("step '{id}' not found")]
    StepNotFound { id: String },

    /// The backend refused or failed the request
    #[error("{0}")]
    Backend(String),

    /// Object storage upload failed
    #[error("upload failed: {0}")]
    Upload(String),

    /// Row could not be decoded
    #[error("unexpected response in {context}: {message}")]
    Decode { context: String, message: String },

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
