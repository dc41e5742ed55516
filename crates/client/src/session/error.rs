//! Session store errors.

use thiserror::Error;

/// Errors that can occur when reading or writing the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The persisted session file could not be read or written.
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted session document is not valid JSON of the expected shape.
    #[error("Malformed session document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage backend is unusable (e.g. a poisoned lock).
    #[error("Session storage unavailable: {0}")]
    Unavailable(String),

    /// The operation needs an authenticated session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Token refresh was requested but no refresh token is held.
    #[error("No refresh token available")]
    NoRefreshToken,
}
