//! Unified error handling for the API client.

use serde_json::Value;
use thiserror::Error;

use crate::session::SessionError;

/// Message used when an error response carries no readable body.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Errors that can occur when talking to the administration API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection-level failure (DNS, refused connection, timeout, broken body).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message derived from the payload, or `HTTP <status>`.
        message: String,
        /// Parsed error body (or the generic fallback document).
        payload: Value,
    },

    /// A success response could not be decoded into the expected type.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request body could not be serialized.
    #[error("JSON encode error: {0}")]
    Encode(serde_json::Error),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A caller-supplied header name or value is not valid HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The request could not be issued as asked (e.g. blank resource id).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The session store could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Build an API error from a status code and parsed body.
    #[must_use]
    pub fn from_response(status: u16, payload: Value) -> Self {
        let message = message_from_payload(&payload).unwrap_or_else(|| format!("HTTP {status}"));
        Self::Api {
            status,
            message,
            payload,
        }
    }

    /// HTTP status, when the API answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the API rejected the session credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// Whether the addressed record does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Message suitable for showing to an operator.
    ///
    /// Uses the server-provided message when the error came from the API,
    /// and the generic fallback otherwise.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { payload, .. } => {
                message_from_payload(payload).unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
            }
            Self::InvalidRequest(reason) => reason.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Pull a human-readable message out of an error document.
///
/// Checks `message`, then `detail`, then `error`.
fn message_from_payload(payload: &Value) -> Option<String> {
    ["message", "detail", "error"]
        .iter()
        .find_map(|field| payload.get(field).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_owned)
}
