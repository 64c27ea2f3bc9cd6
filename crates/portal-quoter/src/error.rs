//! Error type for portal operations.

use portal_extract::ExtractError;
use thiserror::Error;

/// Failure of a portal call.
#[derive(Debug, Error)]
pub enum PortalError {
    /// The portal refused the credentials or answered the login oddly.
    #[error("login rejected: {message}")]
    LoginRejected { message: String },

    /// The portal answered a write with something other than its success message.
    #[error("{action} rejected by the portal: {message}")]
    Rejected { action: String, message: String },

    /// Transport-level failure (connect, timeout, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("{method} {url} returned status {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },

    /// The page markup no longer matches the extraction markers.
    #[error("page extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The response parsed, but not into the expected structure.
    #[error("unexpected response from {url}: {detail}")]
    UnexpectedShape { url: String, detail: String },

    /// A caller-supplied value failed validation before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PortalError {
    pub(crate) fn shape(url: &str, detail: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            url: url.to_string(),
            detail: detail.into(),
        }
    }
}

/// Result alias for portal calls.
pub type Result<T> = std::result::Result<T, PortalError>;
