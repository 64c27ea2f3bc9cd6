//! Buffered HTTP response returned by session calls.

use crate::error::{PortalError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A fully read portal response.
#[derive(Debug, Clone)]
pub struct PortalResponse {
    /// HTTP method of the request that produced this response.
    pub method: String,
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx status into [`PortalError::Status`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(PortalError::Status {
                method: self.method,
                url: self.url,
                status: self.status,
            })
        }
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The top-level `message` field of a JSON body, if any.
    pub fn message(&self) -> Option<String> {
        let value: Value = serde_json::from_str(&self.body).ok()?;
        value.get("message")?.as_str().map(str::to_string)
    }
}
