//! Optional record of what a session last did.
//!
//! Nothing is recorded unless the session was built with diagnostics
//! enabled; the record is for debugging failed runs, not for correctness.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// The last request a session sent.
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Declarations on one page that were kept as raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawFallback {
    pub url: String,
    pub names: Vec<String>,
}

/// Debugging state collected by a session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// Method, URL and status of the most recent request.
    pub last_request: Option<RequestRecord>,
    /// Body of the most recent request that carried one.
    pub last_payload: Option<Value>,
    /// Pages whose extraction kept some values as raw text.
    pub raw_fallbacks: Vec<RawFallback>,
}

impl Diagnostics {
    pub(crate) fn record_request(&mut self, method: &str, url: &str, status: u16, duration_ms: u64) {
        self.last_request = Some(RequestRecord {
            method: method.to_string(),
            url: url.to_string(),
            status,
            at: Utc::now(),
            duration_ms,
        });
    }

    pub(crate) fn record_payload(&mut self, payload: Value) {
        self.last_payload = Some(payload);
    }

    pub(crate) fn record_raw_fallbacks(&mut self, url: &str, names: &[String]) {
        if names.is_empty() {
            return;
        }
        self.raw_fallbacks.push(RawFallback {
            url: url.to_string(),
            names: names.to_vec(),
        });
    }
}
