//! Portal operations, grouped by the part of the back office they touch.
//!
//! Each submodule adds methods to [`PortalSession`](crate::session::PortalSession).

pub mod companies;
pub mod credit;
pub mod models;
pub mod orders;
pub mod quotes;
pub mod users;

pub use models::{FailureReason, Series, SeriesFailure, SeriesReport};
pub use quotes::{AddedLine, LineFailure, QuoteOutcome};

use crate::error::{PortalError, Result};
use crate::records::value_to_id;
use crate::session::PortalResponse;
use serde_json::Value;

/// Parse a JSON body and read an id field from its top level.
fn id_field(resp: &PortalResponse, field: &str) -> Result<String> {
    let body: Value = resp.json()?;
    body.get(field)
        .and_then(value_to_id)
        .ok_or_else(|| PortalError::shape(&resp.url, format!("no '{field}' in response")))
}

/// Compare the top-level `message` of a response with the expected one.
fn has_message(resp: &PortalResponse, expected: &str) -> bool {
    resp.message().as_deref() == Some(expected)
}
