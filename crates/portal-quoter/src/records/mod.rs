//! Typed views over the records the portal hands back.
//!
//! Page-extracted records keep the full [`ScriptVars`](portal_extract::ScriptVars)
//! mapping and expose typed accessors for the fields the operations rely on.

pub mod company;
pub mod quote;

pub use company::{CompanyRecord, Contact, NewContact, Rank};
pub use quote::{LineItem, LineTerms, NewQuote, QuoteDetailsUpdate, QuoteRecord};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render an id the portal sent as either a string or a number.
pub(crate) fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Serde helper for id fields that arrive as strings or numbers.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_id(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a string or numeric id, got {value}")))
}
