//! Turn raw declaration expressions into structured values.
//!
//! Decoding tries, in order: one layer of matching quotes, strict JSON, the
//! permissive literal grammar, and finally keeps the raw text. It never
//! fails; a raw result is reported through [`DecodeKind::Raw`].

use crate::literal::parse_literal;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Which decoding path produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeKind {
    /// Quote-wrapped text with one quote layer removed.
    Quoted,
    /// Strict JSON.
    Json,
    /// Permissive literal grammar.
    Literal,
    /// Nothing matched; the text is kept as-is.
    Raw,
}

/// A decoded expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    pub kind: DecodeKind,
}

impl Decoded {
    fn new(value: Value, kind: DecodeKind) -> Self {
        Self { value, kind }
    }
}

/// Decode one raw expression.
///
/// Quote stripping does not interpret escapes: `"a\"b"` becomes the four
/// characters `a\"b`.
pub fn decode_expression(raw: &str) -> Decoded {
    let text = raw.trim();

    if let Some(inner) = strip_quotes(text) {
        return Decoded::new(Value::String(inner.to_string()), DecodeKind::Quoted);
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Decoded::new(value, DecodeKind::Json);
    }

    if let Some(value) = parse_literal(text) {
        return Decoded::new(value, DecodeKind::Literal);
    }

    debug!(len = text.len(), "expression kept as raw text");
    Decoded::new(Value::String(text.to_string()), DecodeKind::Raw)
}

/// Remove one layer of matching quotes, double quotes first.
fn strip_quotes(text: &str) -> Option<&str> {
    if text.len() < 2 {
        return None;
    }
    ['"', '\'']
        .into_iter()
        .find(|&q| text.starts_with(q) && text.ends_with(q))
        .map(|_| &text[1..text.len() - 1])
}
