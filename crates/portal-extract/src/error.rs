//! Errors raised by the extraction layer.
//!
//! Only selection problems are errors. Decode failures degrade to raw text
//! and a missing let-block degrades to an empty mapping.

use thiserror::Error;

/// Failure to extract from a page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// A marker-driven selection was attempted with no markers.
    #[error("no markers given; at least one marker is required to select a script block")]
    NoMarkers,

    /// The markers matched zero or several script blocks.
    #[error("expected exactly one script block containing {markers:?}, found {matched}")]
    AmbiguousSelection {
        /// The markers that were required.
        markers: Vec<String>,
        /// How many script blocks contained all of them.
        matched: usize,
    },

    /// A declaration keyword name was not recognised.
    #[error("unknown declaration keyword '{0}' (expected var, let or const)")]
    UnknownKeyword(String),
}

/// Result alias for extraction calls.
pub type Result<T> = std::result::Result<T, ExtractError>;
