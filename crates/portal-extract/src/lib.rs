//! Structured data recovery from server-rendered portal pages.
//!
//! Portal pages embed their data as inline script declarations such as
//! `var quote = {...};` or `let contacts = [...];`. This crate finds those
//! declarations, decodes their values, and returns them as a
//! name → [`serde_json::Value`] mapping:
//!
//! - [`select`] picks the one script block that contains a set of markers;
//! - [`scan`] finds `<keyword> name = expression;` statements;
//! - [`decode`] turns each expression into a value (quotes, JSON, loose
//!   literals, raw text);
//! - [`workflow`] combines them into whole-page calls;
//! - [`fields`] reads heading/paragraph detail fields.
//!
//! Every function is pure and works on the response body only.

pub mod decode;
pub mod error;
pub mod fields;
pub mod literal;
pub mod scan;
pub mod select;
pub mod vars;
pub mod workflow;

pub use decode::{decode_expression, DecodeKind, Decoded};
pub use error::{ExtractError, Result};
pub use fields::{extract_display_fields, DisplayField};
pub use scan::{scan_declarations, Declaration, Keyword};
pub use select::{select_script_block, ScriptPage};
pub use vars::ScriptVars;
pub use workflow::{extract_let_block, extract_script_vars, find_declaration, locate_let_block};
