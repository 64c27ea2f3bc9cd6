//! Whole-page extraction workflows built on selection, scanning and decoding.

use crate::error::Result;
use crate::scan::{scan_declarations, Keyword};
use crate::select::ScriptPage;
use crate::vars::ScriptVars;
use serde_json::Value;
use tracing::debug;

const SCRIPT_OPEN: &str = "<script>";
const SCRIPT_CLOSE: &str = "</script>";

/// Decode the first bare `<script>` block whose content starts with a `let`
/// declaration.
///
/// Returns an empty mapping when the page has no such block: callers treat
/// an empty result as "page shape not recognised".
pub fn extract_let_block(html: &str) -> ScriptVars {
    match locate_let_block(html) {
        Some(block) => {
            let vars = ScriptVars::from_declarations(scan_declarations(block, Keyword::Let));
            debug!(count = vars.len(), "decoded let-declaration block");
            vars
        }
        None => {
            debug!("no let-declaration script block found");
            ScriptVars::new()
        }
    }
}

/// Find the body of the first `<script>` element immediately followed by a
/// `let` declaration, up to the next `</script>`.
pub fn locate_let_block(html: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(rel) = html[from..].find(SCRIPT_OPEN) {
        let body_start = from + rel + SCRIPT_OPEN.len();
        let body = &html[body_start..];
        if starts_with_let(body.trim_start()) {
            let end = body.find(SCRIPT_CLOSE)?;
            return Some(&body[..end]);
        }
        from = body_start;
    }
    None
}

/// Select the single script block containing every marker and decode it.
pub fn extract_script_vars<S: AsRef<str>>(
    html: &str,
    markers: &[S],
    keyword: Keyword,
) -> Result<ScriptVars> {
    ScriptPage::parse(html).script_vars(markers, keyword)
}

/// Decode one named declaration from anywhere in the page's scripts.
pub fn find_declaration(html: &str, keyword: Keyword, name: &str) -> Option<Value> {
    ScriptPage::parse(html).find_declaration(keyword, name)
}

fn starts_with_let(text: &str) -> bool {
    text.strip_prefix("let")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace)
}
