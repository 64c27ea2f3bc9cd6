//! Script block selection by marker substrings.
//!
//! A page usually holds several inline scripts with similar content. A
//! block is addressed by a set of markers that must all occur in it, and
//! the selection only succeeds when exactly one block qualifies.

use crate::decode::decode_expression;
use crate::error::{ExtractError, Result};
use crate::scan::{scan_declarations, Keyword};
use crate::vars::ScriptVars;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

/// The inline scripts of one parsed page.
///
/// Parsing once lets several marker-driven selections run against the same
/// response body.
#[derive(Debug, Clone, Default)]
pub struct ScriptPage {
    scripts: Vec<String>,
}

impl ScriptPage {
    /// Parse an HTML document and collect the raw text of every `<script>`.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let selector = Selector::parse("script").expect("script selector is valid");
        let scripts = document
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .collect();
        Self { scripts }
    }

    /// Raw text of every inline script, in document order.
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    /// Return the text of the single script containing every marker.
    pub fn select<S: AsRef<str>>(&self, markers: &[S]) -> Result<&str> {
        if markers.is_empty() {
            return Err(ExtractError::NoMarkers);
        }

        let matching: Vec<&String> = self
            .scripts
            .iter()
            .filter(|text| markers.iter().all(|m| text.contains(m.as_ref())))
            .collect();

        match matching.as_slice() {
            [only] => Ok(only.as_str()),
            _ => Err(ExtractError::AmbiguousSelection {
                markers: markers.iter().map(|m| m.as_ref().to_string()).collect(),
                matched: matching.len(),
            }),
        }
    }

    /// Select a block by markers and decode its declarations.
    pub fn script_vars<S: AsRef<str>>(&self, markers: &[S], keyword: Keyword) -> Result<ScriptVars> {
        let block = self.select(markers)?;
        let vars = ScriptVars::from_declarations(scan_declarations(block, keyword));
        debug!(
            keyword = %keyword,
            count = vars.len(),
            raw = vars.raw_fallbacks().len(),
            "decoded marker-selected script block"
        );
        Ok(vars)
    }

    /// Look up one named declaration across every script of the page.
    ///
    /// When the name is declared more than once, the last declaration wins.
    pub fn find_declaration(&self, keyword: Keyword, name: &str) -> Option<Value> {
        let found = self
            .scripts
            .iter()
            .flat_map(|text| scan_declarations(text, keyword))
            .filter(|decl| decl.name == name)
            .last()?;
        Some(decode_expression(&found.expression).value)
    }
}

/// Select the single script block of `html` containing every marker and
/// return its raw text.
pub fn select_script_block<S: AsRef<str>>(html: &str, markers: &[S]) -> Result<String> {
    ScriptPage::parse(html).select(markers).map(str::to_string)
}
