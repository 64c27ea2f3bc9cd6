//! Label/value pairs from detail pages rendered as heading + paragraph.
//!
//! Order detail pages lay out each field as an `<h6>` label inside a
//! `div.display-fields-container`, followed by a `<p>` holding the value.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashSet;

/// One label/value pair from a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayField {
    pub label: String,
    pub value: String,
}

/// Extract every display field of a detail page.
///
/// The value is the text of the first `<p>` element that follows the label
/// in document order, or an empty string when there is none. A repeated
/// label keeps its first position and takes the later value.
pub fn extract_display_fields(html: &str) -> Vec<DisplayField> {
    let document = Html::parse_document(html);
    let heading_sel =
        Selector::parse("div.display-fields-container h6").expect("heading selector is valid");
    let any_sel = Selector::parse("*").expect("universal selector is valid");

    let headings: HashSet<_> = document.select(&heading_sel).map(|el| el.id()).collect();
    let elements: Vec<ElementRef<'_>> = document.select(&any_sel).collect();

    let mut fields: Vec<DisplayField> = Vec::new();
    for (idx, el) in elements.iter().enumerate() {
        if !headings.contains(&el.id()) {
            continue;
        }

        let label = stripped_text(el);
        let value = elements[idx + 1..]
            .iter()
            .find(|next| next.value().name() == "p")
            .map(stripped_text)
            .unwrap_or_default();

        match fields.iter_mut().find(|f| f.label == label) {
            Some(existing) => existing.value = value,
            None => fields.push(DisplayField { label, value }),
        }
    }

    fields
}

/// Concatenate the element's text nodes, each trimmed.
fn stripped_text(el: &ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}
