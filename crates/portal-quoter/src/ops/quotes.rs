//! Quotes and quote line items.

use crate::error::{PortalError, Result};
use crate::ops::id_field;
use crate::records::{value_to_id, LineItem, LineTerms, NewQuote, QuoteDetailsUpdate, QuoteRecord};
use crate::session::{PortalResponse, PortalSession};
use portal_extract::{Keyword, ScriptPage, ScriptVars};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Page declaration holding the quote body object.
const QUOTE_BODY_VAR: &str = "activeQuoteBody";

/// Markers of the script declaring participants and customer contacts.
const PARTICIPANT_MARKERS: [&str; 2] = ["var participants", "var customerContactDataSource"];

/// Marker of the script declaring the main quote object.
const MAIN_QUOTE_MARKERS: [&str; 1] = ["quote = {\"id\""];

/// Quote fields carried over unchanged into a details update.
const KEPT_QUOTE_FIELDS: [&str; 8] = [
    "id",
    "title",
    "description",
    "expiryDate",
    "projectId",
    "isSpr",
    "canSetAsSpr",
    "customerContactId",
];

/// Assignee fields carried over unchanged into a details update.
const KEPT_ASSIGNEE_FIELDS: [&str; 2] = ["teamId", "assigneeId"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewLine<'a> {
    model_id: &'a str,
    price_per_unit: f64,
}

/// A line added by [`quote_lines`](PortalSession::quote_lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedLine {
    pub model_id: String,
    pub line_id: String,
}

/// A line [`quote_lines`](PortalSession::quote_lines) could not add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineFailure {
    pub model_id: String,
    pub error: String,
}

/// Result of building a quote from line items. The quote exists even when
/// some lines failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteOutcome {
    pub quote_id: String,
    pub section_id: String,
    pub added: Vec<AddedLine>,
    pub failed: Vec<LineFailure>,
}

impl QuoteOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl PortalSession {
    /// Create a quote, then add every line to its last section.
    ///
    /// Errors before the quote has a section abort the run. After that, a
    /// line that fails is recorded in [`QuoteOutcome::failed`] and the
    /// remaining lines are still added.
    pub async fn quote_lines(
        &mut self,
        company_id: &str,
        quote: &NewQuote,
        lines: &[LineItem],
    ) -> Result<QuoteOutcome> {
        if lines.is_empty() {
            return Err(PortalError::InvalidArgument("no line items to quote".to_string()));
        }
        let quote_id = self.new_quote(company_id, quote).await?;

        let record = self.quote_info(company_id, &quote_id).await?;
        let section_id = record.last_section_id().ok_or_else(|| {
            let url = self.endpoints().quote(company_id, &quote_id);
            PortalError::shape(&url, "new quote has no sections")
        })?;

        let mut outcome = QuoteOutcome {
            quote_id,
            section_id,
            added: Vec::new(),
            failed: Vec::new(),
        };
        for line in lines {
            match self
                .add_item_to_quote(company_id, &outcome.quote_id, &outcome.section_id, line)
                .await
            {
                Ok(line_id) => outcome.added.push(AddedLine {
                    model_id: line.model_id.clone(),
                    line_id,
                }),
                Err(e) => {
                    warn!(
                        quote_id = %outcome.quote_id,
                        model_id = %line.model_id,
                        error = %e,
                        "quote line failed"
                    );
                    outcome.failed.push(LineFailure {
                        model_id: line.model_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            company_id,
            quote_id = %outcome.quote_id,
            added = outcome.added.len(),
            failed = outcome.failed.len(),
            "built quote"
        );
        Ok(outcome)
    }

    /// Create a quote and return its id.
    pub async fn new_quote(&mut self, company_id: &str, quote: &NewQuote) -> Result<String> {
        quote.validate()?;
        let url = self.endpoints().new_quote(company_id);
        let resp = self.post_json(&url, quote).await?.error_for_status()?;
        let quote_id = id_field(&resp, "quoteId")?;
        info!(company_id, quote_id = %quote_id, title = %quote.title, "created quote");
        Ok(quote_id)
    }

    /// Everything the quote page declares about a quote.
    pub async fn quote_info(&mut self, company_id: &str, quote_id: &str) -> Result<QuoteRecord> {
        let url = self.endpoints().quote(company_id, quote_id);
        let resp = self.get(&url).await?.error_for_status()?;
        let page = ScriptPage::parse(&resp.body);

        let mut vars = match page.find_declaration(Keyword::Var, QUOTE_BODY_VAR) {
            Some(Value::Object(body)) => ScriptVars::from(body),
            Some(_) => {
                return Err(PortalError::shape(&url, "activeQuoteBody is not an object"));
            }
            None => return Err(PortalError::shape(&url, "no activeQuoteBody declaration")),
        };
        vars.merge(page.script_vars(&PARTICIPANT_MARKERS, Keyword::Var)?);
        vars.merge(page.script_vars(&MAIN_QUOTE_MARKERS, Keyword::Var)?);

        self.note_extraction(&url, &vars);
        debug!(company_id, quote_id, fields = vars.len(), "read quote page");
        Ok(QuoteRecord::new(vars))
    }

    /// Add a model to a quote section and set its quantities.
    ///
    /// The portal creates the line first, then takes the terms in a second
    /// request. Returns the new line id.
    pub async fn add_item_to_quote(
        &mut self,
        company_id: &str,
        quote_id: &str,
        section_id: &str,
        item: &LineItem,
    ) -> Result<String> {
        let url = self
            .endpoints()
            .section_line_items(company_id, quote_id, section_id);
        let body = NewLine {
            model_id: &item.model_id,
            price_per_unit: item.terms.price_per_unit,
        };
        let resp = self.post_json(&url, &body).await?.error_for_status()?;
        let line_id = id_field(&resp, "id")?;

        self.update_quote_line_item(company_id, quote_id, section_id, &line_id, &item.terms)
            .await?;
        info!(quote_id, line_id = %line_id, model_id = %item.model_id, "added quote line");
        Ok(line_id)
    }

    /// Set the price and quantities of an existing line.
    pub async fn update_quote_line_item(
        &mut self,
        company_id: &str,
        quote_id: &str,
        section_id: &str,
        line_id: &str,
        terms: &LineTerms,
    ) -> Result<PortalResponse> {
        let url = self
            .endpoints()
            .line_item(company_id, quote_id, section_id, line_id);
        self.put_form(&url, terms).await?.error_for_status()
    }

    /// Change quote details, keeping current values for untouched fields.
    ///
    /// `existing` is the record from [`quote_info`](Self::quote_info).
    pub async fn update_quote_details(
        &mut self,
        company_id: &str,
        quote_id: &str,
        existing: &QuoteRecord,
        update: &QuoteDetailsUpdate,
    ) -> Result<PortalResponse> {
        update.validate()?;
        let payload = details_payload(existing, update)?;

        let url = self.endpoints().quote_details(company_id, quote_id);
        let resp = self.put_json(&url, &payload).await?.error_for_status()?;
        info!(company_id, quote_id, "updated quote details");
        Ok(resp)
    }

    pub async fn delete_quote(&mut self, company_id: &str, quote_id: &str) -> Result<PortalResponse> {
        let url = self.endpoints().quote(company_id, quote_id);
        let resp = self.delete(&url).await?.error_for_status()?;
        info!(company_id, quote_id, "deleted quote");
        Ok(resp)
    }
}

/// Build the body of a details update from the current record and the
/// requested changes.
pub(crate) fn details_payload(
    existing: &QuoteRecord,
    update: &QuoteDetailsUpdate,
) -> Result<Map<String, Value>> {
    let quote = existing.quote().ok_or_else(|| {
        PortalError::InvalidArgument("existing quote record has no 'quote' object".to_string())
    })?;
    let assignee = existing.assignee().ok_or_else(|| {
        PortalError::InvalidArgument("existing quote record has no 'assignee' object".to_string())
    })?;

    let mut payload = Map::new();
    for key in KEPT_QUOTE_FIELDS {
        if let Some(value) = quote.get(key) {
            payload.insert(key.to_string(), value.clone());
        }
    }
    for key in KEPT_ASSIGNEE_FIELDS {
        if let Some(value) = assignee.get(key) {
            payload.insert(key.to_string(), value.clone());
        }
    }
    for (key, value) in update.changed_fields() {
        payload.insert(key.to_string(), value);
    }

    let participants = match &update.participants {
        Some(ids) => {
            let assignee_id = payload.get("assigneeId").and_then(value_to_id);
            ids.iter()
                .filter(|id| Some(id.as_str()) != assignee_id.as_deref())
                .map(|id| Value::String(id.clone()))
                .collect()
        }
        None => existing
            .quote_participants()
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
    };
    payload.insert("participants".to_string(), participants);

    Ok(payload)
}
