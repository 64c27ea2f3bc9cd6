//! Quotes, quote edits and line items.

use crate::error::{PortalError, Result};
use crate::records::{id_string, value_to_id};
use chrono::NaiveDate;
use portal_extract::ScriptVars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Date format the portal uses for expiry dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check that `date` is a real calendar date written as `YYYY-MM-DD`.
pub fn validate_date(field: &str, date: &str) -> Result<()> {
    let well_formed = date.len() == 10 && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(PortalError::InvalidArgument(format!(
            "{field} must be a date in the form YYYY-MM-DD, got '{date}'"
        )))
    }
}

// ---- Quote page ----

/// Everything the quote page declares about one quote.
///
/// Built from the `activeQuoteBody` object plus the participants block and
/// the main quote block, later blocks winning on shared names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuoteRecord {
    vars: ScriptVars,
}

impl QuoteRecord {
    pub fn new(vars: ScriptVars) -> Self {
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn vars(&self) -> &ScriptVars {
        &self.vars
    }

    /// The `quote` object. The page sometimes declares it as a JSON string,
    /// which is parsed here.
    pub fn quote(&self) -> Option<Map<String, Value>> {
        match self.vars.get("quote")? {
            Value::Object(map) => Some(map.clone()),
            Value::String(text) => match serde_json::from_str(text) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            },
            _ => None,
        }
    }

    /// The `assignee` object (`teamId`, `assigneeId`, ...).
    pub fn assignee(&self) -> Option<&Map<String, Value>> {
        self.vars.get("assignee")?.as_object()
    }

    /// Current participants, as listed under `participants.quoteParticipants`.
    pub fn quote_participants(&self) -> Option<&Value> {
        self.vars.get("participants")?.get("quoteParticipants")
    }

    pub fn sections(&self) -> &[Value] {
        self.vars
            .get("sections")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Id of the last section; new line items go there.
    pub fn last_section_id(&self) -> Option<String> {
        self.sections().last()?.get("id").and_then(value_to_id)
    }
}

// ---- Quote creation and edits ----

/// Body of a quote creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    pub project_id: String,
    pub expiry_date: String,
    pub title: String,
    pub customer_contact_id: String,
    pub is_spr: bool,
    pub description: String,
}

impl NewQuote {
    /// A quote with no project, no description and no special price request.
    pub fn new(
        title: impl Into<String>,
        expiry_date: impl Into<String>,
        customer_contact_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: String::new(),
            expiry_date: expiry_date.into(),
            title: title.into(),
            customer_contact_id: customer_contact_id.into(),
            is_spr: false,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn special_price_request(mut self, is_spr: bool) -> Self {
        self.is_spr = is_spr;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_date("expiry date", &self.expiry_date)
    }
}

/// Fields to change on an existing quote. `None` keeps the current value;
/// `Some` is applied as given, including `Some(false)` and empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteDetailsUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub expiry_date: Option<String>,
    pub project_id: Option<String>,
    pub is_spr: Option<bool>,
    pub can_set_as_spr: Option<bool>,
    pub customer_contact_id: Option<String>,
    pub team_id: Option<String>,
    pub assignee_id: Option<String>,
    /// User ids. The assignee is removed from this list before sending.
    pub participants: Option<Vec<String>>,
}

impl QuoteDetailsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(PortalError::InvalidArgument(
                "a quote update needs at least one field".to_string(),
            ));
        }
        if let Some(date) = &self.expiry_date {
            validate_date("expiry date", date)?;
        }
        Ok(())
    }

    /// Fields in the order the portal expects them.
    pub(crate) fn changed_fields(&self) -> Vec<(&'static str, Value)> {
        let text = |v: &Option<String>| v.as_ref().map(|s| Value::String(s.clone()));
        let flag = |v: &Option<bool>| v.map(Value::Bool);
        [
            ("title", text(&self.title)),
            ("description", text(&self.description)),
            ("expiryDate", text(&self.expiry_date)),
            ("projectId", text(&self.project_id)),
            ("isSpr", flag(&self.is_spr)),
            ("canSetAsSpr", flag(&self.can_set_as_spr)),
            ("customerContactId", text(&self.customer_contact_id)),
            ("teamId", text(&self.team_id)),
            ("assigneeId", text(&self.assignee_id)),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }
}

// ---- Line items ----

/// Price and quantities of a quote line, sent as a form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTerms {
    pub price_per_unit: f64,
    pub desired_quantity: u32,
    #[serde(default = "one")]
    pub minimum_quantity: u32,
}

fn one() -> u32 {
    1
}

/// A model to add to a quote section with its terms.
///
/// `model_id` is the portal's internal model id, not the SKU. In a lines
/// file each entry is flat: `{"modelId", "pricePerUnit", "desiredQuantity",
/// "minimumQuantity"}`, the last defaulting to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(deserialize_with = "id_string")]
    pub model_id: String,
    #[serde(flatten)]
    pub terms: LineTerms,
}

impl LineItem {
    pub fn new(model_id: impl Into<String>, price: f64, quantity: u32, min_quantity: u32) -> Self {
        Self {
            model_id: model_id.into(),
            terms: LineTerms {
                price_per_unit: price,
                desired_quantity: quantity,
                minimum_quantity: min_quantity,
            },
        }
    }

    pub fn value(&self) -> f64 {
        self.terms.price_per_unit * f64::from(self.terms.desired_quantity)
    }
}
