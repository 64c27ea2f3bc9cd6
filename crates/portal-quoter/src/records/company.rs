//! Companies and their contacts.

use crate::records::id_string;
use portal_extract::ScriptVars;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Data block of a company page.
///
/// Holds every `let` declaration of the page; `contacts` is the only field
/// read back in typed form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompanyRecord {
    vars: ScriptVars,
}

impl CompanyRecord {
    pub fn new(vars: ScriptVars) -> Self {
        Self { vars }
    }

    /// True when the page had no data block.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn vars(&self) -> &ScriptVars {
        &self.vars
    }

    /// Contacts listed on the page. Entries without an id are skipped.
    pub fn contacts(&self) -> Vec<Contact> {
        let Some(list) = self.vars.get("contacts").and_then(Value::as_array) else {
            return Vec::new();
        };

        list.iter()
            .filter_map(|entry| match Contact::deserialize(entry) {
                Ok(contact) => Some(contact),
                Err(e) => {
                    debug!(error = %e, "skipping malformed contact entry");
                    None
                }
            })
            .collect()
    }
}

/// A contact as listed on a company page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub rank: Option<String>,
    pub title: Option<String>,
}

// ---- Contact creation ----

/// Seniority of a contact, as the portal stores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rank {
    #[default]
    Unspecified,
    CSuite,
    Management,
    Operational,
}

impl Rank {
    /// Wire form expected by the portal.
    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Unspecified => "unspecified",
            Rank::CSuite => "c-suite",
            Rank::Management => "management",
            Rank::Operational => "operational",
        }
    }

    /// Accept the display form (`C-suite`) or the wire form (`c-suite`).
    /// Anything else becomes [`Rank::Unspecified`] with a warning.
    pub fn normalise(input: &str) -> Rank {
        match input {
            "Unspecified" | "unspecified" => Rank::Unspecified,
            "C-suite" | "c-suite" => Rank::CSuite,
            "Management" | "management" => Rank::Management,
            "Operational" | "operational" => Rank::Operational,
            other => {
                warn!(rank = other, "unknown contact rank, using unspecified");
                Rank::Unspecified
            }
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Rank {
    fn from(input: &str) -> Self {
        Rank::normalise(input)
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Body of a contact creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub rank: Rank,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub title: Option<String>,
}

impl NewContact {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email_address: impl Into<String>,
        rank: Rank,
    ) -> Self {
        Self {
            rank,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email_address: email_address.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
