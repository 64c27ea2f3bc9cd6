//! Model listings per product series.
//!
//! Fetching every series is long-running, so results are kept in the
//! session: a second call skips series that already came back and only
//! retries the ones that failed.

use crate::session::PortalSession;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Page size large enough to return a whole series in one response.
const ITEMS_PER_PAGE: u32 = 10_000;

/// A product series: URL slug plus the display name the search filters on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub slug: String,
    pub name: String,
}

impl Series {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }
}

impl FromStr for Series {
    type Err = String;

    /// Parse `slug=Display Name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((slug, name)) if !slug.trim().is_empty() && !name.trim().is_empty() => {
                Ok(Series::new(slug.trim(), name.trim()))
            }
            _ => Err(format!("expected slug=Series Name, got '{s}'")),
        }
    }
}

/// Why a series could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The request did not complete.
    Transport(String),
    /// The portal answered with a non-200 status.
    Status(u16),
    /// The body was not JSON.
    Json(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Transport(e) => write!(f, "request failed: {e}"),
            FailureReason::Status(s) => write!(f, "status {s}"),
            FailureReason::Json(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesFailure {
    pub slug: String,
    pub reason: FailureReason,
}

/// Outcome of a [`fetch_series_models`](PortalSession::fetch_series_models) run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeriesReport {
    /// Models per series slug, including slugs fetched by earlier runs.
    pub models: BTreeMap<String, Vec<Value>>,
    /// Series that failed in this run.
    pub failed: Vec<SeriesFailure>,
}

impl SeriesReport {
    pub fn model_count(&self) -> usize {
        self.models.values().map(Vec::len).sum()
    }
}

/// The `filter` query parameter for one series.
fn series_filter(name: &str) -> String {
    serde_json::json!({
        "restrictToSeriesNames": [name],
        "specificationFieldFilters": [],
        "itemsPerPage": ITEMS_PER_PAGE,
    })
    .to_string()
}

impl PortalSession {
    /// Fetch the model list of every series not fetched yet.
    ///
    /// Failures are recorded per series and do not stop the run.
    pub async fn fetch_series_models(&mut self, series: &[Series]) -> SeriesReport {
        let url = self.endpoints().series_search();
        let mut failed = Vec::new();

        for s in series {
            if self.series_models.contains_key(&s.slug) {
                continue;
            }
            info!(slug = %s.slug, "fetching series models");

            let filter = series_filter(&s.name);
            let reason = match self.get_with_query(&url, &[("filter", filter.as_str())]).await {
                Err(e) => Some(FailureReason::Transport(e.to_string())),
                Ok(resp) if resp.status != 200 => Some(FailureReason::Status(resp.status)),
                Ok(resp) => match resp.json::<Value>() {
                    Ok(body) => {
                        let models = body
                            .get("results")
                            .and_then(Value::as_array)
                            .cloned()
                            .unwrap_or_default();
                        info!(slug = %s.slug, count = models.len(), "fetched series models");
                        self.series_models.insert(s.slug.clone(), models);
                        None
                    }
                    Err(e) => Some(FailureReason::Json(e.to_string())),
                },
            };

            if let Some(reason) = reason {
                warn!(slug = %s.slug, %reason, "series fetch failed");
                failed.push(SeriesFailure {
                    slug: s.slug.clone(),
                    reason,
                });
            }
        }

        SeriesReport {
            models: self.series_models.clone(),
            failed,
        }
    }

    /// Models fetched so far in this session, per series slug.
    pub fn series_models(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.series_models
    }
}
