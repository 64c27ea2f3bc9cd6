//! Authenticated portal session.
//!
//! A `PortalSession` can only be obtained from a successful
//! [`PortalClient::login`](crate::session::PortalClient::login). It owns the
//! cookie-carrying HTTP client, per-session caches and optional diagnostics.
//! Every call takes `&mut self`, so one session serves one caller at a time
//! and requests go out strictly in sequence.

use crate::endpoints::Endpoints;
use crate::error::Result;
use crate::session::diagnostics::Diagnostics;
use crate::session::response::PortalResponse;
use portal_extract::ScriptVars;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Monotonic counter for generating unique session IDs.
static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Request body carried by a session call.
enum Body {
    Empty,
    Query(Vec<(String, String)>),
    Form(Value),
    Json(Value),
}

/// A logged-in portal session.
#[derive(Debug)]
pub struct PortalSession {
    session_id: String,
    email: String,
    http: reqwest::Client,
    endpoints: Endpoints,
    diagnostics: Option<Diagnostics>,
    /// Customer list from the last `list_companies` fetch.
    pub(crate) companies: Option<Vec<Value>>,
    /// Models fetched per series slug; lets an interrupted run resume.
    pub(crate) series_models: BTreeMap<String, Vec<Value>>,
}

impl PortalSession {
    pub(crate) fn new(http: reqwest::Client, endpoints: Endpoints, email: &str) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let counter = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);

        Self {
            session_id: format!("sess-{ts}-{counter}"),
            email: email.to_string(),
            http,
            endpoints,
            diagnostics: None,
            companies: None,
            series_models: BTreeMap::new(),
        }
    }

    /// Start recording the last request, last payload and raw fallbacks.
    pub fn with_diagnostics(mut self) -> Self {
        self.diagnostics = Some(Diagnostics::default());
        self
    }

    /// Recorded diagnostics, if enabled.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Email address the session logged in with.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // ── Verbs ───────────────────────────────────────────────────────────────

    pub async fn get(&mut self, url: &str) -> Result<PortalResponse> {
        self.send(Method::GET, url, Body::Empty).await
    }

    pub async fn get_with_query(
        &mut self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<PortalResponse> {
        let query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.send(Method::GET, url, Body::Query(query)).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form<T: Serialize + ?Sized>(
        &mut self,
        url: &str,
        form: &T,
    ) -> Result<PortalResponse> {
        let form = serde_json::to_value(form)?;
        self.send(Method::POST, url, Body::Form(form)).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &mut self,
        url: &str,
        json: &T,
    ) -> Result<PortalResponse> {
        let json = serde_json::to_value(json)?;
        self.send(Method::POST, url, Body::Json(json)).await
    }

    /// POST with no body.
    pub async fn post_empty(&mut self, url: &str) -> Result<PortalResponse> {
        self.send(Method::POST, url, Body::Empty).await
    }

    pub async fn put_form<T: Serialize + ?Sized>(
        &mut self,
        url: &str,
        form: &T,
    ) -> Result<PortalResponse> {
        let form = serde_json::to_value(form)?;
        self.send(Method::PUT, url, Body::Form(form)).await
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &mut self,
        url: &str,
        json: &T,
    ) -> Result<PortalResponse> {
        let json = serde_json::to_value(json)?;
        self.send(Method::PUT, url, Body::Json(json)).await
    }

    pub async fn delete(&mut self, url: &str) -> Result<PortalResponse> {
        self.send(Method::DELETE, url, Body::Empty).await
    }

    async fn send(&mut self, method: Method, url: &str, body: Body) -> Result<PortalResponse> {
        let started = Instant::now();
        let request = self.http.request(method.clone(), url);
        let request = match &body {
            Body::Empty => request,
            Body::Query(query) => request.query(query),
            Body::Form(form) => request.form(form),
            Body::Json(json) => request.json(json),
        };

        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let text = resp.text().await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        debug!(
            session = %self.session_id,
            method = %method,
            url,
            status,
            elapsed_ms,
            "portal request"
        );

        if let Some(diag) = self.diagnostics.as_mut() {
            diag.record_request(method.as_str(), url, status, elapsed_ms);
            if let Body::Form(payload) | Body::Json(payload) = body {
                diag.record_payload(payload);
            }
        }

        Ok(PortalResponse {
            method: method.to_string(),
            url: final_url,
            status,
            body: text,
        })
    }

    /// Note which declarations on `url` fell back to raw text.
    pub(crate) fn note_extraction(&mut self, url: &str, vars: &ScriptVars) {
        let names = vars.raw_fallbacks();
        if names.is_empty() {
            return;
        }
        warn!(url, names = ?names, "declarations kept as raw text");
        if let Some(diag) = self.diagnostics.as_mut() {
            diag.record_raw_fallbacks(url, names);
        }
    }
}
