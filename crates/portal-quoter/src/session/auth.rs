//! Unauthenticated client and the password login that yields a session.
//!
//! The portal login is a plain form POST of `emailAddress` and `password`.
//! A JSON body with `"message": "Success"` means the session cookie set by
//! the response is valid; anything else is a rejection.

use crate::config::{Credentials, PortalConfig};
use crate::endpoints::Endpoints;
use crate::error::{PortalError, Result};
use crate::session::PortalSession;
use serde_json::Value;
use tracing::{info, warn};

/// Message the portal returns on a successful login.
const LOGIN_SUCCESS: &str = "Success";

/// An HTTP client that has not logged in yet.
///
/// The only thing it can do is [`login`](PortalClient::login); every other
/// portal call lives on [`PortalSession`].
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl PortalClient {
    /// Build a client with a cookie store, timeout and user agent from `config`.
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            endpoints: Endpoints::new(&config.base_url),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Log in with email and password.
    ///
    /// On success the returned session shares this client's cookie store.
    pub async fn login(&self, credentials: &Credentials) -> Result<PortalSession> {
        let url = self.endpoints.login();
        let form = [
            ("emailAddress", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let resp = self.http.post(&url).form(&form).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        match login_outcome(status, &body) {
            Ok(()) => {
                info!(email = %credentials.email, "logged in to portal");
                Ok(PortalSession::new(
                    self.http.clone(),
                    self.endpoints.clone(),
                    &credentials.email,
                ))
            }
            Err(message) => {
                warn!(email = %credentials.email, %message, "portal login failed");
                Err(PortalError::LoginRejected { message })
            }
        }
    }
}

/// Decide whether a login response means success. On failure, returns the
/// portal's message or a description of what came back.
fn login_outcome(status: u16, body: &str) -> std::result::Result<(), String> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str);

    match (status, message) {
        (200, Some(LOGIN_SUCCESS)) => Ok(()),
        (_, Some(m)) => Err(m.to_string()),
        (200, None) => Err("invalid response from server".to_string()),
        (s, None) => Err(format!("status {s} without a message")),
    }
}
