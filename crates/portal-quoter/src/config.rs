//! Client configuration and credentials.

use crate::error::{PortalError, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Portal origin used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://store.omron.com.au";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for a portal client.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Origin of the portal, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl PortalConfig {
    /// Validate `base_url` and build a config with default timeout and agent.
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| PortalError::Config(format!("base URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PortalError::Config(format!(
                "base URL '{base_url}' must use http or https"
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: format!("portal-quoter/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Login credentials for the back-office portal.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = PortalConfig::new("https://portal.example.com/").unwrap();
        assert_eq!(config.base_url, "https://portal.example.com");
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert!(config.user_agent.starts_with("portal-quoter/"));
    }

    #[test]
    fn test_config_rejects_bad_urls() {
        assert!(matches!(
            PortalConfig::new("not a url"),
            Err(PortalError::Config(_))
        ));
        assert!(matches!(
            PortalConfig::new("ftp://portal.example.com"),
            Err(PortalError::Config(_))
        ));
    }

    #[test]
    fn test_builder_overrides() {
        let config = PortalConfig::new(DEFAULT_BASE_URL)
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("tester");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "tester");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("me@example.com", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("me@example.com"));
        assert!(!shown.contains("hunter2"));
    }
}
