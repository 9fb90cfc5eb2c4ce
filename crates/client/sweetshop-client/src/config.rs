//! Configuration types for the Sweet Shop client

use bon::Builder;
use std::time::Duration;

/// Default backend location; the backend mounts its routes under `/api`.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Client configuration
#[derive(Debug, Clone, Builder)]
pub struct ClientConfig {
    /// Base URL every REST path is joined onto
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,

    /// Per-request timeout
    #[builder(default = Duration::from_secs(30))]
    pub request_timeout: Duration,

    /// TCP connect timeout
    #[builder(default = Duration::from_secs(10))]
    pub connect_timeout: Duration,

    /// Whether an admin claim read from an unverified token may set the
    /// admin flag when the profile endpoint is unavailable
    #[builder(default = true)]
    pub trust_token_admin_claim: bool,

    /// User agent sent with every request
    #[builder(into, default = concat!("sweetshop-client/", env!("CARGO_PKG_VERSION")).to_string())]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientConfig {
    /// Create a configuration for the given backend URL
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self::builder().base_url(base_url).build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.base_url).map_err(|e| format!("Invalid URL: {}", e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("Unsupported URL scheme: {}", url.scheme()));
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout must be greater than zero".to_string());
        }

        if self.connect_timeout.is_zero() {
            return Err("Connect timeout must be greater than zero".to_string());
        }

        Ok(())
    }
}
