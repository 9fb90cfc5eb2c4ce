//! Typed HTTP wrapper over the Sweet Shop REST backend.
//!
//! The client itself never holds credentials. Every call takes a
//! [`RequestConfig`] snapshot, so a request can only carry the token that was
//! current when the caller built it.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{
    QuantityRequest, RegisterRequest, SearchParams, Sweet, SweetCreate, SweetUpdate,
    TokenResponse, UserProfile,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Per-call request configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    token: Option<String>,
}

impl RequestConfig {
    /// A request without credentials
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A request authenticated with the given bearer token
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Value of the `Authorization` header, if any
    pub fn authorization_header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {}", token))
    }
}

/// Transport-level errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-success status
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    /// The request could not be sent or the response could not be read
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Server-supplied error message, when the backend sent one
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Pull the human readable message out of a `{"detail": ...}` error body.
///
/// The backend sends either a plain string or a list of validation entries
/// with a `msg` field each.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(message) if !message.is_empty() => Some(message.clone()),
        serde_json::Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(|msg| msg.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

fn join_url_segments(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// HTTP client for the Sweet Shop API
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate().map_err(ClientError::configuration)?;

        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, config: &RequestConfig) -> RequestBuilder {
        let url = join_url_segments(&self.base_url, path);
        debug!(
            method = %method,
            url = %url,
            authenticated = config.token().is_some(),
            "Sending request"
        );

        let builder = self.http_client.request(method, url);
        match config.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn error_for_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Request rejected by backend");
        Err(ApiError::Status {
            status: status.as_u16(),
            detail: extract_detail(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
        let response = Self::error_for_status(builder.send().await?).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn send_empty(builder: RequestBuilder) -> ApiResult<()> {
        Self::error_for_status(builder.send().await?).await?;
        Ok(())
    }

    /// `POST /auth/login` with form-encoded credentials
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenResponse> {
        let form = [("username", username), ("password", password)];
        let builder = self
            .request(Method::POST, "auth/login", &RequestConfig::anonymous())
            .form(&form);
        Self::send_json(builder).await
    }

    /// `POST /auth/register`; returns the created profile when the body carries one
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<Option<UserProfile>> {
        let builder = self
            .request(Method::POST, "auth/register", &RequestConfig::anonymous())
            .json(request);
        let response = Self::error_for_status(builder.send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body).ok())
    }

    /// `GET /auth/me`
    pub async fn me(&self, config: &RequestConfig) -> ApiResult<UserProfile> {
        Self::send_json(self.request(Method::GET, "auth/me", config)).await
    }

    /// `GET /sweets`
    pub async fn list_sweets(&self, config: &RequestConfig) -> ApiResult<Vec<Sweet>> {
        Self::send_json(self.request(Method::GET, "sweets", config)).await
    }

    /// `GET /sweets/search` with only the present parameters
    pub async fn search_sweets(
        &self,
        config: &RequestConfig,
        params: &SearchParams,
    ) -> ApiResult<Vec<Sweet>> {
        let builder = self
            .request(Method::GET, "sweets/search", config)
            .query(params);
        Self::send_json(builder).await
    }

    /// `GET /sweets/{id}`
    pub async fn get_sweet(&self, config: &RequestConfig, id: i64) -> ApiResult<Sweet> {
        Self::send_json(self.request(Method::GET, &format!("sweets/{}", id), config)).await
    }

    /// `POST /sweets`
    pub async fn create_sweet(&self, config: &RequestConfig, item: &SweetCreate) -> ApiResult<Sweet> {
        let builder = self.request(Method::POST, "sweets", config).json(item);
        Self::send_json(builder).await
    }

    /// `PUT /sweets/{id}`
    pub async fn update_sweet(
        &self,
        config: &RequestConfig,
        id: i64,
        patch: &SweetUpdate,
    ) -> ApiResult<Sweet> {
        let builder = self
            .request(Method::PUT, &format!("sweets/{}", id), config)
            .json(patch);
        Self::send_json(builder).await
    }

    /// `DELETE /sweets/{id}`
    pub async fn delete_sweet(&self, config: &RequestConfig, id: i64) -> ApiResult<()> {
        Self::send_empty(self.request(Method::DELETE, &format!("sweets/{}", id), config)).await
    }

    /// `POST /sweets/{id}/purchase`
    pub async fn purchase_sweet(
        &self,
        config: &RequestConfig,
        id: i64,
        quantity: u32,
    ) -> ApiResult<Sweet> {
        let builder = self
            .request(Method::POST, &format!("sweets/{}/purchase", id), config)
            .json(&QuantityRequest { quantity });
        Self::send_json(builder).await
    }

    /// `POST /sweets/{id}/restock`
    pub async fn restock_sweet(
        &self,
        config: &RequestConfig,
        id: i64,
        quantity: u32,
    ) -> ApiResult<Sweet> {
        let builder = self
            .request(Method::POST, &format!("sweets/{}/restock", id), config)
            .json(&QuantityRequest { quantity });
        Self::send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_config_header() {
        assert_eq!(RequestConfig::anonymous().authorization_header(), None);
        assert_eq!(
            RequestConfig::bearer("abc").authorization_header(),
            Some("Bearer abc".to_string())
        );
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(r#"{"detail": "Sweet not found"}"#),
            Some("Sweet not found".to_string())
        );
        assert_eq!(
            extract_detail(
                r#"{"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address"}, {"msg": "field required"}]}"#
            ),
            Some("value is not a valid email address; field required".to_string())
        );
        assert_eq!(extract_detail(r#"{"detail": ""}"#), None);
        assert_eq!(extract_detail(r#"{"error": "boom"}"#), None);
        assert_eq!(extract_detail("Internal Server Error"), None);
    }

    #[test]
    fn test_join_url_segments() {
        assert_eq!(
            join_url_segments("http://localhost:8000/api/", "/sweets"),
            "http://localhost:8000/api/sweets"
        );
        assert_eq!(join_url_segments("http://localhost:8000", ""), "http://localhost:8000");
    }

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new(&ClientConfig::new("http://localhost:8000/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");

        assert!(matches!(
            ApiClient::new(&ClientConfig::new("nope")),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: 400,
            detail: Some("Insufficient quantity available".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 400: Insufficient quantity available");
        assert_eq!(err.detail(), Some("Insufficient quantity available"));
    }
}
