//! Remote Data Client for the Voltmart REST API.
//!
//! Every data operation in the storefront and admin console is one call
//! through [`ApiClient`]. There is no retry, caching or batching; each
//! method maps one endpoint to explicit domain types.
//!
//! # API Reference
//!
//! - Base URL: `{VOLTMART_API_BASE_URL}/api`
//! - Authentication: `Authorization: Bearer <token>` from the session store,
//!   read at call time and omitted when absent
//! - Error bodies: `{ "message": "..." }` (some endpoints use `Message`)

mod cart;
mod catalog;
mod orders;
mod payments;
mod types;
mod users;
mod wire;

pub use types::*;

use std::sync::Arc;

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::StorefrontConfig;
use crate::session::SessionStore;

/// Errors that can occur when calling the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// 401 or 403.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The server answered 2xx but refused the request in its body.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Failures that point at the server or the network rather than the user.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Unauthorized(_) | Self::NotFound(_) | Self::Rejected(_) => false,
        }
    }

    /// Server-provided message, when there is one worth showing.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. }
            | Self::Unauthorized(message)
            | Self::NotFound(message)
            | Self::Rejected(message) => Some(message),
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => None,
        }
    }
}

/// Voltmart API client.
///
/// Cheap to clone; clones share the connection pool and session handle.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    /// Always ends in `/api/`.
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL cannot host endpoint paths or the HTTP
    /// client fails to build.
    pub fn new(config: &StorefrontConfig, session: SessionStore) -> Result<Self, ApiError> {
        let mut origin = config.api_base_url.clone();
        if !origin.path().ends_with('/') {
            let path = format!("{}/", origin.path());
            origin.set_path(&path);
        }
        let base_url = origin
            .join("api/")
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("voltmart-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                session,
            }),
        })
    }

    /// Session store the client reads its bearer token from.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Root that endpoint paths are appended to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded,
    /// so ids cannot escape their position in the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, path = url.path(), "API request");
        let builder = self.inner.client.request(method, url);
        Ok(match self.inner.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let response = self.request(Method::GET, segments)?.send().await?;
        self.handle_response(response).await
    }

    /// Execute a request with a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(method, segments)?.json(body).send().await?;
        self.handle_response(response).await
    }

    /// Execute a mutating request whose success body is only an optional
    /// message. Empty or unexpected success bodies are tolerated.
    pub(crate) async fn acknowledge<B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Option<String>, ApiError> {
        let mut builder = self.request(method, segments)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        self.read_acknowledgement(response).await
    }

    /// Same as [`Self::acknowledge`] with a multipart body.
    pub(crate) async fn acknowledge_multipart(
        &self,
        method: Method,
        segments: &[&str],
        form: Form,
    ) -> Result<Option<String>, ApiError> {
        let response = self.request(method, segments)?.multipart(form).send().await?;
        self.read_acknowledgement(response).await
    }

    async fn read_acknowledgement(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<String>, ApiError> {
        if !response.status().is_success() {
            return Err(self.parse_error(response).await);
        }
        let text = response.text().await?;
        Ok(serde_json::from_str::<wire::MessageResponse>(&text)
            .unwrap_or_default()
            .message)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    /// Parse an error response into an [`ApiError`].
    async fn parse_error(&self, response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);

        tracing::debug!(status = status.as_u16(), %message, "API error response");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// The body's `message` (or `Message`) verbatim, falling back to the raw body
/// and then to the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "Message", "error"]
                .into_iter()
                .find_map(|key| value.get(key).and_then(serde_json::Value::as_str).map(str::to_owned))
        });
    if let Some(message) = from_json {
        return message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let config = StorefrontConfig::for_base_url(base).unwrap();
        ApiClient::new(&config, SessionStore::in_memory()).unwrap()
    }

    #[test]
    fn test_base_url_gets_api_suffix() {
        assert_eq!(
            client("https://shop.voltmart.in").base_url().as_str(),
            "https://shop.voltmart.in/api/"
        );
        assert_eq!(
            client("http://127.0.0.1:9000/v2").base_url().as_str(),
            "http://127.0.0.1:9000/v2/api/"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = client("https://shop.voltmart.in");
        let url = api
            .endpoint(&["products", "getProductById", "a/b?c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://shop.voltmart.in/api/products/getProductById/a%2Fb%3Fc"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Out of stock"}"#),
            "Out of stock"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"Message":"Invalid"}"#),
            "Invalid"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[test]
    fn test_server_side_classification() {
        assert!(
            ApiError::Api {
                status: 502,
                message: String::new()
            }
            .is_server_side()
        );
        assert!(
            !ApiError::Api {
                status: 400,
                message: String::new()
            }
            .is_server_side()
        );
        assert!(!ApiError::Unauthorized(String::new()).is_server_side());
        assert!(ApiError::Parse(String::new()).is_server_side());
    }
}
