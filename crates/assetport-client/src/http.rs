//! HTTP transport for the asset inventory API

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};

/// Console used when no server URL is configured
pub const DEFAULT_SERVER_URL: &str = "https://console.runzero.com";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API credential sent as a bearer token
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Account-wide API key
    AccountKey(String),
    /// Organization API key
    OrgKey(String),
    /// Pre-issued OAuth access token
    Bearer(String),
}

impl Credentials {
    fn token(&self) -> &str {
        match self {
            Credentials::AccountKey(token)
            | Credentials::OrgKey(token)
            | Credentials::Bearer(token) => token,
        }
    }

    /// Short name of the credential type, for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::AccountKey(_) => "account key",
            Credentials::OrgKey(_) => "organization key",
            Credentials::Bearer(_) => "bearer token",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credentials({}, <redacted>)", self.kind())
    }
}

/// API usage counters reported in response headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests allowed for the credential's license
    pub usage_limit: Option<u64>,
    /// Requests left before the server starts rejecting them
    pub usage_remaining: Option<u64>,
    /// Requests made in the current day
    pub usage_today: Option<u64>,
    /// Requests made with this credential overall
    pub usage_total: Option<u64>,
}

impl RateLimitInfo {
    /// Read the `X-API-Usage-*` headers; missing or non-numeric values stay `None`
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        };
        Self {
            usage_limit: read("x-api-usage-limit"),
            usage_remaining: read("x-api-usage-remaining"),
            usage_today: read("x-api-usage-today"),
            usage_total: read("x-api-usage-total"),
        }
    }

    /// Whether the response carried any usage header
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<u64>| v.map_or_else(|| "?".to_string(), |v| v.to_string());
        write!(
            f,
            "limit {}, remaining {}, today {}, total {}",
            show(self.usage_limit),
            show(self.usage_remaining),
            show(self.usage_today),
            show(self.usage_total)
        )
    }
}

/// HTTP client for the asset inventory API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
    rate_limit: Arc<Mutex<Option<RateLimitInfo>>>,
}

impl HttpClient {
    /// Create a client for `server_url` with default settings
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or not `https`.
    ///
    /// # Example
    /// ```no_run
    /// use assetport_client::{Credentials, HttpClient};
    ///
    /// let client = HttpClient::new("https://console.runzero.com", Credentials::OrgKey("OT...".into()))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(server_url: impl AsRef<str>, credentials: Credentials) -> Result<Self> {
        Self::builder(credentials).server_url(server_url).build()
    }

    /// Start configuring a client
    #[must_use]
    pub fn builder(credentials: Credentials) -> HttpClientBuilder {
        HttpClientBuilder::new(credentials)
    }

    /// Base URL every request path is resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Usage counters from the most recent response that carried them
    #[must_use]
    pub fn last_rate_limit(&self) -> Option<RateLimitInfo> {
        self.rate_limit.lock().ok().and_then(|guard| *guard)
    }

    /// Build a full URL from a path relative to the base URL
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(ClientError::Url)
    }

    /// Perform a GET request and deserialize the response
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path)?;
        let response = self.send(self.client.get(url).query(query)).await?;
        require_body(read_json(response).await?)
    }

    /// Perform a POST request with JSON body
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let url = self.url(path)?;
        let response = self.send(self.client.post(url).json(body)).await?;
        require_body(read_json(response).await?)
    }

    /// Perform a POST request with a multipart form body
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T> {
        let url = self.url(path)?;
        let response = self.send(self.client.post(url).multipart(form)).await?;
        require_body(read_json(response).await?)
    }

    /// Perform a DELETE request, ignoring any response body
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(self.credentials.token())
            .send()
            .await?;
        debug!(
            path = %response.url().path(),
            status = response.status().as_u16(),
            "API response"
        );

        let usage = RateLimitInfo::from_headers(response.headers());
        if !usage.is_empty() {
            if let Ok(mut guard) = self.rate_limit.lock() {
                *guard = Some(usage);
            }
        }

        check_status(response, usage).await
    }
}

/// Map a non-success response onto the matching error
async fn check_status(response: Response, usage: RateLimitInfo) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, status);

    Err(match status.as_u16() {
        401 | 403 => ClientError::Auth {
            status: status.as_u16(),
            message,
        },
        429 => ClientError::RateLimited {
            retry_after,
            usage,
            message,
        },
        400..=499 => ClientError::Api {
            status: status.as_u16(),
            message,
        },
        500..=599 => ClientError::Server {
            status: status.as_u16(),
            message,
        },
        _ => ClientError::InvalidResponse(format!("unexpected status {status}")),
    })
}

/// Pull a readable message out of an error body
///
/// Problem documents (`title`/`detail`) and `{"error": ...}` bodies are
/// understood; anything else is returned trimmed.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        match (text("title"), text("detail"), text("error")) {
            (Some(title), Some(detail), _) => return format!("{title}: {detail}"),
            (None, Some(detail), _) => return detail.to_string(),
            (Some(title), None, _) => return title.to_string(),
            (None, None, Some(error)) => return error.to_string(),
            _ => {}
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

/// Read a JSON body; `None` for an empty body
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn require_body<T>(body: Option<T>) -> Result<T> {
    body.ok_or_else(|| ClientError::InvalidResponse("empty response body".to_string()))
}

/// Builder for [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    credentials: Credentials,
    server_url: Option<String>,
    timeout: Duration,
    validate_certificate: bool,
    allow_http: bool,
}

impl HttpClientBuilder {
    fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            server_url: None,
            timeout: DEFAULT_TIMEOUT,
            validate_certificate: true,
            allow_http: false,
        }
    }

    /// Set the console URL (default: [`DEFAULT_SERVER_URL`])
    #[must_use]
    pub fn server_url(mut self, url: impl AsRef<str>) -> Self {
        self.server_url = Some(url.as_ref().to_string());
        self
    }

    /// Set the request timeout (default: 30 seconds, must be non-zero)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Turn TLS certificate validation on or off (default: on)
    #[must_use]
    pub fn validate_certificate(mut self, validate: bool) -> Self {
        self.validate_certificate = validate;
        self
    }

    /// Accept plain `http` server URLs, e.g. for a local mock server
    #[must_use]
    pub fn allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or not `https`, if the timeout
    /// is zero, or if the underlying HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpClient> {
        let raw = self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL);
        let mut base_url = Url::parse(raw)?;

        let scheme_ok =
            base_url.scheme() == "https" || (self.allow_http && base_url.scheme() == "http");
        if !scheme_ok {
            return Err(ClientError::InvalidArgument(format!(
                "server URL {raw} must be https"
            )));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::InvalidArgument(
                "timeout must be greater than 0".to_string(),
            ));
        }

        // paths are joined relative to the base, so it must end in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!self.validate_certificate)
            .user_agent(concat!("assetport/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpClient {
            client,
            base_url,
            credentials: self.credentials,
            rate_limit: Arc::new(Mutex::new(None)),
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn key() -> Credentials {
        Credentials::OrgKey("OT0123456789".into())
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new(DEFAULT_SERVER_URL, key());
        assert!(client.is_ok());
    }

    #[test]
    fn test_default_server_url() {
        let client = HttpClient::builder(key()).build().unwrap();
        assert_eq!(client.base_url().as_str(), "https://console.runzero.com/");
    }

    #[test]
    fn test_invalid_url() {
        let err = HttpClient::new("not a url", key()).unwrap_err();
        assert!(matches!(err, ClientError::Url(_)));
    }

    #[test]
    fn test_http_rejected_unless_allowed() {
        let err = HttpClient::new("http://localhost:8080", key()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));

        let client = HttpClient::builder(key())
            .server_url("http://localhost:8080")
            .allow_http(true)
            .build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = HttpClient::builder(key())
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[test]
    fn test_url_building() {
        let client = HttpClient::new("https://runzero.local:8443", key()).unwrap();
        let url = client.url("api/v1.0/org/tasks").unwrap();
        assert_eq!(url.as_str(), "https://runzero.local:8443/api/v1.0/org/tasks");
    }

    #[test]
    fn test_url_building_keeps_path_prefix() {
        let client = HttpClient::new("https://proxy.example.com/runzero", key()).unwrap();
        let url = client.url("/api/v1.0/org/tasks").unwrap();
        assert_eq!(url.as_str(), "https://proxy.example.com/runzero/api/v1.0/org/tasks");
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Usage-Limit", HeaderValue::from_static("1000"));
        headers.insert("X-API-Usage-Remaining", HeaderValue::from_static("998"));
        headers.insert("X-API-Usage-Today", HeaderValue::from_static("2"));
        headers.insert("X-API-Usage-Total", HeaderValue::from_static("junk"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.usage_limit, Some(1000));
        assert_eq!(info.usage_remaining, Some(998));
        assert_eq!(info.usage_today, Some(2));
        assert_eq!(info.usage_total, None);
        assert!(!info.is_empty());

        assert!(RateLimitInfo::from_headers(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_error_message_from_problem_document() {
        let body = r#"{"title":"request failed","detail":"customIntegrationId UUID cannot be all zeroes","status":"error"}"#;
        assert_eq!(
            error_message(body, StatusCode::BAD_REQUEST),
            "request failed: customIntegrationId UUID cannot be all zeroes"
        );
        assert_eq!(
            error_message(r#"{"error":"invalid token"}"#, StatusCode::UNAUTHORIZED),
            "invalid token"
        );
        assert_eq!(error_message("  boom \n", StatusCode::BAD_GATEWAY), "boom");
        assert_eq!(error_message("", StatusCode::NOT_FOUND), "Not Found");
    }

    #[test]
    fn test_credentials_are_redacted() {
        let shown = format!("{:?}", Credentials::AccountKey("CT-secret".into()));
        assert!(!shown.contains("secret"));
        assert!(shown.contains("account key"));
    }
}
