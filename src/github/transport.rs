//! HTTP Transport with Retry and Caching
//!
//! Every API call goes through [`Transport::dispatch`]. Cacheable reads are
//! answered from the response cache when an unexpired entry exists;
//! everything else is sent over the shared connection pool with a bounded
//! retry budget and exponential backoff. Callers never see a raw connection
//! failure unless the budget is exhausted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::{request_digest, ResponseCache};
use crate::github::client::Credentials;
use crate::github::errors::ApiError;
use crate::stats::UsageTracker;

/// Connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries allowed after the initial attempt.
const MAX_RETRIES: u32 = 3;

/// Constant added to the exponential backoff delay, in seconds.
const BACKOFF_CONSTANT_SECS: u64 = 1;

/// Upper bound on idle pooled connections per host.
const POOL_MAX_IDLE_PER_HOST: usize = 20;

/// Caching instructions attached to a request.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// Logical namespace the entry belongs to, used for prefix invalidation.
    pub namespace: String,
    /// How long a stored response stays valid.
    pub ttl: Duration,
}

/// A single API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub cache: Option<CachePolicy>,
    /// Overrides the pool's default total timeout when set.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
            cache: None,
            timeout: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body: Some(body),
            cache: None,
            timeout: None,
        }
    }

    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PUT,
            url: url.into(),
            body: Some(body),
            cache: None,
            timeout: None,
        }
    }

    pub fn delete(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::DELETE,
            url: url.into(),
            body: Some(body),
            cache: None,
            timeout: None,
        }
    }

    /// Request that a successful response be cached under `namespace`.
    /// Only honored for GET requests.
    pub fn cached(mut self, namespace: impl Into<String>, ttl: Duration) -> Self {
        self.cache = Some(CachePolicy {
            namespace: namespace.into(),
            ttl,
        });
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::Decode(format!("invalid JSON payload: {e}")))
    }

    /// The body as lossy UTF-8, for error reporting.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failure, observed before any HTTP status arrived.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SendError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl SendError {
    fn is_retryable(&self) -> bool {
        matches!(self, SendError::Timeout | SendError::Connect(_))
    }
}

/// The raw HTTP edge.
///
/// Implemented by the reqwest-backed sender in production; tests script
/// this seam to exercise the retry and caching logic without a network.
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        timeout: Option<Duration>,
    ) -> Result<ApiResponse, SendError>;
}

/// reqwest-backed sender sharing one connection pool.
struct ReqwestSender {
    client: reqwest::Client,
}

#[async_trait]
impl HttpSend for ReqwestSender {
    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        timeout: Option<Duration>,
    ) -> Result<ApiResponse, SendError> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SendError::Timeout
            } else if e.is_connect() {
                SendError::Connect(e.to_string())
            } else {
                SendError::Other(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SendError::Timeout
                } else {
                    SendError::Other(e.to_string())
                }
            })?
            .to_vec();

        Ok(ApiResponse { status, body })
    }
}

/// Request dispatcher owned by a single client instance.
pub struct Transport {
    sender: Arc<dyn HttpSend>,
    cache: Arc<ResponseCache>,
    usage: Arc<UsageTracker>,
}

impl Transport {
    /// Build the reqwest pool with the fixed default headers derived from
    /// the credentials.
    pub fn new(
        credentials: &Credentials,
        cache: Arc<ResponseCache>,
        usage: Arc<UsageTracker>,
    ) -> Result<Self, ApiError> {
        let mut token = HeaderValue::from_str(&format!("token {}", credentials.token))
            .map_err(|e| ApiError::Network(format!("credential is not header-safe: {e}")))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .user_agent(concat!("ghdrive/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            sender: Arc::new(ReqwestSender { client }),
            cache,
            usage,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_sender(
        sender: Arc<dyn HttpSend>,
        cache: Arc<ResponseCache>,
        usage: Arc<UsageTracker>,
    ) -> Self {
        Self {
            sender,
            cache,
            usage,
        }
    }

    /// Dispatch a request, consulting the cache for GET requests that ask
    /// for it and retrying retryable failures with exponential backoff.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let cache_policy = match &request.cache {
            Some(policy) if request.method == Method::GET => Some(policy),
            _ => None,
        };
        let digest = cache_policy.map(|_| {
            request_digest(request.method.as_str(), &request.url, request.body.as_ref())
        });

        if let (Some(policy), Some(digest)) = (cache_policy, &digest) {
            if let Some(hit) = self.cache.get(&policy.namespace, digest) {
                self.usage.record_cache_hit();
                debug!(url = %request.url, "response cache hit");
                return Ok(hit);
            }
        }

        for attempt in 0..=MAX_RETRIES {
            self.usage.record_request();
            debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                "dispatching request"
            );

            match self
                .sender
                .send(
                    &request.method,
                    &request.url,
                    request.body.as_ref(),
                    request.timeout,
                )
                .await
            {
                Ok(response) if response.status < 400 => {
                    if let (Some(policy), Some(digest)) = (cache_policy, &digest) {
                        self.cache
                            .put(&policy.namespace, digest, response.clone(), policy.ttl);
                    }
                    return Ok(response);
                }
                Ok(response) if ApiError::is_retryable_status(response.status) => {
                    if attempt == MAX_RETRIES {
                        error!(
                            status = response.status,
                            url = %request.url,
                            "retry budget exhausted"
                        );
                        return Err(ApiError::RetryExhausted {
                            last_status: Some(response.status),
                            body: response.text(),
                        });
                    }
                    let wait = backoff_delay(attempt);
                    warn!(
                        status = response.status,
                        attempt = attempt + 1,
                        wait_secs = wait.as_secs(),
                        "retryable status, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                Ok(response) => {
                    let status = response.status;
                    error!(status = status, url = %request.url, "terminal HTTP failure");
                    return Err(ApiError::from_status(status, response.text()));
                }
                Err(failure) if failure.is_retryable() => {
                    if attempt == MAX_RETRIES {
                        error!(error = %failure, url = %request.url, "retry budget exhausted with no response");
                        return Err(ApiError::RetryExhausted {
                            last_status: None,
                            body: failure.to_string(),
                        });
                    }
                    let wait = backoff_delay(attempt);
                    warn!(
                        error = %failure,
                        attempt = attempt + 1,
                        wait_secs = wait.as_secs(),
                        "transport failure, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(failure) => {
                    error!(error = %failure, url = %request.url, "request failed");
                    return Err(ApiError::Network(failure.to_string()));
                }
            }
        }

        unreachable!("retry loop always returns")
    }
}

/// Backoff before retry `attempt + 1`: `2^attempt + c` seconds.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt) + BACKOFF_CONSTANT_SECS)
}
