//! HTTP gateway to the pantry API.
//!
//! The gateway turns one call into one request and normalizes whatever comes
//! back into a typed value or an [`ApiError`]. It holds no cache.
//!
//! - The bearer token is read from the [`TokenStore`] before every request.
//! - Transport failures (refused connection, DNS, timeout) become
//!   `Network` errors with status 0.
//! - A 401 discards the stored token and broadcasts
//!   [`SessionEvent::Expired`], whatever operation triggered it.

mod token;

pub use token::{FileTokenStore, MemoryTokenStore, TokenError, TokenStore};

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::session::SessionEvent;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 16;

/// Connection settings for a [`Gateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Server root, e.g. `http://localhost:8080`
    pub base_url: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Shared HTTP client. Cloning is cheap and clones share the token store
/// and the event channel.
#[derive(Clone)]
pub struct Gateway {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn new(config: GatewayConfig, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::unknown(0, format!("Failed to build HTTP client: {}", e)))?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Subscribes to session events (expiry, items moved to a pantry).
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Broadcasts an event. Having no subscribers is not an error.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::POST, path)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PATCH, path).json(body)).await
    }

    /// DELETE; any response body is ignored.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self.dispatch(self.request(Method::DELETE, path)).await?;
        self.check(response).await.map(|_| ())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");

        let builder = self.client.request(method, url);
        match self.tokens.load() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(e) => {
                warn!(error = %e, "could not read stored token, sending unauthenticated");
                builder
            }
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.dispatch(builder).await?;
        let status = response.status().as_u16();
        let response = self.check(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response: {}", e)))?;
        // An empty 2xx body decodes as JSON null so `()` and `Option` targets work.
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };

        serde_json::from_slice(body)
            .map_err(|e| ApiError::unknown(status, format!("Unexpected response body: {}", e)))
    }

    async fn dispatch(&self, builder: RequestBuilder) -> ApiResult<Response> {
        builder.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "Request timed out".to_string()
            } else {
                format!("Unable to reach the server: {}", e)
            };
            debug!(error = %e, "transport failure");
            ApiError::network(message)
        })
    }

    /// Passes success responses through and maps everything else.
    async fn check(&self, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let body = response
            .bytes()
            .await
            .ok()
            .and_then(|b| serde_json::from_slice::<ErrorBody>(&b).ok());
        let error = ApiError::from_response(code, body);

        if error.is_unauthorized() {
            self.expire();
        } else {
            debug!(status = code, message = %error.message, "api error");
        }
        Err(error)
    }

    fn expire(&self) {
        warn!("session expired, discarding stored token");
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to discard stored token");
        }
        self.emit(SessionEvent::Expired);
    }
}
