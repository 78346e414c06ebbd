//! REST implementation of [`SessionApi`] over reqwest
//!
//! Every request carries `Authorization: Bearer <token>`. Transport errors
//! and 5xx responses are retried up to the configured attempt count with a
//! fixed backoff; 4xx responses are returned immediately. A `404` on a
//! retried `DELETE` counts as success, since the earlier attempt may have
//! removed the record before its response was lost.

use crate::api::{ApiResult, Operation, SessionApi};
use crate::config::ApiConfig;
use crate::error::{MeetlistError, Result};
use crate::session::{Session, SessionId, SessionPatch};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// HTTP client for the remote session collection
///
/// # Examples
///
/// ```
/// use meetlist::api::HttpSessionApi;
/// use meetlist::config::ApiConfig;
///
/// let config = ApiConfig {
///     base_url: "http://localhost:3000/api".to_string(),
///     ..Default::default()
/// };
/// let api = HttpSessionApi::new(&config).unwrap();
/// assert_eq!(api.sessions_url().unwrap().as_str(), "http://localhost:3000/api/sessions");
/// ```
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    client: Client,
    base_url: Url,
    max_attempts: u32,
    backoff: Duration,
}

impl HttpSessionApi {
    /// Create a client from the API configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be built
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            MeetlistError::Config(format!("Invalid api.base_url {}: {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("meetlist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MeetlistError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized session API client: base_url={}, max_attempts={}",
            base_url,
            config.retry.max_attempts
        );

        Ok(Self {
            client,
            base_url,
            max_attempts: config.retry.max_attempts.max(1),
            backoff: Duration::from_millis(config.retry.backoff_ms),
        })
    }

    /// The collection endpoint, `{base}/sessions`
    pub fn sessions_url(&self) -> ApiResult<Url> {
        self.endpoint(&["sessions"])
    }

    /// A single record endpoint, `{base}/sessions/{id}` with the id
    /// percent-encoded as one path segment
    pub fn session_url(&self, id: &SessionId) -> ApiResult<Url> {
        self.endpoint(&["sessions", id.as_str()])
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                MeetlistError::Config(format!("Base URL cannot hold a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request, retrying transport errors and 5xx responses
    ///
    /// Returns the final response together with the number of attempts made.
    async fn send_with_retry<F>(
        &self,
        operation: Operation,
        build: F,
    ) -> ApiResult<(Response, u32)>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match build().send().await {
                Ok(response)
                    if response.status().is_server_error() && attempt < self.max_attempts =>
                {
                    tracing::warn!(
                        "{:?} attempt {}/{} got {}; retrying in {:?}",
                        operation,
                        attempt,
                        self.max_attempts,
                        response.status(),
                        self.backoff
                    );
                }
                Ok(response) => return Ok((response, attempt)),
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "{:?} attempt {}/{} failed: {}; retrying in {:?}",
                        operation,
                        attempt,
                        self.max_attempts,
                        e,
                        self.backoff
                    );
                }
                Err(e) => {
                    tracing::warn!("{:?} request failed: {}", operation, e);
                    return Err(operation.fail(operation.fallback_message()));
                }
            }
            tokio::time::sleep(self.backoff).await;
        }
    }

    /// Turn a non-success response into the operation's error
    async fn check_status(operation: Operation, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("Session API returned error {} for {:?}: {}", status, operation, body);
        Err(operation.fail_with_body(&body))
    }
}

#[async_trait::async_trait]
impl SessionApi for HttpSessionApi {
    async fn list_sessions(&self, token: &str) -> ApiResult<Vec<Session>> {
        let url = self.sessions_url()?;
        tracing::debug!("Fetching sessions from {}", url);

        let (response, _) = self
            .send_with_retry(Operation::Fetch, || {
                self.client.get(url.clone()).bearer_auth(token)
            })
            .await?;
        let response = Self::check_status(Operation::Fetch, response).await?;

        let body = response.text().await.map_err(|e| {
            tracing::warn!("Failed to read sessions response body: {}", e);
            Operation::Fetch.fail(Operation::Fetch.fallback_message())
        })?;

        let sessions: Vec<Session> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse sessions response: {}", e);
            Operation::Fetch.fail(Operation::Fetch.fallback_message())
        })?;

        tracing::debug!("Fetched {} sessions", sessions.len());
        Ok(sessions)
    }

    async fn delete_session(&self, id: &SessionId, token: &str) -> ApiResult<()> {
        let url = self.session_url(id)?;
        tracing::debug!("Deleting session {} at {}", id, url);

        let (response, attempts) = self
            .send_with_retry(Operation::Delete, || {
                self.client.delete(url.clone()).bearer_auth(token)
            })
            .await?;

        // An earlier attempt may have reached the server before failing
        if attempts > 1 && response.status() == StatusCode::NOT_FOUND {
            tracing::info!(
                "Session {} already gone after {} attempts; treating delete as done",
                id,
                attempts
            );
            return Ok(());
        }

        Self::check_status(Operation::Delete, response).await?;
        Ok(())
    }

    async fn update_session(
        &self,
        id: &SessionId,
        patch: &SessionPatch,
        token: &str,
    ) -> ApiResult<()> {
        let url = self.session_url(id)?;
        tracing::debug!("Updating session {} at {}", id, url);

        let (response, _) = self
            .send_with_retry(Operation::Update, || {
                self.client.put(url.clone()).bearer_auth(token).json(patch)
            })
            .await?;
        Self::check_status(Operation::Update, response).await?;
        Ok(())
    }
}
