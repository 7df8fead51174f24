//! Retrying JSON client over reqwest.

use std::time::Duration;

use meetbell_domain::{MeetbellError, Result};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::conversions::status_error;
use crate::errors::InfraError;

/// When a request is tried again.
///
/// Only server errors and transport failures are retried; the delay doubles
/// after each attempt, capped at 256 × `base_backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Initial try included.
    pub max_attempts: usize,
    /// Delay before the first retry.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2, base_backoff: Duration::from_millis(200) }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay(&self, retry: usize) -> Duration {
        let shift = u32::try_from(retry.saturating_sub(1).min(8)).unwrap_or(8);
        self.base_backoff.saturating_mul(1_u32 << shift)
    }

    const fn has_attempt_after(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }
}

/// HTTP client for the calendar API: timeout, user agent, retries and JSON
/// decoding in one place.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Start from the default timeout and policy.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with default timeout and retry policy.
    ///
    /// # Errors
    /// Fails when the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Policy this client retries with.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Request builder bound to this client.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send `builder`, retrying per the client's [`RetryPolicy`].
    ///
    /// The last response is returned even when it is a server error, so the
    /// caller can report its status.
    ///
    /// # Errors
    /// Transport failures after the last attempt, or a request that cannot
    /// be built or cloned.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let mut attempt = 1;
        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| MeetbellError::Internal("streaming request bodies cannot be retried".into()))?
                .build()
                .map_err(|e| MeetbellError::from(InfraError::from(e)))?;
            let path = request.url().path().to_owned();

            match self.client.execute(request).await {
                Ok(response)
                    if response.status().is_server_error()
                        && self.retry.has_attempt_after(attempt) =>
                {
                    debug!(attempt, path = %path, status = %response.status(), "http_retrying_server_error");
                }
                Ok(response) => {
                    debug!(attempt, path = %path, status = %response.status(), "http_response");
                    return Ok(response);
                }
                Err(err) if is_transient(&err) && self.retry.has_attempt_after(attempt) => {
                    debug!(attempt, path = %path, error = %err, "http_retrying_transport_error");
                }
                Err(err) => return Err(InfraError::from(err).into()),
            }

            let delay = self.retry.delay(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    /// GET `url` with a bearer token and decode the JSON body.
    ///
    /// # Errors
    /// Non-success statuses go through [`status_error`]; an undecodable body
    /// is a `Parse` error.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let request = self.request(Method::GET, url).bearer_auth(token).query(query);
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| MeetbellError::Parse(format!("cannot decode response body: {e}")))
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    /// Whole-request timeout. Zero disables it.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts, initial try included; at least one.
    #[must_use]
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.retry.max_attempts = attempts.max(1);
        self
    }

    /// Delay before the first retry; later ones double.
    #[must_use]
    pub const fn base_backoff(mut self, backoff: Duration) -> Self {
        self.retry.base_backoff = backoff;
        self
    }

    /// `User-Agent` header value.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Fails when the underlying reqwest client cannot be built.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder();
        if !self.timeout.is_zero() {
            builder = builder.timeout(self.timeout);
        }
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(|e| MeetbellError::from(InfraError::from(e)))?;

        Ok(HttpClient { client, retry: self.retry })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(attempts: usize) -> HttpClient {
        HttpClient::builder()
            .max_attempts(attempts)
            .base_backoff(Duration::from_millis(5))
            .user_agent("meetbell-test")
            .build()
            .unwrap()
    }

    fn url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/calendars/primary/events", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn get_json_sends_token_query_and_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer abc"))
            .and(header("user-agent", "meetbell-test"))
            .and(query_param("maxResults", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let body: Value = client(1)
            .get_json(url(&server), "abc", &[("maxResults", "5".to_string())])
            .await
            .unwrap();
        assert_eq!(body, json!({ "items": [] }));
    }

    #[tokio::test]
    async fn server_error_is_retried_once_by_default_policy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let body: Value = client(2).get_json(url(&server), "t", &[]).await.unwrap();
        assert_eq!(body["ok"], json!(true));
    }

    #[tokio::test]
    async fn exhausted_retries_report_the_last_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(3).get_json::<Value>(url(&server), "t", &[]).await.unwrap_err();
        assert!(matches!(err, MeetbellError::Network(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn rejected_credentials_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(3).get_json::<Value>(url(&server), "t", &[]).await.unwrap_err();
        assert!(matches!(err, MeetbellError::Auth(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = Url::parse(&format!("http://{addr}/")).unwrap();
        let client = client(2);
        let result = client.send(client.request(Method::GET, target)).await;
        assert!(matches!(result, Err(MeetbellError::Network(_))), "got {result:?}");
    }

    #[test]
    fn default_policy_allows_one_retry() {
        let policy = HttpClient::new().unwrap().retry_policy();
        assert_eq!(policy, RetryPolicy { max_attempts: 2, base_backoff: Duration::from_millis(200) });
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let policy = RetryPolicy { max_attempts: 20, base_backoff: Duration::from_millis(100) };
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(3), Duration::from_millis(400));
        assert_eq!(policy.delay(9), Duration::from_millis(25_600));
        assert_eq!(policy.delay(15), policy.delay(9));
    }
}
