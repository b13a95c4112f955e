// # Retrying HTTP Client
//
// Every network call of a run goes through one `RetryingClient`. The
// orchestrator builds it once and hands clones to the provider and the IP
// source; clones share the underlying `reqwest` connection pool.
//
// ## Retry Behavior
//
// - Connection errors, timeouts and body read errors are retried
// - Responses with status 403, 500, 502 or 503 are retried
// - Delays grow exponentially and are capped; on 503 a `Retry-After` given
//   in seconds replaces the computed delay
// - After the last attempt a retryable *response* is handed back as-is so
//   the caller can report its status and message; a transport failure
//   becomes `Error::Transport`
//
// ## Usage
//
// ```rust,ignore
// use livedns_core::http::{HttpRequest, RetryingClient};
//
// let client = RetryingClient::from_config(&config.retry)?;
// let response = client
//     .send(&HttpRequest::get("https://api.ipify.org"))
//     .await?;
// println!("{} {}", response.status, response.text.trim());
// ```

mod retry;

pub use retry::{RETRY_AFTER_STATUSES, RETRY_STATUSES, RetryPolicy};
use retry::{is_transient, parse_retry_after};

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// An HTTP request description
///
/// Requests are plain data so they can be replayed on every attempt.
#[derive(Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Extra headers (name, value)
    pub headers: Vec<(String, String)>,
    /// Optional JSON body
    pub body: Option<Value>,
}

// Header values may carry credentials; only their names are shown.
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("body", &self.body)
            .finish()
    }
}

impl HttpRequest {
    /// Create a request with the given method and URL
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a PUT request
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body (sets `Content-Type: application/json`)
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A completed HTTP exchange
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Raw body text
    pub text: String,
    /// Body parsed as JSON, when it is JSON
    pub json: Option<Value>,
    /// Parsed `Retry-After` header, if the server sent one in seconds
    pub retry_after: Option<Duration>,
}

impl HttpResponse {
    /// Build a response from its parts, parsing the body as JSON when possible
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        let text = text.into();
        let json = serde_json::from_str(&text).ok();
        Self {
            status,
            text,
            json,
            retry_after: None,
        }
    }

    /// Look up a string field at the top level of a JSON body
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.json.as_ref()?.get(key)?.as_str()
    }

    /// The provider's `message` field, if the body carries one
    ///
    /// Anything that is not a JSON object with a string `message` yields
    /// `None`, so a malformed error body never hides the status.
    pub fn message(&self) -> Option<String> {
        self.str_field("message").map(str::to_string)
    }

    /// Turn an unexpected response into a provider error
    pub fn into_error(self, operation: impl Into<String>) -> Error {
        let message = self.message();
        Error::provider(operation, self.status, message)
    }
}

/// HTTP client with a bounded retry policy
#[derive(Clone)]
pub struct RetryingClient {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RetryingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingClient")
            .field("policy", &self.policy)
            .finish()
    }
}

impl RetryingClient {
    /// Create a client with the given policy and per-request timeout
    pub fn new(policy: RetryPolicy, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, policy })
    }

    /// Create a client from the retry section of the configuration
    pub fn from_config(config: &RetryConfig) -> Result<Self> {
        Self::new(RetryPolicy::from_config(config), config.http_timeout())
    }

    /// The retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send a request, retrying transient failures
    ///
    /// # Returns
    ///
    /// - `Ok(HttpResponse)`: the first non-retryable response, or the last
    ///   response once attempts are exhausted
    /// - `Err(Error::Transport)`: the last transport failure once attempts
    ///   are exhausted, or a non-transient one immediately
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            debug!(method = %request.method, url = %request.url, attempt, "Sending request");

            match self.execute(request).await {
                Ok(response) => {
                    if !self.policy.should_retry_status(response.status) {
                        return Ok(response);
                    }
                    if attempt >= max_attempts {
                        warn!(
                            url = %request.url,
                            status = response.status,
                            attempts = attempt,
                            "Retries exhausted, giving up"
                        );
                        return Ok(response);
                    }

                    let delay = self
                        .policy
                        .status_delay(attempt, response.status, response.retry_after);
                    warn!(
                        url = %request.url,
                        status = response.status,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retryable status, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    if !is_transient(&err) || attempt >= max_attempts {
                        return Err(Error::transport(attempt, err.to_string()));
                    }

                    let delay = self.policy.backoff(attempt);
                    warn!(
                        url = %request.url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            attempt += 1;
        }
    }

    /// Perform a single attempt
    async fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, reqwest::Error> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);
        let text = response.text().await?;

        let mut parsed = HttpResponse::new(status, text);
        parsed.retry_after = retry_after;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_client(max_attempts: u32) -> RetryingClient {
        RetryingClient::new(
            RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn retries_transient_status_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1.2.3.4\n"))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(5);
        let response = client
            .send(&HttpRequest::get(format!("{}/ip", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.text, "1.2.3.4\n");
    }

    #[tokio::test]
    async fn does_not_retry_other_statuses() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "Unknown domain"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = fast_client(5)
            .send(&HttpRequest::get(format!("{}/domains/nope.example", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.message().as_deref(), Some("Unknown domain"));
    }

    #[tokio::test]
    async fn returns_last_response_when_status_retries_exhausted() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"message": "Access was denied"})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let response = fast_client(3)
            .send(&HttpRequest::get(server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 403);
        let err = response.into_error("get zone UUID");
        assert_eq!(
            err.to_string(),
            "HTTP status 403 when trying to get zone UUID: Access was denied"
        );
    }

    #[tokio::test]
    async fn connection_errors_are_retried_then_surfaced() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = fast_client(3)
            .send(&HttpRequest::get(format!("http://{}/ip", addr)))
            .await;

        match result {
            Err(Error::Transport { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invalid_url_fails_without_retry() {
        let result = fast_client(5).send(&HttpRequest::get("not a url")).await;

        match result {
            Err(Error::Transport { attempts, .. }) => assert_eq!(attempts, 1),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn sends_headers_and_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/records/home/A"))
            .and(header("X-Api-Key", "secret"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({"rrset_ttl": 300, "rrset_values": ["1.2.3.4"]})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"message": "DNS Record Created"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::put(format!("{}/records/home/A", server.uri()))
            .header("X-Api-Key", "secret")
            .json(serde_json::json!({"rrset_ttl": 300, "rrset_values": ["1.2.3.4"]}));

        let response = fast_client(1).send(&request).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.str_field("message"), Some("DNS Record Created"));
    }

    #[tokio::test]
    async fn retry_after_header_is_read() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "0"))
            .expect(2)
            .mount(&server)
            .await;

        let client = RetryingClient::new(
            RetryPolicy::new(2, Duration::from_secs(60), Duration::from_secs(60)),
            Duration::from_secs(5),
        )
        .unwrap();

        // A 60s computed backoff would stall the test; Retry-After: 0 wins
        let response = tokio::time::timeout(
            Duration::from_secs(10),
            client.send(&HttpRequest::get(server.uri())),
        )
        .await
        .expect("Retry-After should override the computed backoff")
        .unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.retry_after, Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn retry_after_header_is_ignored_on_500() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).insert_header("Retry-After", "60"))
            .expect(2)
            .mount(&server)
            .await;

        let client = RetryingClient::new(
            RetryPolicy::new(2, Duration::ZERO, Duration::from_secs(60)),
            Duration::from_secs(5),
        )
        .unwrap();

        // Zero computed backoff applies; a honored header would stall 60s
        let response = tokio::time::timeout(
            Duration::from_secs(10),
            client.send(&HttpRequest::get(server.uri())),
        )
        .await
        .expect("Retry-After on 500 should not delay the retry")
        .unwrap();

        assert_eq!(response.status, 500);
    }

    #[test]
    fn plain_text_body_is_not_json() {
        let response = HttpResponse::new(200, "1.2.3.4\n");
        assert!(response.json.is_none());
        assert_eq!(response.message(), None);

        let response = HttpResponse::new(500, "<html>oops</html>");
        assert!(response.into_error("get zone UUID").to_string().ends_with("get zone UUID"));
    }

    #[test]
    fn request_debug_hides_header_values() {
        let request = HttpRequest::get("https://dns.api.gandi.net/api/v5/domains/example.com")
            .header("X-Api-Key", "secret_api_key_123");

        let debug_str = format!("{:?}", request);
        assert!(debug_str.contains("X-Api-Key"));
        assert!(!debug_str.contains("secret_api_key_123"));
    }
}
