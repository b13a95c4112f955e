// # HTTP IP Source
//
// This crate discovers the caller's public IPv4 address from an external
// echo service (e.g. api.ipify.org, ifconfig.me/ip, icanhazip.com).
//
// ## Behavior
//
// - One plain GET per call, through the run's shared `RetryingClient`
// - The trimmed body is the IP; it is not parsed or validated here
// - Transient failures are retried by the client; a retryable status that
//   survives every attempt is an error, never an IP

use livedns_core::http::{HttpRequest, RetryingClient};
use livedns_core::traits::IpSource;
use livedns_core::{Error, Result};

/// HTTP echo-service IP source
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// Shared retrying client
    client: RetryingClient,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `client`: the run's shared retrying client
    /// - `url`: echo service URL (e.g. "https://api.ipify.org")
    pub fn new(client: RetryingClient, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Fetch current IP from the echo service
    async fn fetch_ip(&self) -> Result<String> {
        let response = self.client.send(&HttpRequest::get(&self.url)).await?;

        // Retries exhausted: the body is an error page
        if self.client.policy().should_retry_status(response.status) {
            return Err(Error::ip_discovery(format!(
                "{} kept answering with status {}",
                self.url, response.status
            )));
        }

        if !(200..300).contains(&response.status) {
            tracing::warn!(
                "IP echo service {} answered with status {}",
                self.url,
                response.status
            );
        }

        let ip = response.text.trim();
        if ip.is_empty() {
            return Err(Error::ip_discovery(format!(
                "Empty response from {} (status {})",
                self.url, response.status
            )));
        }

        Ok(ip.to_string())
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        let ip = self.fetch_ip().await?;
        tracing::debug!("Checking dynamic IP: {}", ip);
        Ok(ip)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
