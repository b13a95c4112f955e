// # Gandi LiveDNS Provider
//
// This crate provides the Gandi LiveDNS v5 provider for the updater.
//
// ## Implementation Status
//
// - ✅ One API call per trait method, through the shared `RetryingClient`
// - ✅ Transport retries (403/500/502/503, connection errors) owned by the client
// - ✅ Provider `message` reported with every unexpected status
// - ✅ Dry-run mode for safe testing
// - ❌ NO application-level retry (the reconciler decides what a failure means)
// - ❌ NO caching of zone ids across runs
//
// ## Security Requirements
//
// - API key NEVER appears in logs or `Debug` output
// - Provider fails fast if the key is empty
//
// ## API Reference
//
// - Domain info: GET `/domains/:domain` -> `{ "zone_uuid": ... }`
// - Record set: GET `/zones/:uuid/records/:name/A` -> `{ "rrset_values": [...] }`
// - Set record: PUT `/zones/:uuid/records/:name/A` with
//   `{ "rrset_ttl": ..., "rrset_values": [...] }` -> 201 `{ "message": ... }`

use async_trait::async_trait;
use livedns_core::config::LiveDnsConfig;
use livedns_core::http::{HttpRequest, HttpResponse, RetryingClient};
use livedns_core::traits::DnsProvider;
use livedns_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Header carrying the API secret on every call
const API_KEY_HEADER: &str = "X-Api-Key";

/// Record type managed by this provider
const RECORD_TYPE: &str = "A";

/// Response of `GET /domains/:domain` (fields we use)
#[derive(Debug, Deserialize)]
struct DomainInfo {
    zone_uuid: String,
}

/// Response of `GET /zones/:uuid/records/:name/A` (fields we use)
#[derive(Debug, Deserialize)]
struct RecordSet {
    rrset_values: Vec<String>,
}

/// Body of `PUT /zones/:uuid/records/:name/A`
#[derive(Debug, Serialize)]
struct RecordUpdate<'a> {
    rrset_ttl: u32,
    rrset_values: [&'a str; 1],
}

/// Gandi LiveDNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record read)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct GandiProvider {
    /// Shared retrying HTTP client
    client: RetryingClient,

    /// API base URL without trailing slash
    api_endpoint: String,

    /// API secret
    /// ⚠️ NEVER log this value
    api_secret: String,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API secret
impl std::fmt::Debug for GandiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GandiProvider")
            .field("api_endpoint", &self.api_endpoint)
            .field("api_secret", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl GandiProvider {
    /// Create a new Gandi provider (live mode)
    ///
    /// # Parameters
    ///
    /// - `client`: the run's shared retrying client
    /// - `api_endpoint`: API base URL (e.g. "https://dns.api.gandi.net/api/v5")
    /// - `api_secret`: LiveDNS API key
    ///
    /// # Returns
    ///
    /// `Err(Error::Config)` if the endpoint or secret is empty
    pub fn new(
        client: RetryingClient,
        api_endpoint: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self> {
        let api_endpoint = api_endpoint.into().trim_end_matches('/').to_string();
        let api_secret = api_secret.into();

        if api_endpoint.is_empty() {
            return Err(Error::config("Gandi API endpoint cannot be empty"));
        }
        if api_secret.is_empty() {
            return Err(Error::config("Gandi API secret cannot be empty"));
        }

        Ok(Self {
            client,
            api_endpoint,
            api_secret,
            dry_run: false,
        })
    }

    /// Create a provider from the run configuration
    pub fn from_config(client: RetryingClient, config: &LiveDnsConfig) -> Result<Self> {
        Self::new(client, &config.api_endpoint, &config.api_secret)
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether PUT requests are suppressed
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn record_url(&self, zone_id: &str, subdomain: &str) -> String {
        format!(
            "{}/zones/{}/records/{}/{}",
            self.api_endpoint, zone_id, subdomain, RECORD_TYPE
        )
    }

    fn authorized(&self, request: HttpRequest) -> HttpRequest {
        request.header(API_KEY_HEADER, &self.api_secret)
    }

    /// Decode a JSON body into `T`, reporting what was missing
    fn decode<T: for<'de> Deserialize<'de>>(response: &HttpResponse, what: &str) -> Result<T> {
        let json = response
            .json
            .clone()
            .ok_or_else(|| Error::malformed(format!("{}: body is not JSON", what)))?;

        serde_json::from_value(json).map_err(|e| Error::malformed(format!("{}: {}", what, e)))
    }
}

#[async_trait]
impl DnsProvider for GandiProvider {
    /// Resolve the zone UUID of a domain
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /domains/example.com
    /// X-Api-Key: <secret>
    /// ```
    async fn resolve_zone(&self, domain: &str) -> Result<String> {
        let url = format!("{}/domains/{}", self.api_endpoint, domain);
        tracing::debug!("Looking up zone UUID for domain: {}", domain);

        let response = self.client.send(&self.authorized(HttpRequest::get(url))).await?;

        if response.status != 200 {
            return Err(response.into_error("get zone UUID"));
        }

        let info: DomainInfo = Self::decode(&response, "domain info")?;
        tracing::debug!("Found zone UUID: {}", info.zone_uuid);
        Ok(info.zone_uuid)
    }

    /// Read the first A value of a subdomain
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:uuid/records/:name/A
    /// X-Api-Key: <secret>
    /// ```
    async fn read_record_ip(&self, zone_id: &str, subdomain: &str) -> Result<String> {
        let url = self.record_url(zone_id, subdomain);

        let response = self.client.send(&self.authorized(HttpRequest::get(url))).await?;

        if response.status != 200 {
            return Err(response.into_error(format!("get IP from subdomain {}", subdomain)));
        }

        let record: RecordSet = Self::decode(&response, "record set")?;
        let ip = record
            .rrset_values
            .first()
            .map(|value| value.trim().to_string())
            .ok_or_else(|| {
                Error::malformed(format!("record set for {} has no values", subdomain))
            })?;

        tracing::debug!("DNS record {} currently points to {}", subdomain, ip);
        Ok(ip)
    }

    /// Set a subdomain's A record to `new_ip`
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:uuid/records/:name/A
    /// Content-Type: application/json
    /// X-Api-Key: <secret>
    ///
    /// {"rrset_ttl": 300, "rrset_values": ["1.2.3.4"]}
    /// ```
    async fn update_record(
        &self,
        zone_id: &str,
        subdomain: &str,
        new_ip: &str,
        ttl: u32,
    ) -> Result<String> {
        let url = self.record_url(zone_id, subdomain);
        let payload = serde_json::to_value(RecordUpdate {
            rrset_ttl: ttl,
            rrset_values: [new_ip],
        })?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                payload
            );
            return Ok(format!("Dry run, {} not changed", subdomain));
        }

        tracing::debug!("Updating DNS record: {} -> {} (ttl {})", subdomain, new_ip, ttl);
        let response = self
            .client
            .send(&self.authorized(HttpRequest::put(url).json(payload)))
            .await?;

        if response.status != 201 {
            return Err(response.into_error(format!("update IP for subdomain {}", subdomain)));
        }

        let message = response
            .message()
            .unwrap_or_else(|| "DNS record updated".to_string());
        tracing::info!("Status Code: {}, {}, IP updated for {}", response.status, message, subdomain);
        Ok(message)
    }

    fn provider_name(&self) -> &'static str {
        "gandi"
    }
}
