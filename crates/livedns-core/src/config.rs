//! Configuration types for the LiveDNS updater
//!
//! The configuration is supplied once per run and never mutated. Loading it
//! (environment, flags) is the binary's job; this module only defines the
//! shape, the defaults and the validation rules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Gandi LiveDNS v5 API endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://dns.api.gandi.net/api/v5";

/// Default IP echo service
pub const DEFAULT_IP_DISCOVERY_URL: &str = "https://api.ipify.org";

/// Main updater configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct LiveDnsConfig {
    /// Provider API base URL (no trailing slash required)
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// API secret sent in the `X-Api-Key` header
    /// ⚠️ NEVER log this value
    pub api_secret: String,

    /// Domain whose zone holds the records (e.g. "example.com")
    pub domain: String,

    /// Subdomains to keep in sync, in update order.
    ///
    /// The first entry is the reference record whose published IP is
    /// compared against the discovered one.
    pub subdomains: Vec<String>,

    /// TTL written with every record update (seconds)
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// URL of the plain-text IP echo service
    #[serde(default = "default_ip_discovery_url")]
    pub ip_discovery_url: String,

    /// Transport retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// What to do when one subdomain fails to update
    #[serde(default)]
    pub update_policy: UpdatePolicy,
}

// Custom Debug implementation that hides the API secret
impl std::fmt::Debug for LiveDnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveDnsConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("api_secret", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("subdomains", &self.subdomains)
            .field("ttl", &self.ttl)
            .field("ip_discovery_url", &self.ip_discovery_url)
            .field("retry", &self.retry)
            .field("update_policy", &self.update_policy)
            .finish()
    }
}

impl LiveDnsConfig {
    /// Create a configuration with default endpoint, TTL and retry settings
    pub fn new(
        api_secret: impl Into<String>,
        domain: impl Into<String>,
        subdomains: Vec<String>,
    ) -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            api_secret: api_secret.into(),
            domain: domain.into(),
            subdomains,
            ttl: default_ttl(),
            ip_discovery_url: default_ip_discovery_url(),
            retry: RetryConfig::default(),
            update_policy: UpdatePolicy::default(),
        }
    }

    /// Set the API endpoint
    pub fn with_api_endpoint(mut self, api_endpoint: impl Into<String>) -> Self {
        self.api_endpoint = api_endpoint.into();
        self
    }

    /// Set the record TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the IP discovery URL
    pub fn with_ip_discovery_url(mut self, url: impl Into<String>) -> Self {
        self.ip_discovery_url = url.into();
        self
    }

    /// Set the retry settings
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the subdomain failure policy
    pub fn with_update_policy(mut self, update_policy: UpdatePolicy) -> Self {
        self.update_policy = update_policy;
        self
    }

    /// The subdomain whose published IP stands for all of them
    pub fn reference_subdomain(&self) -> Option<&str> {
        self.subdomains.first().map(String::as_str)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_endpoint.trim().is_empty() {
            return Err(crate::Error::config("API endpoint cannot be empty"));
        }
        if self.api_secret.is_empty() {
            return Err(crate::Error::config("API secret cannot be empty"));
        }
        validate_domain_name(&self.domain)?;
        if self.subdomains.is_empty() {
            return Err(crate::Error::config("No subdomains configured"));
        }
        for subdomain in &self.subdomains {
            validate_subdomain(subdomain)?;
        }
        if self.ttl == 0 {
            return Err(crate::Error::config("TTL must be > 0"));
        }
        if self.ip_discovery_url.trim().is_empty() {
            return Err(crate::Error::config("IP discovery URL cannot be empty"));
        }

        self.retry.validate()?;

        Ok(())
    }
}

/// Transport retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff factor in seconds; retry n waits `factor * 2^(n-1)`
    #[serde(default = "default_backoff_factor_secs")]
    pub backoff_factor_secs: u64,

    /// Upper bound for any single backoff delay (seconds)
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl RetryConfig {
    /// Validate the retry configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_attempts == 0 {
            return Err(crate::Error::config("max_attempts must be > 0"));
        }
        if self.http_timeout_secs == 0 {
            return Err(crate::Error::config("HTTP timeout must be > 0"));
        }
        Ok(())
    }

    /// Per-request timeout as a `Duration`
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_factor_secs: default_backoff_factor_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Behavior of the update loop when a subdomain update fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Record the failure and keep updating the remaining subdomains
    #[default]
    Isolate,
    /// Stop at the first failed subdomain and return its error
    AbortOnFirstFailure,
}

/// Check a domain name against basic RFC 1035 rules
///
/// Catches common errors, not every one.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        validate_label(label, domain, false)?;
    }

    Ok(())
}

/// Check a record name relative to the zone
///
/// Record names end up as a URL path segment, so only DNS label characters
/// are accepted. `@` stands for the zone apex; `*` is accepted as a whole
/// label and `_` inside labels.
pub fn validate_subdomain(subdomain: &str) -> Result<(), crate::Error> {
    if subdomain == "@" {
        return Ok(());
    }

    for label in subdomain.split('.') {
        validate_label(label, subdomain, true)?;
    }

    Ok(())
}

fn validate_label(label: &str, name: &str, relative: bool) -> Result<(), crate::Error> {
    if label.is_empty() {
        return Err(crate::Error::config(format!("Name has empty label: '{}'", name)));
    }

    if label.len() > 63 {
        return Err(crate::Error::config(format!(
            "Label too long: {} chars (max 63). Label: '{}'",
            label.len(),
            label
        )));
    }

    if relative && label == "*" {
        return Ok(());
    }

    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || (relative && c == '_'))
    {
        return Err(crate::Error::config(format!(
            "Label contains invalid characters. Label: '{}'. \
            Valid: alphanumeric and hyphen only.",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(crate::Error::config(format!(
            "Label cannot start or end with hyphen. Label: '{}'",
            label
        )));
    }

    Ok(())
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_ip_discovery_url() -> String {
    DEFAULT_IP_DISCOVERY_URL.to_string()
}

fn default_ttl() -> u32 {
    300
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_factor_secs() -> u64 {
    1
}

fn default_max_backoff_secs() -> u64 {
    120
}

fn default_http_timeout_secs() -> u64 {
    30
}
