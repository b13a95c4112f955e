//! Environment configuration for the `gandi-live-dns` binary
//!
//! All settings come from `LIVEDNS_*` environment variables. Loading goes
//! through a lookup function so tests never touch the process environment.

use anyhow::{Context, Result};
use livedns_core::config::{
    DEFAULT_API_ENDPOINT, DEFAULT_IP_DISCOVERY_URL, LiveDnsConfig, RetryConfig, UpdatePolicy,
    validate_domain_name, validate_subdomain,
};

/// Application configuration, as read from the environment
#[derive(Clone)]
pub struct Config {
    pub api_endpoint: String,
    pub api_secret: String,
    pub domain: String,
    pub subdomains: Vec<String>,
    pub ttl: u32,
    pub ip_discovery_url: String,
    pub max_attempts: u32,
    pub backoff_factor_secs: u64,
    pub http_timeout_secs: u64,
    pub update_policy: UpdatePolicy,
    pub dry_run: bool,
    pub log_level: String,
}

// Never print the secret, even in debug output
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_endpoint", &self.api_endpoint)
            .field("api_secret", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("subdomains", &self.subdomains)
            .field("ttl", &self.ttl)
            .field("ip_discovery_url", &self.ip_discovery_url)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_factor_secs", &self.backoff_factor_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("update_policy", &self.update_policy)
            .field("dry_run", &self.dry_run)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RetryConfig::default();

        Ok(Self {
            api_endpoint: lookup("LIVEDNS_API_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            api_secret: lookup("LIVEDNS_API_SECRET").context(
                "LIVEDNS_API_SECRET is required. Set it via: export LIVEDNS_API_SECRET=your_key",
            )?,
            domain: lookup("LIVEDNS_DOMAIN")
                .context("LIVEDNS_DOMAIN is required. Set it via: export LIVEDNS_DOMAIN=example.com")?
                .trim()
                .to_string(),
            subdomains: lookup("LIVEDNS_SUBDOMAINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            ttl: parse_var(&lookup, "LIVEDNS_TTL", 300)?,
            ip_discovery_url: lookup("LIVEDNS_IP_DISCOVERY_URL")
                .unwrap_or_else(|| DEFAULT_IP_DISCOVERY_URL.to_string()),
            max_attempts: parse_var(&lookup, "LIVEDNS_MAX_ATTEMPTS", defaults.max_attempts)?,
            backoff_factor_secs: parse_var(
                &lookup,
                "LIVEDNS_BACKOFF_FACTOR_SECS",
                defaults.backoff_factor_secs,
            )?,
            http_timeout_secs: parse_var(
                &lookup,
                "LIVEDNS_HTTP_TIMEOUT_SECS",
                defaults.http_timeout_secs,
            )?,
            update_policy: match lookup("LIVEDNS_ON_FAILURE")
                .unwrap_or_else(|| "continue".to_string())
                .to_lowercase()
                .as_str()
            {
                "continue" => UpdatePolicy::Isolate,
                "abort" => UpdatePolicy::AbortOnFirstFailure,
                other => anyhow::bail!(
                    "LIVEDNS_ON_FAILURE '{}' is not valid. Valid values: continue, abort",
                    other
                ),
            },
            dry_run: lookup("LIVEDNS_MODE").unwrap_or_default().to_lowercase() == "dry-run",
            log_level: lookup("LIVEDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks presence of required values, URL schemes, names and numeric
    /// ranges. The library re-validates the structural parts.
    pub fn validate(&self) -> Result<()> {
        if self.api_secret.is_empty() {
            anyhow::bail!(
                "LIVEDNS_API_SECRET is required. \
                Set it via: export LIVEDNS_API_SECRET=your_key"
            );
        }

        validate_url("LIVEDNS_API_ENDPOINT", &self.api_endpoint)?;
        validate_url("LIVEDNS_IP_DISCOVERY_URL", &self.ip_discovery_url)?;

        if self.domain.is_empty() {
            anyhow::bail!("LIVEDNS_DOMAIN cannot be empty");
        }
        validate_domain_name(&self.domain).context("Invalid LIVEDNS_DOMAIN")?;

        if self.subdomains.is_empty() {
            anyhow::bail!(
                "LIVEDNS_SUBDOMAINS must contain at least one subdomain. \
                Set it via: export LIVEDNS_SUBDOMAINS=home,office"
            );
        }
        for subdomain in &self.subdomains {
            validate_subdomain(subdomain).context("Invalid LIVEDNS_SUBDOMAINS entry")?;
        }

        if self.ttl == 0 {
            anyhow::bail!("LIVEDNS_TTL must be greater than 0");
        }

        if !(1..=10).contains(&self.max_attempts) {
            anyhow::bail!(
                "LIVEDNS_MAX_ATTEMPTS must be between 1 and 10. Got: {}",
                self.max_attempts
            );
        }

        if self.backoff_factor_secs > 60 {
            anyhow::bail!(
                "LIVEDNS_BACKOFF_FACTOR_SECS must be between 0 and 60 seconds. Got: {}",
                self.backoff_factor_secs
            );
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "LIVEDNS_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "LIVEDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the library configuration
    pub fn to_live_config(&self) -> LiveDnsConfig {
        LiveDnsConfig::new(
            self.api_secret.clone(),
            self.domain.clone(),
            self.subdomains.clone(),
        )
        .with_api_endpoint(self.api_endpoint.clone())
        .with_ttl(self.ttl)
        .with_ip_discovery_url(self.ip_discovery_url.clone())
        .with_retry(RetryConfig {
            max_attempts: self.max_attempts,
            backoff_factor_secs: self.backoff_factor_secs,
            http_timeout_secs: self.http_timeout_secs,
            ..RetryConfig::default()
        })
        .with_update_policy(self.update_policy)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer. Got: '{}'", key, raw)),
    }
}

fn validate_url(key: &str, url: &str) -> Result<()> {
    if url.is_empty() {
        anyhow::bail!("{} cannot be empty", key);
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        anyhow::bail!("{} must use HTTP or HTTPS scheme. Got: {}", key, url);
    }
    Ok(())
}
