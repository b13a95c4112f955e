// # DNS Provider Trait
//
// Defines the provider operations the reconciliation engine relies on.
//
// ## Implementations
//
// - Gandi LiveDNS v5: `livedns-provider-gandi` crate
//
// ## Usage
//
// ```rust,ignore
// use livedns_core::DnsProvider;
//
// let zone_id = provider.resolve_zone("example.com").await?;
// let published = provider.read_record_ip(&zone_id, "home").await?;
// if published != "1.2.3.4" {
//     provider.update_record(&zone_id, "home", "1.2.3.4", 300).await?;
// }
// ```

use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// Each method maps to exactly one provider API call. IP values are opaque
/// strings; the provider is the judge of their validity.
///
/// # Responsibilities
///
/// - ✅ Issue the API call through the shared retrying client
/// - ✅ Map unexpected statuses to `Error::Provider` with the provider message
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
/// - ❌ Retry at the application level (the transport already retried)
/// - ❌ Cache anything across calls
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Map a domain name to the provider's zone identifier
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the opaque zone identifier
    /// - `Err(Error)`: any non-success status or malformed body
    async fn resolve_zone(&self, domain: &str) -> Result<String, crate::Error>;

    /// Read the first value of a subdomain's A record set
    ///
    /// # Parameters
    ///
    /// - `zone_id`: identifier returned by [`DnsProvider::resolve_zone`]
    /// - `subdomain`: record name relative to the zone (e.g. "home" or "@")
    async fn read_record_ip(&self, zone_id: &str, subdomain: &str)
    -> Result<String, crate::Error>;

    /// Set a subdomain's A record to a single value
    ///
    /// # Idempotency
    ///
    /// This is a "set" operation: repeating it with the same arguments
    /// leaves the record set unchanged.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the provider's confirmation message
    /// - `Err(Error)`: if the update was rejected
    async fn update_record(
        &self,
        zone_id: &str,
        subdomain: &str,
        new_ip: &str,
        ttl: u32,
    ) -> Result<String, crate::Error>;

    /// Get the provider name (for logging)
    fn provider_name(&self) -> &'static str;
}
