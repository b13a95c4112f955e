// # IP Source Trait
//
// Defines how the engine learns the caller's current public IP.
//
// ## Implementations
//
// - HTTP echo service: `livedns-ip-http` crate

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// The returned address is an opaque string (already trimmed). It is
/// compared verbatim with the published record value.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the current public IP
    async fn current(&self) -> Result<String, crate::Error>;

    /// Short name for logging (e.g. the echo service URL)
    fn describe(&self) -> String;
}
