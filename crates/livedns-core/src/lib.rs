// # livedns-core
//
// Core library for the Gandi LiveDNS dynamic-DNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for discovering the current public IP
// - **DnsProvider**: Trait for zone lookup, record reads and record updates
// - **RetryingClient**: Shared HTTP client with bounded exponential retry
// - **Reconciler**: Engine that compares IPs and drives the update loop
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic lives here, API specifics in providers
// 2. **Injected Transport**: One client per run, passed explicitly to each component
// 3. **Errors as Values**: Nothing in the library exits the process
// 4. **Stateless Runs**: Re-running with the same inputs converges to the same DNS state

pub mod traits;
pub mod engine;
pub mod http;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider};
pub use engine::{Decision, ReconcileReport, Reconciler, SubdomainOutcome, UpdateOutcome};
pub use http::{HttpRequest, HttpResponse, RetryPolicy, RetryingClient};
pub use config::{LiveDnsConfig, RetryConfig, UpdatePolicy};
pub use error::{Error, Result};
