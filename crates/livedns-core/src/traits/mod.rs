//! Core traits for the LiveDNS updater
//!
//! - [`DnsProvider`]: Resolve zones, read and set A records
//! - [`IpSource`]: Discover the current public IP

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::DnsProvider;
