//! Test doubles and common utilities for reconciliation contract tests
//!
//! The mock provider keeps an in-memory zone so tests can observe both the
//! calls made and the resulting record state.

#![allow(dead_code)]

use livedns_core::config::LiveDnsConfig;
use livedns_core::error::{Error, Result};
use livedns_core::traits::{DnsProvider, IpSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ZONE_ID: &str = "zone-uuid-1234";

/// One recorded `update_record` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub zone_id: String,
    pub subdomain: String,
    pub new_ip: String,
    pub ttl: u32,
}

/// A mock DnsProvider backed by an in-memory record map
///
/// Clones share state, so a test can keep one handle while the
/// reconciler owns another.
#[derive(Clone)]
pub struct MockDnsProvider {
    /// subdomain -> rrset_values
    records: Arc<Mutex<HashMap<String, Vec<String>>>>,
    /// Every update_record call, in order
    update_calls: Arc<Mutex<Vec<UpdateCall>>>,
    /// Call counter for resolve_zone()
    zone_call_count: Arc<AtomicUsize>,
    /// Call counter for read_record_ip()
    read_call_count: Arc<AtomicUsize>,
    /// Status returned by resolve_zone() when set
    zone_failure: Option<u16>,
    /// Subdomains whose update is rejected
    failing_subdomains: Vec<String>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            update_calls: Arc::new(Mutex::new(Vec::new())),
            zone_call_count: Arc::new(AtomicUsize::new(0)),
            read_call_count: Arc::new(AtomicUsize::new(0)),
            zone_failure: None,
            failing_subdomains: Vec::new(),
        }
    }

    /// Pre-populate a subdomain's published IP
    pub fn with_record(self, subdomain: &str, ip: &str) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(subdomain.to_string(), vec![ip.to_string()]);
        self
    }

    /// Make resolve_zone() fail with the given status
    pub fn failing_zone(mut self, status: u16) -> Self {
        self.zone_failure = Some(status);
        self
    }

    /// Make updates of one subdomain fail
    pub fn failing_update(mut self, subdomain: &str) -> Self {
        self.failing_subdomains.push(subdomain.to_string());
        self
    }

    pub fn update_calls(&self) -> Vec<UpdateCall> {
        self.update_calls.lock().unwrap().clone()
    }

    pub fn updated_subdomains(&self) -> Vec<String> {
        self.update_calls()
            .into_iter()
            .map(|call| call.subdomain)
            .collect()
    }

    pub fn zone_call_count(&self) -> usize {
        self.zone_call_count.load(Ordering::SeqCst)
    }

    pub fn read_call_count(&self) -> usize {
        self.read_call_count.load(Ordering::SeqCst)
    }

    /// Current record set for a subdomain
    pub fn record_values(&self, subdomain: &str) -> Option<Vec<String>> {
        self.records.lock().unwrap().get(subdomain).cloned()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn resolve_zone(&self, _domain: &str) -> Result<String> {
        self.zone_call_count.fetch_add(1, Ordering::SeqCst);
        match self.zone_failure {
            Some(status) => Err(Error::provider(
                "get zone UUID",
                status,
                Some("Access was denied".to_string()),
            )),
            None => Ok(ZONE_ID.to_string()),
        }
    }

    async fn read_record_ip(&self, zone_id: &str, subdomain: &str) -> Result<String> {
        self.read_call_count.fetch_add(1, Ordering::SeqCst);
        assert_eq!(zone_id, ZONE_ID, "read must use the resolved zone");

        self.records
            .lock()
            .unwrap()
            .get(subdomain)
            .and_then(|values| values.first().cloned())
            .ok_or_else(|| {
                Error::provider(
                    format!("get IP from subdomain {}", subdomain),
                    404,
                    Some("Record not found".to_string()),
                )
            })
    }

    async fn update_record(
        &self,
        zone_id: &str,
        subdomain: &str,
        new_ip: &str,
        ttl: u32,
    ) -> Result<String> {
        self.update_calls.lock().unwrap().push(UpdateCall {
            zone_id: zone_id.to_string(),
            subdomain: subdomain.to_string(),
            new_ip: new_ip.to_string(),
            ttl,
        });

        if self.failing_subdomains.iter().any(|s| s == subdomain) {
            return Err(Error::provider(
                format!("update IP for subdomain {}", subdomain),
                500,
                Some("Internal error".to_string()),
            ));
        }

        // Set semantics: the record set is replaced, never appended to
        self.records
            .lock()
            .unwrap()
            .insert(subdomain.to_string(), vec![new_ip.to_string()]);

        Ok("DNS Record Created".to_string())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An IP source returning a fixed value (or a fixed failure)
#[derive(Clone)]
pub struct FixedIpSource {
    ip: Option<String>,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: &str) -> Self {
        Self {
            ip: Some(ip.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// An IP source whose every call fails like an exhausted transport
    pub fn unreachable() -> Self {
        Self {
            ip: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.ip
            .clone()
            .ok_or_else(|| Error::transport(5, "connection refused"))
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

/// Helper to create a minimal LiveDnsConfig for testing
pub fn minimal_config(subdomains: &[&str]) -> LiveDnsConfig {
    LiveDnsConfig::new(
        "test-secret",
        "example.com",
        subdomains.iter().map(|s| s.to_string()).collect(),
    )
    .with_ttl(1800)
}
