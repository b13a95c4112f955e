//! Reconciliation engine
//!
//! The `Reconciler` drives one run of the updater:
//! - Resolving the zone via `DnsProvider`
//! - Discovering the current public IP via `IpSource`
//! - Reading the published IP of the reference subdomain
//! - Deciding whether to update, then updating every subdomain in order
//!
//! ## Architecture
//!
//! ```text
//!                     ┌──────────────┐
//!                     │  Reconciler  │
//!                     └──────────────┘
//!                            │
//!        ┌───────────────────┼────────────────────┐
//!        │                   │                    │
//!        ▼                   ▼                    ▼
//! ┌─────────────┐    ┌──────────────┐    ┌────────────────┐
//! │ resolve_zone│    │   IpSource   │    │ read_record_ip │
//! └─────────────┘    │  (current)   │    │  (subdomain 0) │
//!                    └──────────────┘    └────────────────┘
//!                            │
//!                   decide(force, ips)
//!                            │
//!                            ▼
//!                 update_record × N subdomains
//! ```
//!
//! ## Run States
//!
//! `START → ZONE_RESOLVED → IP_COMPARED → {NO_CHANGE | UPDATING(i) → DONE}`.
//! Any error before the update loop ends the run; errors inside the loop are
//! handled according to [`UpdatePolicy`].

use crate::config::{LiveDnsConfig, UpdatePolicy};
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IpSource};
use tracing::{debug, error, info, warn};

/// What the engine decided after comparing IPs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Published IP equals the discovered one; nothing to do
    UpToDate,
    /// Published IP differs; every subdomain gets updated
    Mismatch,
    /// Update requested regardless of the comparison
    Forced,
}

/// Result for one subdomain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Record was set; carries the provider's confirmation message
    Updated {
        /// Confirmation returned by the provider
        message: String,
    },
    /// Record already had the current IP
    Skipped,
    /// Update was rejected or the call failed
    Failed {
        /// Human-readable failure
        reason: String,
    },
}

/// Outcome for a named subdomain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainOutcome {
    /// Subdomain name as configured
    pub subdomain: String,
    /// What happened to it
    pub outcome: UpdateOutcome,
}

/// Summary of one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Zone identifier used for the run
    pub zone_id: String,
    /// IP reported by the IP source
    pub discovered_ip: String,
    /// IP published for the reference subdomain before the run
    pub published_ip: String,
    /// Decision taken
    pub decision: Decision,
    /// Per-subdomain outcomes, in configuration order
    pub outcomes: Vec<SubdomainOutcome>,
}

impl ReconcileReport {
    /// True when no subdomain failed
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Number of subdomains updated
    pub fn updated_count(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Updated { .. }))
    }

    /// Number of subdomains left untouched because they were current
    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Skipped))
    }

    /// Number of subdomains that failed
    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&UpdateOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.outcome)).count()
    }
}

/// Compare discovered and published IPs
///
/// IPs are opaque strings compared verbatim. No hidden state takes part in
/// the decision.
pub fn decide(force: bool, discovered_ip: &str, published_ip: &str) -> Decision {
    if force {
        Decision::Forced
    } else if discovered_ip == published_ip {
        Decision::UpToDate
    } else {
        Decision::Mismatch
    }
}

/// Core reconciliation engine
///
/// Owns the provider and IP source for a run. Both are expected to share a
/// single `RetryingClient` built by the caller.
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Call [`Reconciler::reconcile()`] once per run
///
/// Execution is strictly sequential: one request in flight at a time.
pub struct Reconciler {
    /// DNS provider for zone and record calls
    provider: Box<dyn DnsProvider>,

    /// Source of the current public IP
    ip_source: Box<dyn IpSource>,

    /// Run configuration
    config: LiveDnsConfig,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Returns
    ///
    /// - `Ok(Reconciler)`: ready to run
    /// - `Err(Error::Config)`: the configuration is invalid
    pub fn new(
        provider: Box<dyn DnsProvider>,
        ip_source: Box<dyn IpSource>,
        config: LiveDnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            ip_source,
            config,
        })
    }

    /// The configuration this reconciler runs with
    pub fn config(&self) -> &LiveDnsConfig {
        &self.config
    }

    /// Run one reconciliation
    ///
    /// # Parameters
    ///
    /// - `force`: update every subdomain even if the published IP is current
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: the run completed; check
    ///   [`ReconcileReport::is_success`] for per-subdomain failures
    /// - `Err(Error)`: zone resolution, IP discovery or the record read
    ///   failed (no update was issued), or a subdomain failed under
    ///   [`UpdatePolicy::AbortOnFirstFailure`]
    pub async fn reconcile(&self, force: bool) -> Result<ReconcileReport> {
        let reference = self
            .config
            .reference_subdomain()
            .ok_or_else(|| Error::config("No subdomains configured"))?;

        let zone_id = self.provider.resolve_zone(&self.config.domain).await?;
        debug!("Zone for {} resolved to {}", self.config.domain, zone_id);

        let discovered_ip = self.ip_source.current().await?;
        debug!("Discovered IP {} from {}", discovered_ip, self.ip_source.describe());

        let published_ip = self.provider.read_record_ip(&zone_id, reference).await?;
        debug!("Published IP for {}: {}", reference, published_ip);

        let decision = decide(force, &discovered_ip, &published_ip);

        let outcomes = match decision {
            Decision::UpToDate => {
                info!("IP address match ({}), no update needed", discovered_ip);
                self.skip_all()
            }
            Decision::Mismatch => {
                info!(
                    "IP address mismatch (published {}, current {}), updating {} subdomain(s)",
                    published_ip,
                    discovered_ip,
                    self.config.subdomains.len()
                );
                self.update_all(&zone_id, &discovered_ip).await?
            }
            Decision::Forced => {
                info!(
                    "Forced update of {} subdomain(s) to {}",
                    self.config.subdomains.len(),
                    discovered_ip
                );
                self.update_all(&zone_id, &discovered_ip).await?
            }
        };

        Ok(ReconcileReport {
            zone_id,
            discovered_ip,
            published_ip,
            decision,
            outcomes,
        })
    }

    fn skip_all(&self) -> Vec<SubdomainOutcome> {
        self.config
            .subdomains
            .iter()
            .map(|subdomain| SubdomainOutcome {
                subdomain: subdomain.clone(),
                outcome: UpdateOutcome::Skipped,
            })
            .collect()
    }

    /// Update every subdomain in configuration order
    async fn update_all(&self, zone_id: &str, new_ip: &str) -> Result<Vec<SubdomainOutcome>> {
        let mut outcomes = Vec::with_capacity(self.config.subdomains.len());

        for subdomain in &self.config.subdomains {
            let result = self
                .provider
                .update_record(zone_id, subdomain, new_ip, self.config.ttl)
                .await;

            let outcome = match result {
                Ok(message) => {
                    debug!("Subdomain {} updated: {}", subdomain, message);
                    UpdateOutcome::Updated { message }
                }
                Err(e) => match self.config.update_policy {
                    UpdatePolicy::AbortOnFirstFailure => {
                        warn!("Update of {} failed, skipping remaining subdomains", subdomain);
                        return Err(e);
                    }
                    UpdatePolicy::Isolate => {
                        error!("Failed to update {}: {}", subdomain, e);
                        UpdateOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                },
            };

            outcomes.push(SubdomainOutcome {
                subdomain: subdomain.clone(),
                outcome,
            });
        }

        Ok(outcomes)
    }
}
