//! Contract Test: Idempotency
//!
//! Constraints verified:
//! - Repeating an update with identical arguments leaves the record set
//!   unchanged (set semantics, no duplicate values)
//! - A second run after a successful update converges: no further updates

mod common;

use common::*;
use livedns_core::traits::DnsProvider;
use livedns_core::{Decision, Reconciler};

#[tokio::test]
async fn repeated_update_leaves_record_set_unchanged() {
    let provider = MockDnsProvider::new().with_record("home", "1.2.3.3");

    provider
        .update_record(ZONE_ID, "home", "1.2.3.4", 300)
        .await
        .unwrap();
    let after_first = provider.record_values("home");

    provider
        .update_record(ZONE_ID, "home", "1.2.3.4", 300)
        .await
        .unwrap();
    let after_second = provider.record_values("home");

    assert_eq!(after_first, Some(vec!["1.2.3.4".to_string()]));
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn rerun_after_update_converges() {
    let provider = MockDnsProvider::new().with_record("home", "1.2.3.3");
    let config = minimal_config(&["home", "office"]);

    let first = Reconciler::new(
        Box::new(provider.clone()),
        Box::new(FixedIpSource::new("1.2.3.4")),
        config.clone(),
    )
    .unwrap();
    assert_eq!(first.reconcile(false).await.unwrap().decision, Decision::Mismatch);
    assert_eq!(provider.update_calls().len(), 2);

    // Second run: the published IP now matches
    let second = Reconciler::new(
        Box::new(provider.clone()),
        Box::new(FixedIpSource::new("1.2.3.4")),
        config,
    )
    .unwrap();
    let report = second.reconcile(false).await.unwrap();

    assert_eq!(report.decision, Decision::UpToDate);
    assert_eq!(provider.update_calls().len(), 2, "no additional updates");
}

#[tokio::test]
async fn forced_rerun_is_harmless() {
    let provider = MockDnsProvider::new().with_record("home", "1.2.3.4");
    let reconciler = Reconciler::new(
        Box::new(provider.clone()),
        Box::new(FixedIpSource::new("1.2.3.4")),
        minimal_config(&["home"]),
    )
    .unwrap();

    reconciler.reconcile(true).await.unwrap();
    reconciler.reconcile(true).await.unwrap();

    assert_eq!(provider.update_calls().len(), 2);
    assert_eq!(provider.record_values("home"), Some(vec!["1.2.3.4".to_string()]));
}
