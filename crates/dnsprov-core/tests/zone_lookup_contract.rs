//! Contract Test: Zone Lookup and Provisioning
//!
//! Constraints verified:
//! - An existing zone is found and never re-created
//! - A missing zone is created with a fresh caller reference
//! - Lookup follows listing pages, at most `MAX_ZONE_PAGES` of them
//! - A registrar read failure stops the run before any zone is created
//! - Zone names match only after stripping the root dot, case-sensitively

mod common;

use common::*;
use dnsprov_core::engine::{MAX_ZONE_PAGES, NameServerPlan, ZoneAction};
use dnsprov_core::model::{HostedZoneId, HostedZoneSummary};
use dnsprov_core::{Error, Provisioner};

/// `count` listing pages, none of which holds example.com
fn unrelated_pages(count: usize) -> Vec<Vec<HostedZoneSummary>> {
    (0..count)
        .map(|i| vec![zone(&format!("Z{}", i), &format!("other-{}.com", i))])
        .collect()
}

fn listing_calls(mock: &MockProvider) -> usize {
    mock.calls()
        .into_iter()
        .filter(|c| matches!(c, Call::ListZones { .. }))
        .count()
}

#[tokio::test]
async fn existing_zone_is_found_and_not_created() {
    let mock = MockProvider::new()
        .with_zones(vec![zone("Z111", "example.com")])
        .with_zone_name_servers("Z111", &ASSIGNED_NAME_SERVERS)
        .with_registrar_name_servers(&ASSIGNED_NAME_SERVERS);

    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    let lookup = provisioner.locate_zone().await.unwrap();
    assert!(lookup.found);
    assert_eq!(lookup.id, Some(HostedZoneId::new("/hostedzone/Z111")));

    let report = provisioner.run().await.unwrap();
    assert!(!report.zone_created);
    assert_eq!(report.zone_id.short(), "Z111");
    assert!(mock.create_calls().is_empty(), "zone must not be created");
}

#[tokio::test]
async fn missing_zone_is_reported_and_then_created() {
    let mock = MockProvider::new()
        .with_zones(vec![zone("Z222", "other.com")])
        .with_registrar_name_servers(&ASSIGNED_NAME_SERVERS);

    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    let lookup = provisioner.locate_zone().await.unwrap();
    assert!(!lookup.found);
    assert_eq!(lookup.id, None);

    let plan = provisioner.plan().await.unwrap();
    assert_eq!(plan.zone, ZoneAction::Create);
    assert_eq!(plan.name_servers, NameServerPlan::AfterZoneCreation);

    let report = provisioner.apply(plan).await.unwrap();
    assert!(report.zone_created);
    assert!(!report.zone_id.as_str().is_empty());

    let creates = mock.create_calls();
    assert_eq!(creates.len(), 1);
    match &creates[0] {
        Call::CreateZone {
            name,
            caller_reference,
        } => {
            assert_eq!(name, "example.com");
            assert!(!caller_reference.is_empty());
        }
        other => panic!("unexpected call {:?}", other),
    }

    // The record is written into the zone that was just created
    let changes = mock.record_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].0, report.zone_id.short());
}

#[tokio::test]
async fn each_creation_uses_a_distinct_caller_reference() {
    let mock = MockProvider::new().with_zones(vec![]);
    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    provisioner.provision_zone().await.unwrap();
    provisioner.provision_zone().await.unwrap();

    let references: Vec<String> = mock
        .create_calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreateZone {
                caller_reference, ..
            } => Some(caller_reference),
            _ => None,
        })
        .collect();

    assert_eq!(references.len(), 2);
    assert_ne!(references[0], references[1]);
}

#[tokio::test]
async fn lookup_follows_pages_until_found() {
    let mock = MockProvider::new().with_pages(vec![
        vec![zone("Z1", "example.co"), zone("Z2", "example.co.uk")],
        vec![zone("Z3", "example.com")],
        vec![zone("Z4", "zzz.com")],
    ]);

    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    let lookup = provisioner.locate_zone().await.unwrap();
    assert_eq!(lookup.id, Some(HostedZoneId::new("/hostedzone/Z3")));

    // Stops as soon as the zone is found
    let listings = mock
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::ListZones { .. }))
        .count();
    assert_eq!(listings, 2);
}

#[tokio::test]
async fn lookup_reads_every_page_when_absent() {
    let mock = MockProvider::new().with_pages(vec![
        vec![zone("Z1", "a.com")],
        vec![zone("Z2", "b.com")],
        vec![zone("Z3", "c.com")],
    ]);

    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    let lookup = provisioner.locate_zone().await.unwrap();
    assert!(!lookup.found);
    assert_eq!(mock.calls().len(), 3);
}

#[tokio::test]
async fn lookup_matching_is_exact_and_case_sensitive() {
    let mock = MockProvider::new().with_zones(vec![
        zone("Z1", "sub.example.com"),
        zone("Z2", "Example.com"),
    ]);

    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    let lookup = provisioner.locate_zone().await.unwrap();
    assert!(!lookup.found);
}

#[tokio::test]
async fn zone_creation_failure_is_fatal() {
    let mock = MockProvider::new()
        .with_zones(vec![])
        .failing_zone_creation();

    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    let err = provisioner.run().await.unwrap_err();
    assert!(!err.is_record_upsert());

    // Nothing after the failed creation runs
    assert!(mock.nameserver_updates().is_empty());
    assert!(mock.record_changes().is_empty());
}

#[tokio::test]
async fn lookup_reads_up_to_the_page_limit() {
    let mock = MockProvider::new().with_pages(unrelated_pages(MAX_ZONE_PAGES));

    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    let lookup = provisioner.locate_zone().await.unwrap();
    assert!(!lookup.found);
    assert_eq!(lookup.id, None);
    assert_eq!(listing_calls(&mock), MAX_ZONE_PAGES);
}

#[tokio::test]
async fn lookup_past_the_page_limit_is_an_error() {
    let mock = MockProvider::new()
        .with_pages(unrelated_pages(MAX_ZONE_PAGES + 1))
        .with_registrar_name_servers(&ASSIGNED_NAME_SERVERS);

    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    let err = provisioner.locate_zone().await.unwrap_err();
    match &err {
        Error::Provider { provider, message } => {
            assert_eq!(provider, "mock");
            assert!(message.contains("100 pages"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(listing_calls(&mock), MAX_ZONE_PAGES);

    // Not mistaken for a missing zone
    let err = provisioner.run().await.unwrap_err();
    assert!(matches!(err, Error::Provider { .. }));
    assert!(mock.create_calls().is_empty());
}

#[tokio::test]
async fn registrar_read_failure_happens_before_zone_creation() {
    let mock = MockProvider::new()
        .with_zones(vec![zone("Z222", "other.com")])
        .failing_domain_detail();

    let provisioner = Provisioner::new(mock.provider(), &minimal_config("example.com", "203.0.113.5"))
        .expect("provisioner construction succeeds");

    let err = provisioner.run().await.unwrap_err();
    assert!(!err.is_record_upsert());
    assert!(matches!(err, Error::Provider { .. }));

    // Lookup, then the registrar read; nothing is created or written
    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], Call::ListZones { .. }));
    assert_eq!(
        calls[1],
        Call::GetDomain {
            domain: "example.com".to_string()
        }
    );
    assert!(mock.mutations().is_empty());
}
