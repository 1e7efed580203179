//! Domain model shared by the engine and provider implementations
//!
//! Everything here is ephemeral: fetched or created during one run and
//! dropped at exit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix the provider puts in front of hosted zone identifiers
const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

/// Maximum length the provider accepts for a caller reference
pub const MAX_CALLER_REFERENCE_LEN: usize = 128;

/// Default time-to-live for the address record (seconds)
pub const DEFAULT_RECORD_TTL: u32 = 60;

/// Opaque hosted zone identifier as returned by the provider
///
/// The provider returns identifiers in the `/hostedzone/Z123` form but
/// expects the bare `Z123` form in request paths. Both forms are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostedZoneId(String);

impl HostedZoneId {
    /// Wrap a provider identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier exactly as the provider returned it
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier without the `/hostedzone/` prefix
    pub fn short(&self) -> &str {
        self.0.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for HostedZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A hosted zone as it appears in a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZoneSummary {
    /// Provider identifier
    pub id: HostedZoneId,
    /// Zone name as returned, normally with a trailing root dot
    pub name: String,
    /// Caller reference the zone was created with
    pub caller_reference: Option<String>,
    /// Number of record sets in the zone
    pub record_count: Option<u64>,
    /// Whether the zone is private
    pub private: bool,
}

impl HostedZoneSummary {
    /// Whether this zone is the zone for `domain`
    ///
    /// The trailing root-label separator is stripped from the zone name and
    /// the result compared byte for byte with the domain.
    pub fn matches_domain(&self, domain: &str) -> bool {
        self.name.strip_suffix('.').unwrap_or(&self.name) == domain
    }
}

/// Continuation marker for hosted zone listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken {
    /// Name to resume the listing from
    pub dns_name: String,
    /// Zone identifier to resume the listing from
    pub hosted_zone_id: Option<String>,
}

/// One page of a hosted zone listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostedZonePage {
    /// Zones on this page
    pub zones: Vec<HostedZoneSummary>,
    /// Marker for the next page, `None` when the listing is complete
    pub next: Option<PageToken>,
}

/// A hosted zone together with its delegation set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZoneDetail {
    pub zone: HostedZoneSummary,
    /// Authoritative name servers assigned to the zone, in provider order
    pub name_servers: Vec<String>,
}

/// Result of a hosted zone creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedHostedZone {
    pub zone: HostedZoneSummary,
    pub name_servers: Vec<String>,
    pub change: ChangeInfo,
}

/// Outcome of looking up the zone for a domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneLookup {
    pub found: bool,
    pub id: Option<HostedZoneId>,
}

impl ZoneLookup {
    /// A lookup that found `id`
    pub fn found(id: HostedZoneId) -> Self {
        Self {
            found: true,
            id: Some(id),
        }
    }

    /// A lookup that found nothing
    pub fn missing() -> Self {
        Self {
            found: false,
            id: None,
        }
    }
}

/// Idempotency token for hosted zone creation
///
/// A fresh value is generated per invocation so that a retried request is
/// never confused with an unrelated earlier creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerReference(String);

impl CallerReference {
    /// Generate a reference unique to this invocation
    pub fn generate() -> Self {
        let now = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
        Self(format!("dnsprov-{}-{}", now, uuid::Uuid::new_v4()))
    }

    /// Use an explicit reference
    pub fn new(value: impl Into<String>) -> crate::Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(crate::Error::invalid_input("Caller reference cannot be empty"));
        }
        if value.len() > MAX_CALLER_REFERENCE_LEN {
            return Err(crate::Error::invalid_input(format!(
                "Caller reference too long: {} chars (max {})",
                value.len(),
                MAX_CALLER_REFERENCE_LEN
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A name server entry as held by the registrar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nameserver {
    /// Host name of the name server
    pub name: String,
    /// Glue addresses, only present for in-bailiwick servers
    #[serde(default)]
    pub glue_ips: Vec<String>,
}

impl Nameserver {
    /// A name server without glue records
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            glue_ips: Vec::new(),
        }
    }
}

/// Registrar view of a domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainDetail {
    pub domain_name: String,
    pub nameservers: Vec<Nameserver>,
}

impl DomainDetail {
    /// Host names of the delegated name servers, in registrar order
    pub fn nameserver_names(&self) -> Vec<String> {
        self.nameservers.iter().map(|ns| ns.name.clone()).collect()
    }
}

/// An address record to write into the hosted zone
///
/// The target value is carried as given; it is not parsed as an IP literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Record name (the domain itself)
    pub name: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Target IP address
    pub value: String,
}

impl AddressRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            ttl,
            value: value.into(),
        }
    }

    /// Record type, always `A`
    pub fn record_type(&self) -> &'static str {
        "A"
    }
}

/// Action applied to a record set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Create the record set or replace it
    Upsert,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

/// A single record set change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub record: AddressRecord,
}

/// A batch of record set changes submitted together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch {
    pub comment: Option<String>,
    pub changes: Vec<RecordChange>,
}

impl ChangeBatch {
    /// A batch holding one upsert of `record`
    pub fn upsert(record: AddressRecord, comment: Option<String>) -> Self {
        Self {
            comment,
            changes: vec![RecordChange {
                action: ChangeAction::Upsert,
                record,
            }],
        }
    }
}

/// Tracking information for an asynchronous provider change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    /// Change identifier, e.g. `/change/C2682N5HXP0BZ4`
    pub id: String,
    /// Propagation status, e.g. `PENDING` or `INSYNC`
    pub status: String,
    /// Submission timestamp as reported by the provider
    pub submitted_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> HostedZoneSummary {
        HostedZoneSummary {
            id: HostedZoneId::new("/hostedzone/Z1"),
            name: name.to_string(),
            caller_reference: None,
            record_count: None,
            private: false,
        }
    }

    #[test]
    fn test_zone_id_short_form() {
        assert_eq!(HostedZoneId::new("/hostedzone/Z0123").short(), "Z0123");
        assert_eq!(HostedZoneId::new("Z0123").short(), "Z0123");
        assert_eq!(HostedZoneId::new("/hostedzone/Z0123").as_str(), "/hostedzone/Z0123");
    }

    #[test]
    fn test_matches_domain_strips_root_dot() {
        assert!(summary("example.com.").matches_domain("example.com"));
        assert!(summary("example.com").matches_domain("example.com"));
        assert!(!summary("sub.example.com.").matches_domain("example.com"));
    }

    #[test]
    fn test_matches_domain_is_case_sensitive() {
        assert!(!summary("Example.com.").matches_domain("example.com"));
    }

    #[test]
    fn test_caller_reference_is_unique_and_bounded() {
        let a = CallerReference::generate();
        let b = CallerReference::generate();

        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
        assert!(a.as_str().len() <= MAX_CALLER_REFERENCE_LEN);
    }

    #[test]
    fn test_caller_reference_validation() {
        assert!(CallerReference::new("").is_err());
        assert!(CallerReference::new("x".repeat(129)).is_err());
        assert_eq!(CallerReference::new("ref-1").unwrap().as_str(), "ref-1");
    }

    #[test]
    fn test_nameserver_names_drop_glue() {
        let detail = DomainDetail {
            domain_name: "example.com".to_string(),
            nameservers: vec![
                Nameserver {
                    name: "ns1.example.com".to_string(),
                    glue_ips: vec!["192.0.2.1".to_string()],
                },
                Nameserver::named("ns-2.awsdns-02.net"),
            ],
        };

        assert_eq!(
            detail.nameserver_names(),
            vec!["ns1.example.com".to_string(), "ns-2.awsdns-02.net".to_string()]
        );
    }

    #[test]
    fn test_upsert_batch() {
        let record = AddressRecord::new("example.com", "203.0.113.5", DEFAULT_RECORD_TTL);
        let batch = ChangeBatch::upsert(record.clone(), None);

        assert_eq!(batch.changes.len(), 1);
        assert_eq!(batch.changes[0].action.as_str(), "UPSERT");
        assert_eq!(batch.changes[0].record, record);
        assert_eq!(record.record_type(), "A");
        assert_eq!(record.ttl, 60);
    }
}
