//! Test doubles and common utilities for provisioning contract tests
//!
//! The doubles record every call so tests can assert which provider
//! operations a run performed, in which order, and with which arguments.

#![allow(dead_code)]

use async_trait::async_trait;
use dnsprov_core::config::{ProviderConfig, ProvisionConfig};
use dnsprov_core::error::{Error, Result};
use dnsprov_core::model::{
    CallerReference, ChangeBatch, ChangeInfo, CreatedHostedZone, DomainDetail, HostedZoneDetail,
    HostedZoneId, HostedZonePage, HostedZoneSummary, Nameserver, PageToken,
};
use dnsprov_core::traits::{HostedZoneApi, Provider, RegistrarApi};
use std::sync::{Arc, Mutex};

/// Name servers the mock assigns to zones it creates
pub const ASSIGNED_NAME_SERVERS: [&str; 4] = [
    "ns-1.awsdns-01.org",
    "ns-2.awsdns-02.co.uk",
    "ns-3.awsdns-03.com",
    "ns-4.awsdns-04.net",
];

/// A zone summary with the provider's trailing root dot
pub fn zone(id: &str, name: &str) -> HostedZoneSummary {
    HostedZoneSummary {
        id: HostedZoneId::new(format!("/hostedzone/{}", id)),
        name: format!("{}.", name),
        caller_reference: None,
        record_count: Some(2),
        private: false,
    }
}

/// A call observed by the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListZones {
        dns_name: String,
        page: Option<String>,
    },
    CreateZone {
        name: String,
        caller_reference: String,
    },
    GetZone {
        id: String,
    },
    ChangeRecords {
        id: String,
        batch: ChangeBatch,
    },
    GetDomain {
        domain: String,
    },
    UpdateNameservers {
        domain: String,
        nameservers: Vec<String>,
    },
}

impl Call {
    /// Whether the call changes provider state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::CreateZone { .. } | Call::ChangeRecords { .. } | Call::UpdateNameservers { .. }
        )
    }
}

#[derive(Default)]
struct MockState {
    /// Listing pages, served in order
    pages: Vec<Vec<HostedZoneSummary>>,
    /// Name servers per zone id (short form)
    zone_name_servers: Vec<(String, Vec<String>)>,
    /// Registrar delegation
    registrar_name_servers: Vec<String>,
    /// Whether the record change fails
    fail_record_change: bool,
    /// Whether zone creation fails
    fail_zone_creation: bool,
    /// Whether the registrar read fails
    fail_domain_detail: bool,
    /// Name servers assigned to created zones
    assigned_name_servers: Vec<String>,
    calls: Vec<Call>,
    created: usize,
}

/// A mock provider implementing both the hosted zone and registrar sides
///
/// Clones share state, so a test can keep one handle for assertions and
/// hand another to the provisioner.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    pub fn new() -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().assigned_name_servers =
            ASSIGNED_NAME_SERVERS.iter().map(|s| s.to_string()).collect();
        mock
    }

    /// Serve a single listing page
    pub fn with_zones(self, zones: Vec<HostedZoneSummary>) -> Self {
        self.state.lock().unwrap().pages = vec![zones];
        self
    }

    /// Serve several listing pages, each but the last pointing at the next
    pub fn with_pages(self, pages: Vec<Vec<HostedZoneSummary>>) -> Self {
        self.state.lock().unwrap().pages = pages;
        self
    }

    pub fn with_zone_name_servers(self, short_id: &str, names: &[&str]) -> Self {
        self.state.lock().unwrap().zone_name_servers.push((
            short_id.to_string(),
            names.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn with_registrar_name_servers(self, names: &[&str]) -> Self {
        self.state.lock().unwrap().registrar_name_servers =
            names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_assigned_name_servers(self, names: &[&str]) -> Self {
        self.state.lock().unwrap().assigned_name_servers =
            names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_record_change(self) -> Self {
        self.state.lock().unwrap().fail_record_change = true;
        self
    }

    pub fn failing_zone_creation(self) -> Self {
        self.state.lock().unwrap().fail_zone_creation = true;
        self
    }

    pub fn failing_domain_detail(self) -> Self {
        self.state.lock().unwrap().fail_domain_detail = true;
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn create_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::CreateZone { .. }))
            .collect()
    }

    pub fn nameserver_updates(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpdateNameservers { nameservers, .. } => Some(nameservers),
                _ => None,
            })
            .collect()
    }

    pub fn record_changes(&self) -> Vec<(String, ChangeBatch)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ChangeRecords { id, batch } => Some((id, batch)),
                _ => None,
            })
            .collect()
    }

    /// Wrap this mock as a provider backend
    pub fn provider(&self) -> Provider {
        let shared = Arc::new(self.clone());
        Provider::new(shared.clone(), shared)
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl HostedZoneApi for MockProvider {
    async fn list_hosted_zones_by_name(
        &self,
        dns_name: &str,
        page: Option<&PageToken>,
    ) -> Result<HostedZonePage> {
        self.record(Call::ListZones {
            dns_name: dns_name.to_string(),
            page: page.map(|p| p.dns_name.clone()),
        });

        let state = self.state.lock().unwrap();
        let index = match page {
            None => 0,
            Some(token) => token
                .dns_name
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::invalid_input("bad page token"))?,
        };

        let zones = state.pages.get(index).cloned().unwrap_or_default();
        let next = if index + 1 < state.pages.len() {
            Some(PageToken {
                dns_name: format!("page-{}", index + 1),
                hosted_zone_id: None,
            })
        } else {
            None
        };

        Ok(HostedZonePage { zones, next })
    }

    async fn create_hosted_zone(
        &self,
        name: &str,
        caller_reference: &CallerReference,
    ) -> Result<CreatedHostedZone> {
        self.record(Call::CreateZone {
            name: name.to_string(),
            caller_reference: caller_reference.to_string(),
        });

        let mut state = self.state.lock().unwrap();
        if state.fail_zone_creation {
            return Err(Error::provider("mock", "HostedZoneAlreadyExists"));
        }

        state.created += 1;
        let short_id = format!("ZNEW{}", state.created);
        let name_servers = state.assigned_name_servers.clone();
        state
            .zone_name_servers
            .push((short_id.clone(), name_servers.clone()));

        Ok(CreatedHostedZone {
            zone: zone(&short_id, name),
            name_servers,
            change: ChangeInfo {
                id: "/change/CZONE".to_string(),
                status: "PENDING".to_string(),
                submitted_at: None,
            },
        })
    }

    async fn get_hosted_zone(&self, id: &HostedZoneId) -> Result<HostedZoneDetail> {
        self.record(Call::GetZone {
            id: id.short().to_string(),
        });

        let state = self.state.lock().unwrap();
        let name_servers = state
            .zone_name_servers
            .iter()
            .find(|(short, _)| short == id.short())
            .map(|(_, names)| names.clone())
            .ok_or_else(|| Error::not_found(format!("NoSuchHostedZone: {}", id)))?;

        Ok(HostedZoneDetail {
            zone: zone(id.short(), "example.com"),
            name_servers,
        })
    }

    async fn change_resource_record_sets(
        &self,
        id: &HostedZoneId,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo> {
        self.record(Call::ChangeRecords {
            id: id.short().to_string(),
            batch: batch.clone(),
        });

        if self.state.lock().unwrap().fail_record_change {
            return Err(Error::provider("mock", "InvalidChangeBatch"));
        }

        Ok(ChangeInfo {
            id: "/change/C2682N5HXP0BZ4".to_string(),
            status: "PENDING".to_string(),
            submitted_at: Some("2024-01-15T08:00:00.000Z".to_string()),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[async_trait]
impl RegistrarApi for MockProvider {
    async fn get_domain_detail(&self, domain: &str) -> Result<DomainDetail> {
        self.record(Call::GetDomain {
            domain: domain.to_string(),
        });

        let state = self.state.lock().unwrap();
        if state.fail_domain_detail {
            return Err(Error::provider(
                "mock",
                "InvalidInput: Domain example.com not found in account",
            ));
        }

        Ok(DomainDetail {
            domain_name: domain.to_string(),
            nameservers: state
                .registrar_name_servers
                .iter()
                .map(Nameserver::named)
                .collect(),
        })
    }

    async fn update_domain_nameservers(
        &self,
        domain: &str,
        nameservers: &[Nameserver],
    ) -> Result<String> {
        self.record(Call::UpdateNameservers {
            domain: domain.to_string(),
            nameservers: nameservers.iter().map(|ns| ns.name.clone()).collect(),
        });

        let mut state = self.state.lock().unwrap();
        state.registrar_name_servers = nameservers.iter().map(|ns| ns.name.clone()).collect();
        Ok("op-0123456789".to_string())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal ProvisionConfig for testing
pub fn minimal_config(domain: &str, public_ip: &str) -> ProvisionConfig {
    ProvisionConfig::new(
        domain,
        public_ip,
        ProviderConfig::route53("AKIDEXAMPLE", "test-secret"),
    )
}
