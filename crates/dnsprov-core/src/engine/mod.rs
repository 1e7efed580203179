//! Provisioning engine
//!
//! The Provisioner is responsible for:
//! - Locating the hosted zone for the domain (creating it when absent)
//! - Reading the zone-side and registrar-side name servers
//! - Pointing the registrar at the zone's name servers when they differ
//! - Upserting the domain's address record
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────┐
//!            │ Provisioner  │
//!            └──────────────┘
//!             plan │ apply
//!           (reads)│(writes)
//!          ┌───────┴───────┐
//!          ▼               ▼
//! ┌───────────────┐ ┌──────────────┐
//! │ HostedZoneApi │ │ RegistrarApi │
//! └───────────────┘ └──────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. Locate zone (paginated listing by name)
//! 2. Create zone if absent
//! 3. Read both name-server sets
//! 4. Reconcile; update the registrar on mismatch
//! 5. Upsert the address record
//!
//! Every provider call is made once and awaited before the next one.
//! Only the record upsert handles its own failure; every other failure
//! ends the run as is, leaving already-applied changes in place.

pub mod plan;

pub use plan::{NameServerPlan, ProvisionPlan, ZoneAction};

use crate::config::{ProvisionConfig, RecordSettings};
use crate::error::{Error, Result};
use crate::model::{
    AddressRecord, CallerReference, ChangeBatch, ChangeInfo, HostedZoneId, Nameserver, ZoneLookup,
};
use crate::nameservers::{self, NameServerDecision, NameServerSet};
use crate::traits::{HostedZoneApi, Provider, RegistrarApi};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Upper bound on hosted zone listing pages followed by the zone lookup
pub const MAX_ZONE_PAGES: usize = 100;

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Zone the record was written to
    pub zone_id: HostedZoneId,
    /// Whether the zone was created by this run
    pub zone_created: bool,
    /// Reconciliation outcome
    pub name_servers: NameServerDecision,
    /// Registrar operation id, when the delegation was updated
    pub registrar_operation: Option<String>,
    /// Change tracking info of the record upsert
    pub change: ChangeInfo,
}

/// Single-domain provisioning engine
///
/// ## Lifecycle
///
/// 1. Create with [`Provisioner::new()`]
/// 2. Either [`Provisioner::run()`], or [`Provisioner::plan()`] followed by
///    [`Provisioner::apply()`]
/// 3. Drop
pub struct Provisioner {
    /// Hosted zone side of the provider
    zones: Arc<dyn HostedZoneApi>,

    /// Registrar side of the provider
    registrar: Arc<dyn RegistrarApi>,

    /// Domain being provisioned
    domain: String,

    /// Target of the address record
    public_ip: String,

    /// Address record settings
    record: RecordSettings,
}

impl Provisioner {
    /// Create a new provisioner
    ///
    /// # Parameters
    ///
    /// - `provider`: Provider backend
    /// - `config`: Provisioning configuration (validated here)
    pub fn new(provider: Provider, config: &ProvisionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            zones: provider.zones,
            registrar: provider.registrar,
            domain: config.domain.clone(),
            public_ip: config.public_ip.clone(),
            record: config.record.clone(),
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The address record this provisioner writes
    pub fn address_record(&self) -> AddressRecord {
        AddressRecord::new(&self.domain, &self.public_ip, self.record.ttl)
    }

    /// Run the whole flow: plan, then apply
    pub async fn run(&self) -> Result<ProvisionReport> {
        let plan = self.plan().await?;
        self.apply(plan).await
    }

    /// Compute the intended changes without mutating anything
    pub async fn plan(&self) -> Result<ProvisionPlan> {
        let lookup = self.locate_zone().await?;

        let registrar_name_servers = self.registrar_name_servers().await?;

        let (zone, name_servers) = match lookup.id {
            Some(id) if lookup.found => {
                info!("Hosted zone already exists for domain {}", self.domain);
                info!("Hosted zone id: {}", id);

                let zone_name_servers = self.zone_name_servers(&id).await?;
                let decision =
                    nameservers::reconcile(id.as_str(), &zone_name_servers, &registrar_name_servers)?;

                (
                    ZoneAction::UseExisting { id },
                    NameServerPlan::Decided(decision),
                )
            }
            _ => {
                info!("Hosted zone does not exist yet for domain {}", self.domain);
                (ZoneAction::Create, NameServerPlan::AfterZoneCreation)
            }
        };

        Ok(ProvisionPlan {
            domain: self.domain.clone(),
            zone,
            registrar_name_servers,
            name_servers,
            record: self.address_record(),
        })
    }

    /// Execute a plan produced by [`Provisioner::plan()`]
    pub async fn apply(&self, plan: ProvisionPlan) -> Result<ProvisionReport> {
        if plan.domain != self.domain {
            return Err(Error::invalid_input(format!(
                "Plan is for {}, provisioner is for {}",
                plan.domain, self.domain
            )));
        }

        let (zone_id, zone_created) = match plan.zone {
            ZoneAction::UseExisting { id } => (id, false),
            ZoneAction::Create => (self.provision_zone().await?, true),
        };

        let decision = match plan.name_servers {
            NameServerPlan::Decided(decision) => decision,
            NameServerPlan::AfterZoneCreation => {
                let zone_name_servers = self.zone_name_servers(&zone_id).await?;
                nameservers::reconcile(
                    zone_id.as_str(),
                    &zone_name_servers,
                    &plan.registrar_name_servers,
                )?
            }
        };

        let registrar_operation = match &decision {
            NameServerDecision::InSync => {
                info!("Domain registrar & hosted zone name servers are same. No update required!");
                None
            }
            NameServerDecision::Update { desired, .. } => {
                Some(self.push_name_servers(desired).await?)
            }
        };

        info!(
            "Creating address record in hosted zone using {} and {}",
            plan.record.name, plan.record.value
        );
        let change = self.upsert_address_record(&zone_id, &plan.record).await?;

        info!("Done!");
        Ok(ProvisionReport {
            zone_id,
            zone_created,
            name_servers: decision,
            registrar_operation,
            change,
        })
    }

    /// Find the hosted zone for the domain
    ///
    /// Follows listing pages until the domain is found or the listing
    /// ends. A zone matches when its name, without the trailing root dot,
    /// equals the domain exactly.
    pub async fn locate_zone(&self) -> Result<ZoneLookup> {
        let mut token = None;

        for page_number in 1..=MAX_ZONE_PAGES {
            let page = self
                .zones
                .list_hosted_zones_by_name(&self.domain, token.as_ref())
                .await?;
            debug!(page = page_number, zones = ?page.zones, "Hosted zone listing page");

            if let Some(zone) = page.zones.iter().find(|z| z.matches_domain(&self.domain)) {
                return Ok(ZoneLookup::found(zone.id.clone()));
            }

            match page.next {
                Some(next) => token = Some(next),
                None => return Ok(ZoneLookup::missing()),
            }
        }

        Err(Error::provider(
            self.zones.provider_name(),
            format!(
                "Hosted zone listing for {} did not end after {} pages",
                self.domain, MAX_ZONE_PAGES
            ),
        ))
    }

    /// Create the hosted zone with a caller reference unique to this call
    pub async fn provision_zone(&self) -> Result<HostedZoneId> {
        let caller_reference = CallerReference::generate();
        debug!("Creating hosted zone with caller reference {}", caller_reference);

        let created = self
            .zones
            .create_hosted_zone(&self.domain, &caller_reference)
            .await?;
        debug!(created = ?created, "Hosted zone creation response");

        if created.zone.id.as_str().is_empty() {
            return Err(Error::provider(
                self.zones.provider_name(),
                "Hosted zone creation returned an empty identifier",
            ));
        }

        info!("Hosted zone created: {}", created.zone.id);
        Ok(created.zone.id)
    }

    /// Name servers assigned to a hosted zone
    pub async fn zone_name_servers(&self, id: &HostedZoneId) -> Result<NameServerSet> {
        let detail = self.zones.get_hosted_zone(id).await?;
        debug!(detail = ?detail, "Hosted zone detail");

        let set = NameServerSet::new(detail.name_servers);
        info!("Hosted Zone Name servers: {}", set);
        Ok(set)
    }

    /// Name servers the registrar currently delegates the domain to
    pub async fn registrar_name_servers(&self) -> Result<NameServerSet> {
        let detail = self.registrar.get_domain_detail(&self.domain).await?;
        debug!(detail = ?detail, "Domain registrar detail");

        let set = NameServerSet::new(detail.nameserver_names());
        info!("Domain registrar name servers: {}", set);
        Ok(set)
    }

    /// Point the registrar at `desired`
    ///
    /// Pushes every name server in the set, whatever their number.
    pub async fn push_name_servers(&self, desired: &NameServerSet) -> Result<String> {
        if desired.is_empty() {
            return Err(Error::invalid_input(format!(
                "Refusing to delegate {} to an empty name server set",
                self.domain
            )));
        }

        info!("Updating domain registrar name servers ...");
        let nameservers: Vec<Nameserver> =
            desired.names().iter().map(Nameserver::named).collect();

        let operation = self
            .registrar
            .update_domain_nameservers(&self.domain, &nameservers)
            .await?;

        info!("Domain registrar name servers updated (operation {})", operation);
        Ok(operation)
    }

    /// Upsert the address record into the zone
    ///
    /// Any failure here is logged and returned as [`Error::RecordUpsert`].
    pub async fn upsert_address_record(
        &self,
        zone_id: &HostedZoneId,
        record: &AddressRecord,
    ) -> Result<ChangeInfo> {
        let batch = ChangeBatch::upsert(record.clone(), self.record.comment.clone());

        let result = self
            .zones
            .change_resource_record_sets(zone_id, &batch)
            .await
            .and_then(|change| {
                if change.id.is_empty() {
                    Err(Error::provider(
                        self.zones.provider_name(),
                        "Record change returned an empty change id",
                    ))
                } else {
                    Ok(change)
                }
            });

        match result {
            Ok(change) => {
                info!("Change id: {}", change.id);
                Ok(change)
            }
            Err(e) => {
                error!("Unable to create address record in hosted zone");
                error!("{}", e);
                Err(Error::record_upsert(&self.domain, &e))
            }
        }
    }
}
