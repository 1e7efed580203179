//! Provisioning plan
//!
//! A plan is the read-only half of a run: what exists, what the registrar
//! delegates to, and which mutations [`Provisioner::apply`] would perform.
//!
//! [`Provisioner::apply`]: super::Provisioner::apply

use crate::model::{AddressRecord, HostedZoneId};
use crate::nameservers::{NameServerDecision, NameServerSet};
use std::fmt;

/// What happens to the hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneAction {
    /// The zone exists and is used as is
    UseExisting { id: HostedZoneId },
    /// No zone exists; one will be created
    Create,
}

/// What happens to the registrar delegation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameServerPlan {
    /// Decided against an existing zone's name servers
    Decided(NameServerDecision),
    /// The zone's name servers are only known once it has been created
    AfterZoneCreation,
}

/// The full set of intended changes for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub domain: String,
    pub zone: ZoneAction,
    /// Name servers delegated at the registrar when the plan was made
    pub registrar_name_servers: NameServerSet,
    pub name_servers: NameServerPlan,
    /// The address record that will be upserted
    pub record: AddressRecord,
}

impl ProvisionPlan {
    /// Number of mutating provider calls `apply` will make at most
    pub fn mutation_count(&self) -> usize {
        let zone = usize::from(matches!(self.zone, ZoneAction::Create));
        let delegation = match &self.name_servers {
            NameServerPlan::Decided(decision) => usize::from(decision.needs_update()),
            NameServerPlan::AfterZoneCreation => 1,
        };
        // The record upsert always runs.
        zone + delegation + 1
    }
}

impl fmt::Display for ProvisionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Provisioning plan for {}:", self.domain)?;

        match &self.zone {
            ZoneAction::UseExisting { id } => writeln!(f, "  hosted zone: keep {}", id)?,
            ZoneAction::Create => writeln!(f, "  hosted zone: create")?,
        }

        match &self.name_servers {
            NameServerPlan::Decided(NameServerDecision::InSync) => writeln!(
                f,
                "  registrar name servers: in sync {}",
                self.registrar_name_servers
            )?,
            NameServerPlan::Decided(NameServerDecision::Update { current, desired }) => writeln!(
                f,
                "  registrar name servers: update {} -> {}",
                current, desired
            )?,
            NameServerPlan::AfterZoneCreation => writeln!(
                f,
                "  registrar name servers: compare {} with the new zone after creation",
                self.registrar_name_servers
            )?,
        }

        write!(
            f,
            "  address record: upsert {} {} {} (ttl {})",
            self.record.name,
            self.record.record_type(),
            self.record.value,
            self.record.ttl
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(zone: ZoneAction, name_servers: NameServerPlan) -> ProvisionPlan {
        ProvisionPlan {
            domain: "example.com".to_string(),
            zone,
            registrar_name_servers: NameServerSet::new(["ns1", "ns2"]),
            name_servers,
            record: AddressRecord::new("example.com", "203.0.113.5", 60),
        }
    }

    #[test]
    fn test_mutation_count_in_sync() {
        let p = plan(
            ZoneAction::UseExisting {
                id: HostedZoneId::new("/hostedzone/Z1"),
            },
            NameServerPlan::Decided(NameServerDecision::InSync),
        );
        assert_eq!(p.mutation_count(), 1);
    }

    #[test]
    fn test_mutation_count_new_zone() {
        let p = plan(ZoneAction::Create, NameServerPlan::AfterZoneCreation);
        assert_eq!(p.mutation_count(), 3);
    }

    #[test]
    fn test_display_mentions_every_step() {
        let p = plan(
            ZoneAction::UseExisting {
                id: HostedZoneId::new("/hostedzone/Z1"),
            },
            NameServerPlan::Decided(NameServerDecision::Update {
                current: NameServerSet::new(["ns1", "ns2"]),
                desired: NameServerSet::new(["ns-1.awsdns-01.org"]),
            }),
        );

        let text = p.to_string();
        assert!(text.contains("keep /hostedzone/Z1"));
        assert!(text.contains("update [ns1, ns2] -> [ns-1.awsdns-01.org]"));
        assert!(text.contains("upsert example.com A 203.0.113.5 (ttl 60)"));
    }
}
