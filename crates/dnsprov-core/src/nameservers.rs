//! Name-server reconciliation
//!
//! The zone side and the registrar side each produce a list of host names.
//! The lists are compared as unordered sets; when they differ, the zone's
//! list is what the registrar should delegate to.

use crate::error::{Error, Result};
use std::fmt;

/// An unordered set of name-server host names
///
/// Two sets are equal when their sorted sequences are equal. The original
/// order is kept for display and for the registrar update.
#[derive(Debug, Clone, Default)]
pub struct NameServerSet {
    names: Vec<String>,
}

impl NameServerSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Host names in the order they were supplied
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Host names sorted lexicographically
    pub fn sorted(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.names.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
    }
}

impl PartialEq for NameServerSet {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for NameServerSet {}

impl fmt::Display for NameServerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names.join(", "))
    }
}

/// What the registrar delegation needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameServerDecision {
    /// Registrar already delegates to the zone's name servers
    InSync,
    /// Registrar must be pointed at `desired`
    Update {
        current: NameServerSet,
        desired: NameServerSet,
    },
}

impl NameServerDecision {
    pub fn needs_update(&self) -> bool {
        matches!(self, NameServerDecision::Update { .. })
    }
}

/// Decide whether the registrar delegation must change
///
/// # Parameters
///
/// - `zone_id`: Zone the `zone_side` set belongs to (for the error message)
/// - `zone_side`: Name servers assigned to the hosted zone
/// - `registrar_side`: Name servers currently delegated at the registrar
///
/// # Errors
///
/// Returns [`Error::EmptyDelegation`] if the zone has no name servers;
/// pointing the registrar at an empty set would take the domain offline.
pub fn reconcile(
    zone_id: &str,
    zone_side: &NameServerSet,
    registrar_side: &NameServerSet,
) -> Result<NameServerDecision> {
    if zone_side.is_empty() {
        return Err(Error::EmptyDelegation {
            zone_id: zone_id.to_string(),
        });
    }

    if zone_side == registrar_side {
        return Ok(NameServerDecision::InSync);
    }

    Ok(NameServerDecision::Update {
        current: registrar_side.clone(),
        desired: zone_side.clone(),
    })
}
