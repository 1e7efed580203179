// # Registrar Trait
//
// Defines the interface to a provider's domain registrar, which owns the
// delegation (the name servers the parent zone points at).

use crate::model::{DomainDetail, Nameserver};
use async_trait::async_trait;

/// Trait for domain registrar API implementations
///
/// The domain is assumed to be registered already; a missing registration
/// surfaces as an error from [`RegistrarApi::get_domain_detail`].
#[async_trait]
pub trait RegistrarApi: Send + Sync {
    /// Get the registrar's record for `domain`, including its name servers
    async fn get_domain_detail(&self, domain: &str) -> Result<DomainDetail, crate::Error>;

    /// Replace the delegated name servers of `domain`
    ///
    /// # Returns
    ///
    /// The registrar operation identifier.
    async fn update_domain_nameservers(
        &self,
        domain: &str,
        nameservers: &[Nameserver],
    ) -> Result<String, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
