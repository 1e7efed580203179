//! Core traits for the provisioning flow
//!
//! This module defines the abstract interfaces provider backends implement.
//!
//! - [`HostedZoneApi`]: Hosted zone listing, creation, detail and record changes
//! - [`RegistrarApi`]: Registrar delegation read and update
//! - [`ProviderFactory`]: Construct both halves of a backend from configuration

pub mod hosted_zone;
pub mod registrar;

pub use hosted_zone::HostedZoneApi;
pub use registrar::RegistrarApi;

use std::sync::Arc;

/// A provider backend: the hosted-zone side and the registrar side
///
/// Both halves usually come from the same cloud account but are separate
/// APIs (and, for some providers, separate regions).
#[derive(Clone)]
pub struct Provider {
    pub zones: Arc<dyn HostedZoneApi>,
    pub registrar: Arc<dyn RegistrarApi>,
}

impl Provider {
    pub fn new(zones: Arc<dyn HostedZoneApi>, registrar: Arc<dyn RegistrarApi>) -> Self {
        Self { zones, registrar }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("zones", &self.zones.provider_name())
            .field("registrar", &self.registrar.provider_name())
            .finish()
    }
}

/// Helper trait for constructing providers from configuration
pub trait ProviderFactory: Send + Sync {
    /// Create a Provider from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    fn create(&self, config: &crate::config::ProviderConfig) -> Result<Provider, crate::Error>;
}
