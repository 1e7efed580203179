// # dnsprov-core
//
// Core library for single-domain DNS provisioning.
//
// ## Architecture Overview
//
// This library provides the provider-independent part of the flow:
// - **HostedZoneApi**: Trait for the provider's hosted-zone operations
// - **RegistrarApi**: Trait for the provider's domain-registrar operations
// - **NameServerSet**: Order-insensitive name-server comparison (the reconciler)
// - **Provisioner**: Plans and applies zone creation, delegation sync and the
//   address record upsert
// - **ProviderRegistry**: Plugin-based registry for provider backends
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Provider I/O lives behind traits, decisions live here
// 2. **Plan before Apply**: Every mutation is computed first and can be previewed
// 3. **Plugin-Based**: Providers are registered by name, no hard-coded if-else
// 4. **Library-First**: The binary is a thin layer over this crate
// 5. **Single Attempt**: No retries or backoff; every call is made once

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod nameservers;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{ProviderConfig, ProvisionConfig, RecordSettings};
pub use engine::{ProvisionPlan, ProvisionReport, Provisioner};
pub use error::{Error, Result};
pub use model::{AddressRecord, CallerReference, HostedZoneId};
pub use nameservers::{NameServerDecision, NameServerSet};
pub use registry::ProviderRegistry;
pub use traits::{HostedZoneApi, Provider, ProviderFactory, RegistrarApi};
