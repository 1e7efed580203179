//! Configuration types for the provisioning flow
//!
//! This module defines all configuration structures used throughout the crate.

use crate::model::DEFAULT_RECORD_TTL;
use serde::{Deserialize, Serialize};

/// Region the Route 53 Domains API is served from
pub const DEFAULT_REGISTRAR_REGION: &str = "us-east-1";

/// Comment attached to the record change batch
pub const DEFAULT_CHANGE_COMMENT: &str = "Address record managed by dnsprov";

/// Largest TTL the provider accepts
const MAX_RECORD_TTL: u32 = 2_147_483_647;

/// Main provisioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Domain to provision (e.g., "example.com")
    pub domain: String,

    /// IP address the address record should point at
    pub public_ip: String,

    /// Address record settings
    #[serde(default)]
    pub record: RecordSettings,

    /// Provider backend configuration
    pub provider: ProviderConfig,

    /// Plan only, never mutate provider state
    #[serde(default)]
    pub dry_run: bool,
}

impl ProvisionConfig {
    /// Create a configuration with default record settings
    pub fn new(
        domain: impl Into<String>,
        public_ip: impl Into<String>,
        provider: ProviderConfig,
    ) -> Self {
        Self {
            domain: domain.into(),
            public_ip: public_ip.into(),
            record: RecordSettings::default(),
            provider,
            dry_run: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.is_empty() {
            return Err(crate::Error::config("Domain name is required"));
        }
        if self.domain.len() > 253 {
            return Err(crate::Error::config(format!(
                "Domain name too long: {} chars (max 253)",
                self.domain.len()
            )));
        }
        if self.public_ip.is_empty() {
            return Err(crate::Error::config("Public IP is required"));
        }

        self.record.validate()?;
        self.provider.validate()?;

        Ok(())
    }
}

/// Address record settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSettings {
    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Comment attached to the change batch
    #[serde(default = "default_comment")]
    pub comment: Option<String>,
}

impl RecordSettings {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.ttl == 0 || self.ttl > MAX_RECORD_TTL {
            return Err(crate::Error::config(format!(
                "Record TTL must be between 1 and {}. Got: {}",
                MAX_RECORD_TTL, self.ttl
            )));
        }
        Ok(())
    }
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            comment: default_comment(),
        }
    }
}

fn default_ttl() -> u32 {
    DEFAULT_RECORD_TTL
}

fn default_comment() -> Option<String> {
    Some(DEFAULT_CHANGE_COMMENT.to_string())
}

fn default_registrar_region() -> String {
    DEFAULT_REGISTRAR_REGION.to_string()
}

/// Provider backend configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// AWS Route 53 hosted zones with Route 53 Domains as registrar
    Route53 {
        /// Access key ID
        access_key_id: String,
        /// Secret access key
        /// ⚠️ NEVER log this value
        secret_access_key: String,
        /// Session token for temporary credentials
        session_token: Option<String>,
        /// Region of the registrar API
        #[serde(default = "default_registrar_region")]
        registrar_region: String,
        /// Override for the hosted zone API base URL
        route53_endpoint: Option<String>,
        /// Override for the registrar API base URL
        domains_endpoint: Option<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Route 53 configuration with default region and endpoints
    pub fn route53(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        ProviderConfig::Route53 {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            registrar_region: default_registrar_region(),
            route53_endpoint: None,
            domains_endpoint: None,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                registrar_region,
                ..
            } => {
                if access_key_id.is_empty() {
                    return Err(crate::Error::config("AWS access key ID cannot be empty"));
                }
                if secret_access_key.is_empty() {
                    return Err(crate::Error::config("AWS secret access key cannot be empty"));
                }
                if registrar_region.is_empty() {
                    return Err(crate::Error::config("Registrar region cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Route53 { .. } => "route53",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Custom Debug implementation that hides credentials
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Route53 {
                access_key_id,
                session_token,
                registrar_region,
                route53_endpoint,
                domains_endpoint,
                ..
            } => f
                .debug_struct("Route53")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<REDACTED>")
                .field("session_token", &session_token.as_ref().map(|_| "<REDACTED>"))
                .field("registrar_region", registrar_region)
                .field("route53_endpoint", route53_endpoint)
                .field("domains_endpoint", domains_endpoint)
                .finish(),
            ProviderConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}
