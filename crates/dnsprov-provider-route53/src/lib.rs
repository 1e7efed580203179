// # Route 53 Provider
//
// This crate provides the AWS backend for dnsprov: Route 53 for the hosted
// zone and Route 53 Domains for the registrar delegation.
//
// ## Behaviour
//
// - One signed HTTP request per trait call
// - Full error propagation to the engine (no retry, no backoff)
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
//   and for throttling codes returned with status 400
//
// ## Security Requirements
//
// - The secret access key and session token NEVER appear in logs
// - Credentials come from configuration (the binary reads them from the
//   environment); they are never read from disk by this crate
//
// ## API Reference
//
// - Route 53 API 2013-04-01 (REST/XML), global endpoint, signed for `us-east-1`
//   - List zones: GET `/2013-04-01/hostedzonesbyname?dnsname=...&hostedzoneid=...`
//   - Create zone: POST `/2013-04-01/hostedzone`
//   - Get zone: GET `/2013-04-01/hostedzone/:id`
//   - Change records: POST `/2013-04-01/hostedzone/:id/rrset/`
// - Route 53 Domains API 2014-05-15 (JSON 1.1), regional endpoint
//   - `Route53Domains_v20140515.GetDomainDetail`
//   - `Route53Domains_v20140515.UpdateDomainNameservers`

mod http;
mod sign;
mod types;

use async_trait::async_trait;
use dnsprov_core::config::ProviderConfig;
use dnsprov_core::model::{
    CallerReference, ChangeBatch, ChangeInfo, CreatedHostedZone, DomainDetail, HostedZoneDetail,
    HostedZoneId, HostedZonePage, Nameserver, PageToken,
};
use dnsprov_core::{Error, HostedZoneApi, Provider, ProviderFactory, RegistrarApi, Result};
use reqwest::Method;
use std::sync::Arc;

use crate::http::{DEFAULT_HTTP_TIMEOUT, ErrorFormat, SignedClient};
use crate::types::{
    ChangeResourceRecordSetsRequest, ChangeResourceRecordSetsResponse, CreateHostedZoneRequest,
    CreateHostedZoneResponse, GetDomainDetailRequest, GetDomainDetailResponse,
    GetHostedZoneResponse, ListHostedZonesByNameResponse, UpdateDomainNameserversRequest,
    UpdateDomainNameserversResponse, from_xml,
};

/// Route 53 global endpoint
pub const ROUTE53_ENDPOINT: &str = "https://route53.amazonaws.com";

/// Route 53 API version path prefix
const API_VERSION: &str = "/2013-04-01";

/// Region the global Route 53 endpoint is signed for
const ROUTE53_SIGNING_REGION: &str = "us-east-1";

const ROUTE53_SERVICE: &str = "route53";
const DOMAINS_SERVICE: &str = "route53domains";

/// Target prefix of the Route 53 Domains JSON protocol
const DOMAINS_TARGET_PREFIX: &str = "Route53Domains_v20140515";
const DOMAINS_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Route 53 Domains regional endpoint
pub fn domains_endpoint(region: &str) -> String {
    format!("https://route53domains.{}.amazonaws.com", region)
}

/// AWS access credentials
///
/// The Debug implementation does NOT expose the secret or the session token.
#[derive(Clone)]
pub struct Credentials {
    pub(crate) access_key_id: String,
    /// ⚠️ NEVER log this value
    pub(crate) secret_access_key: String,
    /// ⚠️ NEVER log this value
    pub(crate) session_token: Option<String>,
}

impl Credentials {
    /// Create credentials, failing fast on empty keys
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Result<Self> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();

        if access_key_id.is_empty() {
            return Err(Error::config("AWS access key ID cannot be empty"));
        }
        if secret_access_key.is_empty() {
            return Err(Error::config("AWS secret access key cannot be empty"));
        }

        Ok(Self {
            access_key_id,
            secret_access_key,
            // An empty token is the same as no token
            session_token: session_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// AWS provider: Route 53 hosted zones and Route 53 Domains registrar
///
/// Stateless and single-shot. Sequencing, reconciliation and the decision
/// whether anything needs changing are owned by the engine.
#[derive(Debug)]
pub struct Route53Provider {
    route53: SignedClient,
    domains: SignedClient,
}

impl Route53Provider {
    /// Create a provider against the public AWS endpoints
    ///
    /// # Parameters
    ///
    /// - `credentials`: Access key pair, optionally with a session token
    /// - `registrar_region`: Region of the Route 53 Domains endpoint
    pub fn new(credentials: Credentials, registrar_region: &str) -> Result<Self> {
        Self::with_endpoints(credentials, registrar_region, None, None)
    }

    /// Create a provider, overriding either endpoint
    ///
    /// Overrides are used for testing against local mocks and for
    /// API-compatible gateways.
    pub fn with_endpoints(
        credentials: Credentials,
        registrar_region: &str,
        route53_endpoint: Option<&str>,
        domains_endpoint_override: Option<&str>,
    ) -> Result<Self> {
        if registrar_region.is_empty() {
            return Err(Error::config("Registrar region cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let route53 = SignedClient::new(
            client.clone(),
            credentials.clone(),
            route53_endpoint.unwrap_or(ROUTE53_ENDPOINT),
            ROUTE53_SIGNING_REGION,
            ROUTE53_SERVICE,
            ErrorFormat::Xml,
        );
        let domains = SignedClient::new(
            client,
            credentials,
            domains_endpoint_override
                .map(str::to_string)
                .unwrap_or_else(|| domains_endpoint(registrar_region)),
            registrar_region,
            DOMAINS_SERVICE,
            ErrorFormat::Json,
        );

        tracing::debug!(
            "Route 53 endpoints: zones={} domains={}",
            route53.endpoint(),
            domains.endpoint()
        );

        Ok(Self { route53, domains })
    }

    /// Share this provider as both halves of a [`Provider`]
    pub fn into_provider(self) -> Provider {
        let shared = Arc::new(self);
        Provider::new(shared.clone(), shared)
    }

    async fn route53_xml(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<String> {
        let path = format!("{}{}", API_VERSION, path);
        match body {
            Some(body) => {
                self.route53
                    .send(
                        method,
                        &path,
                        query,
                        &[("content-type", "application/xml")],
                        body.into_bytes(),
                    )
                    .await
            }
            None => self.route53.send(method, &path, query, &[], Vec::new()).await,
        }
    }

    async fn domains_call<T: serde::Serialize>(&self, operation: &str, body: &T) -> Result<String> {
        let target = format!("{}.{}", DOMAINS_TARGET_PREFIX, operation);
        let payload = serde_json::to_vec(body)?;
        self.domains
            .send(
                Method::POST,
                "/",
                &[],
                &[
                    ("content-type", DOMAINS_CONTENT_TYPE),
                    ("x-amz-target", target.as_str()),
                ],
                payload,
            )
            .await
    }
}

#[async_trait]
impl HostedZoneApi for Route53Provider {
    async fn list_hosted_zones_by_name(
        &self,
        dns_name: &str,
        page: Option<&PageToken>,
    ) -> Result<HostedZonePage> {
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(2);
        match page {
            Some(token) => {
                query.push(("dnsname", token.dns_name.as_str()));
                if let Some(id) = token.hosted_zone_id.as_deref() {
                    query.push(("hostedzoneid", id));
                }
            }
            None => query.push(("dnsname", dns_name)),
        }

        let body = self
            .route53_xml(Method::GET, "/hostedzonesbyname", &query, None)
            .await?;
        let page = from_xml::<ListHostedZonesByNameResponse>(&body)?.into_page()?;

        tracing::debug!(
            "Listed {} hosted zones (more: {})",
            page.zones.len(),
            page.next.is_some()
        );
        Ok(page)
    }

    async fn create_hosted_zone(
        &self,
        name: &str,
        caller_reference: &CallerReference,
    ) -> Result<CreatedHostedZone> {
        let request = CreateHostedZoneRequest::new(name, caller_reference.as_str()).to_xml()?;

        let body = self
            .route53_xml(Method::POST, "/hostedzone", &[], Some(request))
            .await?;
        let created: CreatedHostedZone = from_xml::<CreateHostedZoneResponse>(&body)?.into();

        tracing::debug!("Created hosted zone {} ({})", created.zone.id, created.change.status);
        Ok(created)
    }

    async fn get_hosted_zone(&self, id: &HostedZoneId) -> Result<HostedZoneDetail> {
        let path = format!("/hostedzone/{}", id.short());
        let body = self.route53_xml(Method::GET, &path, &[], None).await?;
        Ok(from_xml::<GetHostedZoneResponse>(&body)?.into())
    }

    async fn change_resource_record_sets(
        &self,
        id: &HostedZoneId,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo> {
        let path = format!("/hostedzone/{}/rrset/", id.short());
        let request = ChangeResourceRecordSetsRequest::from(batch).to_xml()?;

        let body = self
            .route53_xml(Method::POST, &path, &[], Some(request))
            .await?;
        Ok(from_xml::<ChangeResourceRecordSetsResponse>(&body)?
            .change_info
            .into())
    }

    fn provider_name(&self) -> &'static str {
        ROUTE53_SERVICE
    }
}

#[async_trait]
impl RegistrarApi for Route53Provider {
    async fn get_domain_detail(&self, domain: &str) -> Result<DomainDetail> {
        let body = self
            .domains_call(
                "GetDomainDetail",
                &GetDomainDetailRequest {
                    domain_name: domain,
                },
            )
            .await?;
        let response: GetDomainDetailResponse = serde_json::from_str(&body)?;
        Ok(response.into())
    }

    async fn update_domain_nameservers(
        &self,
        domain: &str,
        nameservers: &[Nameserver],
    ) -> Result<String> {
        if nameservers.is_empty() {
            return Err(Error::invalid_input(
                "Refusing to replace delegation with an empty name server list",
            ));
        }

        let body = self
            .domains_call(
                "UpdateDomainNameservers",
                &UpdateDomainNameserversRequest {
                    domain_name: domain,
                    nameservers: nameservers.iter().map(Into::into).collect(),
                },
            )
            .await?;
        let response: UpdateDomainNameserversResponse = serde_json::from_str(&body)?;
        Ok(response.operation_id)
    }

    fn provider_name(&self) -> &'static str {
        ROUTE53_SERVICE
    }
}

/// Factory for creating Route 53 providers
pub struct Route53Factory;

impl ProviderFactory for Route53Factory {
    fn create(&self, config: &ProviderConfig) -> Result<Provider> {
        match config {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                session_token,
                registrar_region,
                route53_endpoint,
                domains_endpoint,
            } => {
                let credentials = Credentials::new(
                    access_key_id.clone(),
                    secret_access_key.clone(),
                    session_token.clone(),
                )?;

                let provider = Route53Provider::with_endpoints(
                    credentials,
                    registrar_region,
                    route53_endpoint.as_deref(),
                    domains_endpoint.as_deref(),
                )?;
                Ok(provider.into_provider())
            }
            _ => Err(Error::config("Invalid config for Route 53 provider")),
        }
    }
}

/// Register the Route 53 provider with a registry
///
/// # Example
///
/// ```rust
/// use dnsprov_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dnsprov_provider_route53::register(&registry);
/// assert!(registry.has_provider("route53"));
/// ```
pub fn register(registry: &dnsprov_core::ProviderRegistry) {
    registry.register_provider(ROUTE53_SERVICE, Box::new(Route53Factory));
}
