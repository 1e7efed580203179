// # Hosted Zone Trait
//
// Defines the interface to a provider's authoritative DNS hosting.
//
// ## Implementations
//
// - Route 53: `dnsprov-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsprov_core::HostedZoneApi;
//
// let page = zones.list_hosted_zones_by_name("example.com", None).await?;
// for zone in &page.zones {
//     println!("{} {}", zone.id, zone.name);
// }
// ```

use crate::model::{
    CallerReference, ChangeBatch, ChangeInfo, CreatedHostedZone, HostedZoneDetail, HostedZoneId,
    HostedZonePage, PageToken,
};
use async_trait::async_trait;

/// Trait for hosted zone API implementations
///
/// Implementations perform exactly one API request per call. They do not
/// retry, do not cache, and do not decide whether a change is needed; that
/// is owned by the [`Provisioner`](crate::engine::Provisioner).
#[async_trait]
pub trait HostedZoneApi: Send + Sync {
    /// List hosted zones in name order starting at `dns_name`
    ///
    /// # Parameters
    ///
    /// - `dns_name`: Name to start the listing at
    /// - `page`: Continuation marker from a previous page, `None` for the first page
    ///
    /// # Returns
    ///
    /// One page of zones; `next` is set when more pages exist.
    async fn list_hosted_zones_by_name(
        &self,
        dns_name: &str,
        page: Option<&PageToken>,
    ) -> Result<HostedZonePage, crate::Error>;

    /// Create a hosted zone for `name`
    ///
    /// `caller_reference` makes the request idempotent on the provider side.
    async fn create_hosted_zone(
        &self,
        name: &str,
        caller_reference: &CallerReference,
    ) -> Result<CreatedHostedZone, crate::Error>;

    /// Get a hosted zone and its delegation set
    async fn get_hosted_zone(&self, id: &HostedZoneId) -> Result<HostedZoneDetail, crate::Error>;

    /// Submit record set changes to a zone
    ///
    /// # Returns
    ///
    /// The provider's change tracking information. Propagation is
    /// asynchronous and not awaited.
    async fn change_resource_record_sets(
        &self,
        id: &HostedZoneId,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
