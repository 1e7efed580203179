//! Wire types for the Route 53 (XML) and Route 53 Domains (JSON) APIs
//!
//! These mirror the documents on the wire and are converted into the
//! `dnsprov_core::model` types at the edge of the crate.

use dnsprov_core::model::{
    AddressRecord, ChangeBatch, ChangeInfo as CoreChangeInfo, CreatedHostedZone, DomainDetail,
    HostedZoneDetail, HostedZoneId, HostedZonePage, HostedZoneSummary, Nameserver as CoreNameserver,
    PageToken,
};
use dnsprov_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// XML namespace of the 2013-04-01 hosted zone API
pub(crate) const ROUTE53_XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";

// ---------------------------------------------------------------------------
// Route 53 responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct HostedZone {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CallerReference", default)]
    pub caller_reference: Option<String>,
    #[serde(rename = "Config", default)]
    pub config: Option<HostedZoneConfig>,
    #[serde(rename = "ResourceRecordSetCount", default)]
    pub resource_record_set_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HostedZoneConfig {
    #[serde(rename = "PrivateZone", default)]
    pub private_zone: bool,
}

impl From<HostedZone> for HostedZoneSummary {
    fn from(zone: HostedZone) -> Self {
        HostedZoneSummary {
            id: HostedZoneId::new(zone.id),
            name: zone.name,
            caller_reference: zone.caller_reference,
            record_count: zone.resource_record_set_count,
            private: zone.config.map(|c| c.private_zone).unwrap_or(false),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HostedZones {
    #[serde(rename = "HostedZone", default)]
    pub items: Vec<HostedZone>,
}

/// `GET /2013-04-01/hostedzonesbyname`
#[derive(Debug, Deserialize)]
pub(crate) struct ListHostedZonesByNameResponse {
    #[serde(rename = "HostedZones", default)]
    pub hosted_zones: HostedZones,
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "NextDNSName", default)]
    pub next_dns_name: Option<String>,
    #[serde(rename = "NextHostedZoneId", default)]
    pub next_hosted_zone_id: Option<String>,
}

impl ListHostedZonesByNameResponse {
    pub fn into_page(self) -> Result<HostedZonePage> {
        let next = if self.is_truncated {
            let dns_name = self.next_dns_name.ok_or_else(|| {
                Error::provider("route53", "Truncated listing without NextDNSName")
            })?;
            Some(PageToken {
                dns_name,
                hosted_zone_id: self.next_hosted_zone_id,
            })
        } else {
            None
        };

        Ok(HostedZonePage {
            zones: self
                .hosted_zones
                .items
                .into_iter()
                .map(HostedZoneSummary::from)
                .collect(),
            next,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NameServers {
    #[serde(rename = "NameServer", default)]
    pub items: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DelegationSet {
    #[serde(rename = "NameServers", default)]
    pub name_servers: NameServers,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChangeInfo {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "SubmittedAt", default)]
    pub submitted_at: Option<String>,
}

impl From<ChangeInfo> for CoreChangeInfo {
    fn from(info: ChangeInfo) -> Self {
        CoreChangeInfo {
            id: info.id,
            status: info.status,
            submitted_at: info.submitted_at,
        }
    }
}

/// `GET /2013-04-01/hostedzone/{Id}`
#[derive(Debug, Deserialize)]
pub(crate) struct GetHostedZoneResponse {
    #[serde(rename = "HostedZone")]
    pub hosted_zone: HostedZone,
    // Private zones have no delegation set
    #[serde(rename = "DelegationSet", default)]
    pub delegation_set: Option<DelegationSet>,
}

impl From<GetHostedZoneResponse> for HostedZoneDetail {
    fn from(response: GetHostedZoneResponse) -> Self {
        HostedZoneDetail {
            zone: response.hosted_zone.into(),
            name_servers: response
                .delegation_set
                .map(|d| d.name_servers.items)
                .unwrap_or_default(),
        }
    }
}

/// `POST /2013-04-01/hostedzone`
#[derive(Debug, Deserialize)]
pub(crate) struct CreateHostedZoneResponse {
    #[serde(rename = "HostedZone")]
    pub hosted_zone: HostedZone,
    #[serde(rename = "ChangeInfo")]
    pub change_info: ChangeInfo,
    #[serde(rename = "DelegationSet", default)]
    pub delegation_set: Option<DelegationSet>,
}

impl From<CreateHostedZoneResponse> for CreatedHostedZone {
    fn from(response: CreateHostedZoneResponse) -> Self {
        CreatedHostedZone {
            zone: response.hosted_zone.into(),
            name_servers: response
                .delegation_set
                .map(|d| d.name_servers.items)
                .unwrap_or_default(),
            change: response.change_info.into(),
        }
    }
}

/// `POST /2013-04-01/hostedzone/{Id}/rrset/`
#[derive(Debug, Deserialize)]
pub(crate) struct ChangeResourceRecordSetsResponse {
    #[serde(rename = "ChangeInfo")]
    pub change_info: ChangeInfo,
}

/// Body of a non-2xx hosted zone API response
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(rename = "Error")]
    pub error: ErrorDetail,
    #[serde(rename = "RequestId", default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Route 53 requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct CreateHostedZoneRequest<'a> {
    #[serde(rename = "@xmlns")]
    pub xmlns: &'static str,
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "CallerReference")]
    pub caller_reference: &'a str,
}

impl<'a> CreateHostedZoneRequest<'a> {
    pub fn new(name: &'a str, caller_reference: &'a str) -> Self {
        Self {
            xmlns: ROUTE53_XMLNS,
            name,
            caller_reference,
        }
    }

    pub fn to_xml(&self) -> Result<String> {
        to_xml("CreateHostedZoneRequest", self)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangeResourceRecordSetsRequest {
    #[serde(rename = "@xmlns")]
    pub xmlns: &'static str,
    #[serde(rename = "ChangeBatch")]
    pub change_batch: WireChangeBatch,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireChangeBatch {
    #[serde(rename = "Comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "Changes")]
    pub changes: WireChanges,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireChanges {
    #[serde(rename = "Change")]
    pub items: Vec<WireChange>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireChange {
    #[serde(rename = "Action")]
    pub action: &'static str,
    #[serde(rename = "ResourceRecordSet")]
    pub record_set: ResourceRecordSet,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResourceRecordSet {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: &'static str,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    #[serde(rename = "ResourceRecords")]
    pub resource_records: ResourceRecords,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResourceRecords {
    #[serde(rename = "ResourceRecord")]
    pub items: Vec<ResourceRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResourceRecord {
    #[serde(rename = "Value")]
    pub value: String,
}

impl From<&AddressRecord> for ResourceRecordSet {
    fn from(record: &AddressRecord) -> Self {
        ResourceRecordSet {
            name: record.name.clone(),
            record_type: record.record_type(),
            ttl: record.ttl,
            resource_records: ResourceRecords {
                items: vec![ResourceRecord {
                    value: record.value.clone(),
                }],
            },
        }
    }
}

impl From<&ChangeBatch> for ChangeResourceRecordSetsRequest {
    fn from(batch: &ChangeBatch) -> Self {
        ChangeResourceRecordSetsRequest {
            xmlns: ROUTE53_XMLNS,
            change_batch: WireChangeBatch {
                comment: batch.comment.clone(),
                changes: WireChanges {
                    items: batch
                        .changes
                        .iter()
                        .map(|change| WireChange {
                            action: change.action.as_str(),
                            record_set: ResourceRecordSet::from(&change.record),
                        })
                        .collect(),
                },
            },
        }
    }
}

impl ChangeResourceRecordSetsRequest {
    pub fn to_xml(&self) -> Result<String> {
        to_xml("ChangeResourceRecordSetsRequest", self)
    }
}

fn to_xml<T: Serialize>(root: &str, value: &T) -> Result<String> {
    let body = quick_xml::se::to_string_with_root(root, value)
        .map_err(|e| Error::provider("route53", format!("Failed to encode request: {}", e)))?;
    Ok(format!(r#"<?xml version="1.0" encoding="UTF-8"?>{}"#, body))
}

/// Decode an XML response body
pub(crate) fn from_xml<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T> {
    quick_xml::de::from_str(body)
        .map_err(|e| Error::provider("route53", format!("Failed to parse response: {}", e)))
}

// ---------------------------------------------------------------------------
// Route 53 Domains (JSON 1.1)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct GetDomainDetailRequest<'a> {
    #[serde(rename = "DomainName")]
    pub domain_name: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireNameserver {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "GlueIps", default, skip_serializing_if = "Vec::is_empty")]
    pub glue_ips: Vec<String>,
}

impl From<WireNameserver> for CoreNameserver {
    fn from(ns: WireNameserver) -> Self {
        CoreNameserver {
            name: ns.name,
            glue_ips: ns.glue_ips,
        }
    }
}

impl From<&CoreNameserver> for WireNameserver {
    fn from(ns: &CoreNameserver) -> Self {
        WireNameserver {
            name: ns.name.clone(),
            glue_ips: ns.glue_ips.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetDomainDetailResponse {
    #[serde(rename = "DomainName")]
    pub domain_name: String,
    #[serde(rename = "Nameservers", default)]
    pub nameservers: Vec<WireNameserver>,
}

impl From<GetDomainDetailResponse> for DomainDetail {
    fn from(response: GetDomainDetailResponse) -> Self {
        DomainDetail {
            domain_name: response.domain_name,
            nameservers: response.nameservers.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateDomainNameserversRequest<'a> {
    #[serde(rename = "DomainName")]
    pub domain_name: &'a str,
    #[serde(rename = "Nameservers")]
    pub nameservers: Vec<WireNameserver>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateDomainNameserversResponse {
    #[serde(rename = "OperationId")]
    pub operation_id: String,
}

/// Body of a non-2xx registrar API response
#[derive(Debug, Deserialize)]
pub(crate) struct JsonErrorResponse {
    #[serde(rename = "__type", default)]
    pub kind: Option<String>,
    #[serde(alias = "Message", default)]
    pub message: Option<String>,
}

impl JsonErrorResponse {
    /// Error code without the `com.amazonaws...#` shape prefix
    pub fn code(&self) -> Option<&str> {
        self.kind
            .as_deref()
            .map(|kind| kind.rsplit('#').next().unwrap_or(kind))
    }
}
