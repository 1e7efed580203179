//! AWS Signature Version 4
//!
//! Only what the Route 53 APIs need: signed `host`, `x-amz-date`, the
//! optional session token and any caller-supplied headers; payload hashed
//! in full.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::Credentials;

type HmacSha256 = Hmac<Sha256>;

pub(crate) const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Format of the `x-amz-date` header
pub(crate) const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A request about to be signed
pub(crate) struct RequestToSign<'a> {
    pub method: &'a str,
    /// `Host` header value, including a non-default port
    pub host: &'a str,
    /// Absolute path, already URI-encoded
    pub path: &'a str,
    /// Canonical query string (see [`canonical_query`])
    pub query: &'a str,
    /// Extra headers to sign, names in lower case
    pub headers: &'a [(&'a str, &'a str)],
    pub payload: &'a [u8],
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Build the canonical query string from unencoded key/value pairs
///
/// Pairs are URI-encoded and sorted by key then value. The same string is
/// used for the request URL so that what is signed is what is sent.
pub(crate) fn canonical_query(params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| {
            (
                urlencoding::encode(k).into_owned(),
                urlencoding::encode(v).into_owned(),
            )
        })
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the `Authorization` header value for `request`
///
/// The caller must send `x-amz-date` formatted from the same `timestamp`
/// and, when the credentials carry one, `x-amz-security-token`.
pub(crate) fn authorization(
    credentials: &Credentials,
    region: &str,
    service: &str,
    request: &RequestToSign<'_>,
    timestamp: DateTime<Utc>,
) -> String {
    let amz_date = timestamp.format(AMZ_DATE_FORMAT).to_string();
    let date = timestamp.format("%Y%m%d").to_string();

    // 1. Canonical request
    let mut headers: Vec<(String, String)> = vec![
        ("host".to_string(), request.host.trim().to_string()),
        ("x-amz-date".to_string(), amz_date.clone()),
    ];
    if let Some(token) = credentials.session_token.as_deref() {
        headers.push(("x-amz-security-token".to_string(), token.trim().to_string()));
    }
    for (name, value) in request.headers {
        headers.push((name.to_lowercase(), value.trim().to_string()));
    }
    headers.sort();

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    let hashed_payload = hex::encode(Sha256::digest(request.payload));

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method, request.path, request.query, canonical_headers, signed_headers, hashed_payload
    );

    // 2. String to sign
    let credential_scope = format!("{}/{}/{}/aws4_request", date, region, service);
    let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM, amz_date, credential_scope, hashed_canonical_request
    );

    // 3. Signature
    let secret_date = hmac_sha256(
        format!("AWS4{}", credentials.secret_access_key).as_bytes(),
        date.as_bytes(),
    );
    let secret_region = hmac_sha256(&secret_date, region.as_bytes());
    let secret_service = hmac_sha256(&secret_region, service.as_bytes());
    let secret_signing = hmac_sha256(&secret_service, b"aws4_request");
    let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes()));

    // 4. Authorization header
    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, credential_scope, signed_headers, signature
    )
}
