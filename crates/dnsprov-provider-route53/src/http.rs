// # Signed HTTP transport
//
// One `SignedClient` per AWS service. Each call makes exactly one request:
// no retry, no backoff, no caching. Non-2xx responses are decoded into the
// service's error document and mapped onto `dnsprov_core::Error`.
//
// ## Security
//
// - The `Authorization` and `x-amz-security-token` headers are never logged
// - Request bodies are logged at trace level only

use chrono::Utc;
use dnsprov_core::{Error, Result};
use reqwest::{Method, Url};
use std::time::Duration;

use crate::Credentials;
use crate::sign::{self, AMZ_DATE_FORMAT, RequestToSign};
use crate::types::{ErrorResponse, JsonErrorResponse, from_xml};

/// Default HTTP timeout for API requests (30 seconds)
pub(crate) const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Shape of the error documents a service returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorFormat {
    /// `<ErrorResponse><Error><Code/><Message/></Error></ErrorResponse>`
    Xml,
    /// `{"__type": "...", "message": "..."}`
    Json,
}

/// HTTP client that signs every request for one AWS service
pub(crate) struct SignedClient {
    client: reqwest::Client,
    credentials: Credentials,
    endpoint: String,
    region: String,
    service: &'static str,
    errors: ErrorFormat,
}

impl std::fmt::Debug for SignedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedClient")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("service", &self.service)
            .finish()
    }
}

impl SignedClient {
    pub fn new(
        client: reqwest::Client,
        credentials: Credentials,
        endpoint: impl Into<String>,
        region: impl Into<String>,
        service: &'static str,
        errors: ErrorFormat,
    ) -> Self {
        Self {
            client,
            credentials,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            region: region.into(),
            service,
            errors,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a signed request and return the body of a 2xx response
    ///
    /// # Parameters
    ///
    /// - `path`: Absolute path below the endpoint
    /// - `query`: Unencoded query pairs
    /// - `headers`: Extra headers, all of which are signed
    /// - `body`: Request payload (empty for GET)
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<String> {
        let query = sign::canonical_query(query);
        let mut raw_url = format!("{}{}", self.endpoint, path);
        if !query.is_empty() {
            raw_url.push('?');
            raw_url.push_str(&query);
        }
        let url = Url::parse(&raw_url)
            .map_err(|e| Error::config(format!("Invalid {} endpoint: {}", self.service, e)))?;
        let host = host_header(&url)?;

        let now = Utc::now();
        let authorization = sign::authorization(
            &self.credentials,
            &self.region,
            self.service,
            &RequestToSign {
                method: method.as_str(),
                host: &host,
                path: url.path(),
                query: &query,
                headers,
                payload: &body,
            },
            now,
        );

        tracing::debug!("{} {} {}", self.service, method, url.path());
        tracing::trace!("Request body: {}", String::from_utf8_lossy(&body));

        let mut request = self
            .client
            .request(method, url)
            .header("Authorization", authorization)
            .header("X-Amz-Date", now.format(AMZ_DATE_FORMAT).to_string());
        if let Some(token) = self.credentials.session_token.as_deref() {
            request = request.header("X-Amz-Security-Token", token);
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.body(body).send().await.map_err(|e| {
            Error::provider(self.service, format!("HTTP request failed: {}", e))
        })?;

        let status = response.status();
        tracing::debug!("{} responded {}", self.service, status);

        read_body(self.service, self.errors, status.as_u16(), response.text().await)
    }
}

/// Turn a read response body into the call result
///
/// A 2xx body that cannot be read is an error of its own; for other
/// statuses the status mapping still applies with a placeholder body.
fn read_body<E: std::fmt::Display>(
    service: &str,
    format: ErrorFormat,
    status: u16,
    body: std::result::Result<String, E>,
) -> Result<String> {
    let success = (200..300).contains(&status);
    match body {
        Ok(text) if success => Ok(text),
        Ok(text) => Err(map_status(service, format, status, &text)),
        Err(e) if success => Err(Error::http(format!(
            "Failed to read {} response body: {}",
            service, e
        ))),
        Err(_) => Err(map_status(
            service,
            format,
            status,
            "Unable to read response body",
        )),
    }
}

/// `Host` header value as the server will see it
fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::config(format!("Endpoint has no host: {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Error codes that mean "slow down" even when sent with status 400
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "PriorRequestNotComplete",
    "TooManyRequestsException",
];

/// Map a non-2xx response onto a core error
pub(crate) fn map_status(service: &str, format: ErrorFormat, status: u16, body: &str) -> Error {
    let (code, message) = decode_error(format, body);
    let detail = match (&code, &message) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code.clone(),
        (None, Some(message)) => message.clone(),
        (None, None) => body.trim().to_string(),
    };

    if code
        .as_deref()
        .is_some_and(|code| THROTTLING_CODES.contains(&code))
    {
        return Error::rate_limited(format!("{} ({})", detail, status));
    }

    match status {
        401 | 403 => Error::auth(format!(
            "Invalid credentials or insufficient permissions for {}. Status: {} - {}",
            service, status, detail
        )),
        404 => Error::not_found(detail),
        409 => Error::provider(service, format!("Conflict: {} - {}", status, detail)),
        429 => Error::rate_limited(format!("{} ({})", detail, status)),
        500..=599 => Error::provider(
            service,
            format!("Server error (transient): {} - {}", status, detail),
        ),
        _ => Error::provider(service, format!("Request failed: {} - {}", status, detail)),
    }
}

fn decode_error(format: ErrorFormat, body: &str) -> (Option<String>, Option<String>) {
    match format {
        ErrorFormat::Xml => match from_xml::<ErrorResponse>(body) {
            Ok(response) => {
                tracing::debug!(
                    "Error response: type={:?} request_id={:?}",
                    response.error.kind,
                    response.request_id
                );
                (Some(response.error.code), response.error.message)
            }
            Err(_) => (None, None),
        },
        ErrorFormat::Json => match serde_json::from_str::<JsonErrorResponse>(body) {
            Ok(response) => (response.code().map(str::to_string), response.message),
            Err(_) => (None, None),
        },
    }
}
