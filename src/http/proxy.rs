//! Forwarding to imaginary.
//!
//! # Responsibilities
//! - Issue the GET to the built backend URL
//! - Clone inbound request headers onto the outbound request
//! - Stream the backend status, headers and body back to the client
//! - Turn connection failures and timeouts into gateway errors
//!
//! # Design Decisions
//! - The body is never buffered; hyper's incoming body is handed to axum as is
//! - Hop-by-hop headers are stripped in both directions
//! - `Host` and `Content-Length` are not cloned: the outbound request has its own
//!   target and an empty body

use std::error::Error as _;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Method, Request, Response, Uri},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::TimeoutConfig;
use crate::http::response::ForwardError;

/// Headers that only apply to a single connection.
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// HTTP client wrapper used for every backend call.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    backend_timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder using the configured connect and backend timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            backend_timeout: Duration::from_secs(timeouts.backend_secs),
        }
    }

    /// GET `url` with a copy of `inbound` headers and return the streaming response.
    ///
    /// The timeout bounds the wait for response headers; the body streams afterwards.
    pub async fn forward(
        &self,
        url: &Url,
        inbound: &HeaderMap,
    ) -> Result<Response<Body>, ForwardError> {
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| ForwardError::InvalidRequest(e.to_string()))?;

        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            clone_request_headers(inbound, headers);
        }
        let request = builder
            .body(Body::empty())
            .map_err(|e| ForwardError::InvalidRequest(e.to_string()))?;

        let response = match tokio::time::timeout(self.backend_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                let reason = match e.source() {
                    Some(source) => format!("{}: {}", e, source),
                    None => e.to_string(),
                };
                return Err(ForwardError::BackendUnreachable(reason));
            }
            Err(_) => return Err(ForwardError::BackendTimeout(self.backend_timeout.as_secs())),
        };

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);

        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Copy every end-to-end header from `from` into `to`, keeping repeated values.
pub fn clone_request_headers(from: &HeaderMap, to: &mut HeaderMap) {
    let listed = connection_listed(from);
    for (name, value) in from.iter() {
        if name == header::HOST
            || name == header::CONTENT_LENGTH
            || name == header::UPGRADE
            || HOP_BY_HOP.contains(name)
            || listed.contains(name)
        {
            continue;
        }
        to.append(name.clone(), value.clone());
    }
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in connection_listed(headers) {
        headers.remove(name);
    }
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove(header::UPGRADE);
}

fn connection_listed(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect()
}
