//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse the imaginary host into an absolute URL once, at startup
//! - Validate value ranges (timeouts > 0, bind address resolvable)
//! - Backend timeouts must be shorter than the inbound request timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: AdapterConfig → Result<(), Vec<ValidationError>>

use std::net::ToSocketAddrs;

use thiserror::Error;
use url::Url;

use crate::config::schema::AdapterConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("imaginary host is not defined (set ADAPTER_IMAGINARY_HOST)")]
    MissingHost,

    #[error("defined imaginary host '{host}' is not correct: {reason}")]
    MisconfiguredHost { host: String, reason: String },

    #[error("listen address '{0}' cannot be resolved")]
    InvalidBindAddress(String),

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeout '{name}' ({value}s) must be shorter than request_secs ({request_secs}s)")]
    TimeoutNotBelowRequest {
        name: &'static str,
        value: u64,
        request_secs: u64,
    },

    #[error("max_concurrent_requests must be greater than zero")]
    ZeroConcurrency,
}

/// Parse the configured imaginary host into a base URL.
///
/// The URL must be absolute, use http or https, and be able to carry a path.
pub fn parse_backend_host(host: &str) -> Result<Url, ValidationError> {
    if host.is_empty() {
        return Err(ValidationError::MissingHost);
    }

    let misconfigured = |reason: &str| ValidationError::MisconfiguredHost {
        host: host.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(host).map_err(|e| misconfigured(&e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(misconfigured("URL cannot carry a path"));
    }
    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(misconfigured("scheme must be http or https")),
    }
    if url.host_str().is_none() {
        return Err(misconfigured("URL has no host"));
    }

    Ok(url)
}

/// Check the whole configuration, collecting every error.
pub fn validate_config(config: &AdapterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = parse_backend_host(&config.imaginary.host) {
        errors.push(e);
    }

    let bind = config.bind_address();
    if bind.to_socket_addrs().is_err() {
        errors.push(ValidationError::InvalidBindAddress(bind));
    }

    if config.listener.max_concurrent_requests == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    }

    let timeouts = [
        ("connect_secs", config.timeouts.connect_secs),
        ("backend_secs", config.timeouts.backend_secs),
        ("request_secs", config.timeouts.request_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    let request_secs = config.timeouts.request_secs;
    for (name, value) in timeouts.into_iter().take(2) {
        if value >= request_secs && request_secs > 0 {
            errors.push(ValidationError::TimeoutNotBelowRequest {
                name,
                value,
                request_secs,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
