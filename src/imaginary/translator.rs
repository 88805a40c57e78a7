//! Inbound request → [`RequestParameters`].

use std::borrow::Cow;

use axum::http::Uri;
use url::{form_urlencoded, Url};

use crate::config::validation::{parse_backend_host, ValidationError};
use crate::config::ImaginaryConfig;
use crate::imaginary::error::TranslateError;
use crate::imaginary::params::{RequestParameters, DEFAULT_QUALITY};
use crate::imaginary::path::strip_first;

/// Read-only translation settings, built once at startup.
#[derive(Debug, Clone)]
pub struct Translator {
    host: Url,
    file_path_prefix: String,
    default_type: String,
    allowed_methods: Vec<String>,
    forward_quality: bool,
}

impl Translator {
    /// Create a translator for an already parsed backend host.
    pub fn new(host: Url, file_path_prefix: impl Into<String>) -> Self {
        Self {
            host,
            file_path_prefix: file_path_prefix.into(),
            default_type: String::new(),
            allowed_methods: Vec::new(),
            forward_quality: false,
        }
    }

    /// Build a translator from configuration, parsing the imaginary host.
    pub fn from_config(config: &ImaginaryConfig) -> Result<Self, ValidationError> {
        let host = parse_backend_host(&config.host)?;
        Ok(Self::new(host, config.file_path_prefix.clone())
            .with_default_type(config.default_type.clone())
            .with_allowed_methods(config.allowed_methods.clone())
            .with_forward_quality(config.forward_quality))
    }

    pub fn with_default_type(mut self, default_type: impl Into<String>) -> Self {
        self.default_type = default_type.into();
        self
    }

    /// Restrict `method` to these names. An empty list accepts anything.
    pub fn with_allowed_methods(mut self, methods: Vec<String>) -> Self {
        self.allowed_methods = methods;
        self
    }

    pub fn with_forward_quality(mut self, forward: bool) -> Self {
        self.forward_quality = forward;
        self
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Translate the path and query of an inbound request.
    pub fn translate(&self, uri: &Uri) -> Result<RequestParameters, TranslateError> {
        let query: Vec<(Cow<'_, str>, Cow<'_, str>)> =
            form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes()).collect();
        let get = |key: &str| first_value(&query, key).to_string();

        let method = get("method");
        if method.is_empty() {
            return Err(TranslateError::MethodMissing);
        }
        if !self.allowed_methods.is_empty() && !self.allowed_methods.contains(&method) {
            return Err(TranslateError::MethodNotAllowed(method));
        }

        let width: i64 = get("width")
            .parse()
            .map_err(|_| TranslateError::WidthMissing)?;
        let height: i64 = get("height")
            .parse()
            .map_err(|_| TranslateError::HeightMissing)?;

        let quality = match get("quality").parse::<i64>() {
            Ok(0) | Err(_) => DEFAULT_QUALITY,
            Ok(q) => q,
        };

        let raw_path = uri.path();
        let path = urlencoding::decode(raw_path).unwrap_or(Cow::Borrowed(raw_path));
        let file = strip_first(&path, &self.file_path_prefix);

        let mut output_type = get("type");
        if output_type.is_empty() {
            output_type = self.default_type.clone();
        }

        Ok(RequestParameters {
            host: self.host.clone(),
            file,
            method,
            width,
            height,
            quality,
            output_type,
            forward_quality: self.forward_quality,
        })
    }
}

/// First value for `key`, or "" when the key is absent.
fn first_value<'a>(query: &'a [(Cow<'_, str>, Cow<'_, str>)], key: &str) -> &'a str {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_ref())
        .unwrap_or_default()
}
