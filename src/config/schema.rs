//! Configuration schema definitions.
//!
//! All types derive Serde traits so the same structure can be read from a
//! TOML file and then patched from the environment.

use serde::{Deserialize, Serialize};

/// Operations understood by imaginary. Used as the default allow-list.
pub const DEFAULT_ALLOWED_METHODS: &[&str] = &[
    "autorotate",
    "blur",
    "convert",
    "crop",
    "enlarge",
    "extract",
    "fit",
    "flip",
    "flop",
    "info",
    "pipeline",
    "resize",
    "rotate",
    "smartcrop",
    "thumbnail",
    "watermark",
    "watermarkimage",
    "zoom",
];

/// Root configuration for the adapter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdapterConfig {
    /// Where the adapter listens.
    pub listener: ListenerConfig,

    /// Backend (imaginary) settings and request translation options.
    pub imaginary: ImaginaryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

impl AdapterConfig {
    /// Socket address string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.host, self.listener.port)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Maximum requests proxied at the same time (backpressure).
    pub max_concurrent_requests: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            max_concurrent_requests: 1024,
        }
    }
}

/// Backend and translation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImaginaryConfig {
    /// Base URL of the imaginary service (e.g., "http://imaginary:9000"). Required.
    pub host: String,

    /// Substring removed from the inbound path to obtain the file path.
    pub file_path_prefix: String,

    /// Output type used when the client sends none. Empty means "let imaginary decide".
    pub default_type: String,

    /// Transform names accepted in `method`. Empty disables the check.
    pub allowed_methods: Vec<String>,

    /// Append `quality` to the backend query.
    pub forward_quality: bool,
}

impl Default for ImaginaryConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            file_path_prefix: String::new(),
            default_type: String::new(),
            allowed_methods: DEFAULT_ALLOWED_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            forward_quality: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the backend to answer with response headers, in seconds.
    pub backend_secs: u64,

    /// Overall inbound request timeout in seconds. Must exceed the backend timeouts
    /// so that a slow imaginary is reported as 504 rather than cut off by this one.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            backend_secs: 10,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when RUST_LOG is unset.
    pub log_level: String,

    /// Human-readable or JSON logs.
    pub log_format: LogFormat,

    /// Serve Prometheus metrics.
    pub metrics_enabled: bool,

    /// Address of the Prometheus scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9100".to_string(),
        }
    }
}
