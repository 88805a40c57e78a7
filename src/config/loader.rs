//! Configuration loading from an optional file and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AdapterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable prefix shared by every override.
pub const ENV_PREFIX: &str = "ADAPTER_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {reason}")]
    Env { var: String, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override and validate configuration.
///
/// Without a path the defaults are used as the base layer.
pub fn load_config(path: Option<&Path>) -> Result<AdapterConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AdapterConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `ADAPTER_*` variables on top of `config`.
///
/// Empty variables count as unset.
pub fn apply_env_overrides<F>(config: &mut AdapterConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        let var = format!("{}{}", ENV_PREFIX, key);
        lookup(&var).filter(|v| !v.is_empty()).map(|v| (var, v))
    };

    if let Some((_, v)) = get("IMAGINARY_HOST") {
        config.imaginary.host = v;
    }
    if let Some((_, v)) = get("FILE_PATH_PREFIX") {
        config.imaginary.file_path_prefix = v;
    }
    if let Some((_, v)) = get("DEFAULT_TYPE") {
        config.imaginary.default_type = v;
    }
    if let Some((_, v)) = get("ALLOWED_METHODS") {
        config.imaginary.allowed_methods = v
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some((var, v)) = get("FORWARD_QUALITY") {
        config.imaginary.forward_quality = parse_env(&var, &v)?;
    }
    if let Some((_, v)) = get("HOST") {
        config.listener.host = v;
    }
    if let Some((var, v)) = get("PORT") {
        config.listener.port = parse_env(&var, &v)?;
    }
    if let Some((var, v)) = get("MAX_CONCURRENT_REQUESTS") {
        config.listener.max_concurrent_requests = parse_env(&var, &v)?;
    }
    if let Some((_, v)) = get("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some((var, v)) = get("LOG_FORMAT") {
        config.observability.log_format = parse_env(&var, &v)?;
    }

    Ok(())
}

fn parse_env<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Env {
        var: var.to_string(),
        reason: e.to_string(),
    })
}
