//! Declaration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::Router;

/// Error type for declaration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Supported declaration encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// Picks the format from the file extension; anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

fn deserialize(content: &str, format: Format) -> Result<RouterConfig, ConfigError> {
    Ok(match format {
        Format::Toml => toml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    })
}

/// Parse and validate a declaration held in memory.
pub fn parse_config(content: &str, format: Format) -> Result<RouterConfig, ConfigError> {
    let config = deserialize(content, format)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate a declaration file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, Format::from_path(path))
}

/// Load a declaration file and compile it, keeping both.
///
/// Validation is the compilation itself, so the table is built once.
pub fn load_router(path: &Path) -> Result<(RouterConfig, Router), ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = deserialize(&content, Format::from_path(path))?;
    let router = Router::from_config(&config).map_err(|err| ConfigError::Validation(err.errors))?;
    Ok((config, router))
}
