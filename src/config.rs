//! Environment-driven configuration.
//!
//! Values are read from the process environment after loading an optional
//! `.env` file. Every variable has a default so a bare checkout starts.

use std::env;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::converter::PdfOptions;

pub const NODE_BINARY_VAR: &str = "CHROME_PDF_NODE_BINARY";
pub const CONVERTER_SCRIPT_VAR: &str = "CHROME_PDF_CONVERTER_SCRIPT";
pub const VIEWS_DIR_VAR: &str = "CHROME_PDF_VIEWS_DIR";
pub const DEFAULT_OPTIONS_VAR: &str = "CHROME_PDF_DEFAULT_OPTIONS";
pub const BIND_ADDR_VAR: &str = "CHROME_PDF_BIND_ADDR";
pub const PORT_VAR: &str = "CHROME_PDF_PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a valid port number, got '{value}'")]
    InvalidPort { var: &'static str, value: String },
    #[error("{var} must be a JSON object: {reason}")]
    InvalidOptions { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Program used to run the converter script.
    pub node_binary: String,
    pub converter_script: PathBuf,
    pub views_dir: PathBuf,
    /// Options every new document starts with.
    pub default_options: PdfOptions,
    pub bind_addr: String,
    pub port: u16,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            node_binary: "node".to_string(),
            converter_script: PathBuf::from("./node/converter.js"),
            views_dir: PathBuf::from("./views"),
            default_options: PdfOptions::new(),
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl PdfConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to the
    /// defaults for missing or blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get(PORT_VAR) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                var: PORT_VAR,
                value: raw.clone(),
            })?,
            None => defaults.port,
        };

        let default_options = match get(DEFAULT_OPTIONS_VAR) {
            Some(raw) => parse_options(&raw)?,
            None => defaults.default_options,
        };

        Ok(Self {
            node_binary: get(NODE_BINARY_VAR).unwrap_or(defaults.node_binary),
            converter_script: get(CONVERTER_SCRIPT_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.converter_script),
            views_dir: get(VIEWS_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.views_dir),
            default_options,
            bind_addr: get(BIND_ADDR_VAR).unwrap_or(defaults.bind_addr),
            port,
        })
    }
}

fn parse_options(raw: &str) -> Result<PdfOptions, ConfigError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ConfigError::InvalidOptions {
            var: DEFAULT_OPTIONS_VAR,
            reason: format!("expected an object, got {}", other),
        }),
        Err(e) => Err(ConfigError::InvalidOptions {
            var: DEFAULT_OPTIONS_VAR,
            reason: e.to_string(),
        }),
    }
}
