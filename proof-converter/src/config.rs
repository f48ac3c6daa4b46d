//! Converter Configuration
//!
//! Handles loading configuration from an optional config file and environment variables.
//! Precedence (lowest first): built-in defaults, the file named by `CONVERTER_CONFIG`,
//! `CONVERTER_*` environment variables (a `.env` file is loaded first if present).

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

use crate::services::ConverterConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CONVERTER";

/// Environment variable naming an optional config file
pub const CONFIG_FILE_VAR: &str = "CONVERTER_CONFIG";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Reject coordinates that are not below the BN254 modulus
    #[serde(default = "default_enforce_field_range")]
    pub enforce_field_range: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_enforce_field_range() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            json_logs: false,
            cors_origins: default_cors_origins(),
            enforce_field_range: default_enforce_field_range(),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the optional config file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = std::env::var(CONFIG_FILE_VAR).ok();
        Self::from_sources(file.as_deref(), environment())
    }

    /// Build configuration from an optional file and an environment source
    pub fn from_sources(file: Option<&str>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::with_name(path));
        }

        builder.add_source(env).build()?.try_deserialize()
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Converter settings derived from this configuration
    pub fn converter_config(&self) -> ConverterConfig {
        ConverterConfig {
            enforce_field_range: self.enforce_field_range,
        }
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

/// `CONVERTER_*` environment source, with comma-separated `CONVERTER_CORS_ORIGINS`
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors_origins")
}
