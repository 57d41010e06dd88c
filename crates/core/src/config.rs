use std::env;
use std::fs;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Effective application configuration: the collaborator gateway endpoint
/// plus logging. Loaded from `contrata.toml` with `CONTRATA_*` environment
/// overrides taking precedence.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_token: SecretString,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    gateway: RawGatewayConfig,
    logging: RawLoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGatewayConfig {
    base_url: Option<String>,
    api_token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLoggingConfig {
    level: Option<String>,
    format: Option<String>,
}

const DEFAULT_BASE_URL: &str = "http://localhost:8730";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let raw = read_raw(&options)?;

        let base_url = env_override("CONTRATA_GATEWAY_BASE_URL")
            .or(raw.gateway.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let api_token = env_override("CONTRATA_GATEWAY_API_TOKEN")
            .or(raw.gateway.api_token)
            .unwrap_or_default();

        let timeout_secs = match env_override("CONTRATA_GATEWAY_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "CONTRATA_GATEWAY_TIMEOUT_SECS".to_owned(),
                value,
            })?,
            None => raw.gateway.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let level = env_override("CONTRATA_LOGGING_LEVEL")
            .or(raw.logging.level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

        let format = match env_override("CONTRATA_LOGGING_FORMAT").or(raw.logging.format) {
            Some(value) => parse_log_format(&value).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "logging.format must be one of compact, pretty or json, got `{value}`"
                ))
            })?,
            None => LogFormat::Compact,
        };

        let config = Self {
            gateway: GatewayConfig {
                base_url,
                api_token: SecretString::from(api_token),
                timeout_secs,
            },
            logging: LoggingConfig { level, format },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("gateway.base_url must not be empty".to_owned()));
        }
        if !self.gateway.base_url.starts_with("http://")
            && !self.gateway.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "gateway.base_url must be an http(s) endpoint, got `{}`",
                self.gateway.base_url
            )));
        }
        if self.gateway.api_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "gateway.api_token is required (set CONTRATA_GATEWAY_API_TOKEN)".to_owned(),
            ));
        }
        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "gateway.timeout_secs must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Default lookup locations for the config file, in order.
pub fn default_config_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("contrata.toml"), PathBuf::from("config/contrata.toml")]
}

fn read_raw(options: &LoadOptions) -> Result<RawConfig, ConfigError> {
    let path = match &options.config_path {
        Some(path) => Some(path.clone()),
        None => default_config_paths().into_iter().find(|path| path.exists()),
    };

    let Some(path) = path else {
        if options.require_file {
            return Err(ConfigError::MissingConfigFile(PathBuf::from("contrata.toml")));
        }
        return Ok(RawConfig::default());
    };

    if !path.exists() {
        if options.require_file {
            return Err(ConfigError::MissingConfigFile(path));
        }
        return Ok(RawConfig::default());
    }

    let contents = fs::read_to_string(&path)
        .map_err(|source| ConfigError::ReadFile { path: path.clone(), source })?;
    toml::from_str(&contents).map_err(|source| ConfigError::ParseFile { path, source })
}

fn env_override(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_log_format(raw: &str) -> Option<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "compact" => Some(LogFormat::Compact),
        "pretty" => Some(LogFormat::Pretty),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}
