use super::AppConfig;
use super::defaults::{
    DEFAULT_MAX_TOKENS, DEFAULT_MAX_TURNS, DEFAULT_MODEL, DEFAULT_PROVIDER_ID,
    DEFAULT_QUERY_TEMPLATE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOOL_TIMEOUT_SECS,
};
use super::error::ConfigError;
use super::provider::{ModelProviderConfig, RawProviderConfig};
use super::server::{RawServer, ServerConfig};
use crate::constants::{CONFIG_PATH, ENV_PATH};
use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::{debug, info};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    pub model: Option<String>,
    pub default_provider: Option<String>,
    pub max_tokens: Option<u32>,
    pub max_turns: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub tool_timeout_secs: Option<u64>,
    pub channel: Option<String>,
    pub query_template: Option<String>,
    pub server: Option<RawServer>,
    #[serde(default)]
    pub providers: Vec<RawProviderConfig>,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Load and validate configuration from a file path.
///
/// A missing file at the default path falls back to built-in defaults; a
/// missing file at an explicit path is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(CONFIG_PATH);
            match read_config(default_path) {
                Err(ConfigError::NotFound { .. }) => {
                    info!(
                        path = CONFIG_PATH,
                        "No configuration file found, using built-in defaults"
                    );
                    Ok(AppConfig::default())
                }
                other => other,
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading client configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content).map_err(|err| match err {
        ParseFailure::Toml(source) => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Invalid(err) => err,
    })
}

pub(super) enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ConfigError),
}

pub(super) fn parse_config(content: &str) -> Result<AppConfig, ParseFailure> {
    let parsed: RawConfig = toml::from_str(content).map_err(ParseFailure::Toml)?;
    validate_and_build(parsed).map_err(ParseFailure::Invalid)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let model = non_blank(parsed.model).unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let default_provider =
        non_blank(parsed.default_provider).unwrap_or_else(|| DEFAULT_PROVIDER_ID.to_string());

    let max_turns = parsed.max_turns.unwrap_or(DEFAULT_MAX_TURNS);
    if max_turns == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_turns",
            reason: "must be at least 1".to_string(),
        });
    }
    let max_tokens = parsed.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    if max_tokens == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_tokens",
            reason: "must be at least 1".to_string(),
        });
    }

    let request_timeout_secs = parsed
        .request_timeout_secs
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "request_timeout_secs",
            reason: "must be at least 1".to_string(),
        });
    }
    let tool_timeout_secs = parsed.tool_timeout_secs.unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS);
    if tool_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "tool_timeout_secs",
            reason: "must be at least 1".to_string(),
        });
    }

    let mut providers: Vec<ModelProviderConfig> = Vec::new();
    for raw_provider in parsed.providers {
        if raw_provider
            .endpoint
            .as_deref()
            .is_none_or(|endpoint| endpoint.trim().is_empty())
        {
            return Err(ConfigError::MissingEndpoint {
                provider: raw_provider.id.clone(),
            });
        }
        providers.push(ModelProviderConfig::from(raw_provider));
    }
    if providers.is_empty() {
        providers.push(ModelProviderConfig::openai_default());
    }
    let Some(provider) = providers.iter_mut().find(|p| p.id == default_provider) else {
        return Err(ConfigError::ProviderNotFound {
            provider: default_provider,
        });
    };
    provider.ensure_model(&model);

    Ok(AppConfig {
        default_provider,
        model,
        max_tokens,
        max_turns,
        request_timeout_secs,
        tool_timeout_secs,
        channel: non_blank(parsed.channel),
        query_template: non_blank(parsed.query_template)
            .unwrap_or_else(|| DEFAULT_QUERY_TEMPLATE.to_string()),
        server: parsed.server.map(ServerConfig::from),
        providers,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
