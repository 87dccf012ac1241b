//! # Provider Configuration
//!
//! Configuration types for model providers. Every provider speaks a
//! function-calling chat API.
//!
//! | Type | Description | API Key Required |
//! |------|-------------|-----------------|
//! | `openai` | OpenAI-compatible APIs (default) | Yes |
//! | `ollama` | Local Ollama server | No |

use super::defaults::{DEFAULT_API_KEY_ENV, DEFAULT_MODEL, DEFAULT_OPENAI_ENDPOINT, DEFAULT_PROVIDER_ID};
use serde::{Deserialize, Serialize};

/// Information about an available model from a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    /// Model identifier used in API calls (e.g., "gpt-4-turbo")
    pub name: String,
    /// Human-readable display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Configuration for a model provider.
///
/// # Example
///
/// ```toml
/// [[providers]]
/// id = "openai"
/// type = "openai"
/// endpoint = "https://api.openai.com"
/// api_key = "OPENAI_API_KEY"
/// models = ["gpt-4-turbo"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelProviderConfig {
    /// Unique identifier for this provider (e.g., "openai", "ollama-local")
    pub id: String,
    /// The provider type determines API format: "openai" or "ollama"
    #[serde(rename = "type")]
    pub provider_type: String,
    /// API endpoint URL
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API path override (e.g., "/v1/chat/completions")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,
    /// Models served by this provider; empty means any model is accepted
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawProviderConfig {
    pub(super) id: String,
    #[serde(rename = "type", default)]
    pub(super) provider_type: String,
    pub(super) endpoint: Option<String>,
    pub(super) api_key: Option<String>,
    #[serde(default)]
    pub(super) api_path: Option<String>,
    #[serde(default)]
    pub(super) models: Vec<RawModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum RawModelInfo {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        display_name: Option<String>,
    },
}

impl From<RawModelInfo> for ModelInfo {
    fn from(value: RawModelInfo) -> Self {
        match value {
            RawModelInfo::Name(name) => Self {
                name,
                display_name: None,
            },
            RawModelInfo::Detailed { name, display_name } => Self { name, display_name },
        }
    }
}

impl From<RawProviderConfig> for ModelProviderConfig {
    fn from(raw: RawProviderConfig) -> Self {
        let provider_type = if raw.provider_type.trim().is_empty() {
            "openai".to_string()
        } else {
            raw.provider_type
        };

        Self {
            id: raw.id,
            provider_type,
            endpoint: raw.endpoint.unwrap_or_default(),
            api_key: raw.api_key,
            api_path: raw.api_path,
            models: raw.models.into_iter().map(ModelInfo::from).collect(),
        }
    }
}

impl ModelProviderConfig {
    /// The provider used when no configuration file exists.
    pub fn openai_default() -> Self {
        Self {
            id: DEFAULT_PROVIDER_ID.to_string(),
            provider_type: "openai".to_string(),
            endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
            api_key: Some(DEFAULT_API_KEY_ENV.to_string()),
            api_path: None,
            models: vec![ModelInfo {
                name: DEFAULT_MODEL.to_string(),
                display_name: None,
            }],
        }
    }

    /// Ensure a model exists in this provider's model list
    pub fn ensure_model(&mut self, model: &str) {
        if self.models.iter().all(|info| info.name != model) {
            self.models.push(ModelInfo {
                name: model.to_string(),
                display_name: None,
            });
        }
    }

    /// Check if this is an Ollama provider (case-insensitive).
    ///
    /// ```
    /// use slackbrief_core::config::ModelProviderConfig;
    ///
    /// let mut provider = ModelProviderConfig::openai_default();
    /// assert!(!provider.is_ollama());
    /// provider.provider_type = "Ollama".to_string();
    /// assert!(provider.is_ollama());
    /// ```
    pub fn is_ollama(&self) -> bool {
        self.provider_type.eq_ignore_ascii_case("ollama")
    }
}
