//! Provider factory - creates clients from config

use super::clients::{OllamaClient, OpenAIClient};
use super::traits::ModelClient;
use crate::config::ModelProviderConfig;
use std::env;
use std::time::Duration;
use tracing::warn;

/// Resolve API key from environment variable
pub fn resolve_api_key(provider: &str, spec: Option<&str>) -> Option<String> {
    let raw = spec.map(str::trim)?;
    if raw.is_empty() {
        return None;
    }
    match env::var(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                provider,
                env_var = raw,
                %err,
                "API key environment variable is not set"
            );
            None
        }
    }
}

/// Factory for creating model clients from provider config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a model client based on provider type.
    ///
    /// Supported types:
    /// - `ollama`, `localai` → Ollama format
    /// - Others → OpenAI-compatible format (default)
    pub fn create(config: &ModelProviderConfig, timeout: Duration) -> Box<dyn ModelClient> {
        match config.provider_type.to_lowercase().as_str() {
            "ollama" | "localai" => Box::new(OllamaClient::from_config(config, timeout)),
            _ => Box::new(OpenAIClient::from_config(config, timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn resolves_key_from_named_variable() {
        unsafe {
            env::set_var("SLACKBRIEF_TEST_KEY", "sk-123");
        }
        assert_eq!(
            resolve_api_key("openai", Some(" SLACKBRIEF_TEST_KEY ")).as_deref(),
            Some("sk-123")
        );
        unsafe {
            env::remove_var("SLACKBRIEF_TEST_KEY");
        }
        assert_eq!(resolve_api_key("openai", Some("SLACKBRIEF_TEST_KEY")), None);
    }

    #[test]
    fn blank_key_spec_resolves_to_none() {
        assert_eq!(resolve_api_key("openai", Some("  ")), None);
        assert_eq!(resolve_api_key("openai", None), None);
    }

    #[test]
    fn factory_picks_client_by_type() {
        let mut config = ModelProviderConfig::openai_default();
        let timeout = Duration::from_secs(1);
        assert_eq!(ProviderFactory::create(&config, timeout).id(), "openai");

        config.id = "local".into();
        config.provider_type = "Ollama".into();
        assert_eq!(ProviderFactory::create(&config, timeout).id(), "local");
    }
}
