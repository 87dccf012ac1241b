use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";
pub const DEFAULT_NWS_API_BASE: &str = "https://api.weather.gov";
pub const SLACK_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("SLACK_BOT_TOKEN environment variable is required")]
    MissingSlackToken,
}

/// Runtime settings for the tool server.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub slack_token: String,
    pub slack_api_base: String,
    pub nws_api_base: String,
    pub user_agent: String,
    pub http_timeout: Duration,
}

impl ServerSettings {
    pub fn new(slack_token: impl Into<String>) -> Self {
        Self {
            slack_token: slack_token.into(),
            slack_api_base: DEFAULT_SLACK_API_BASE.to_string(),
            nws_api_base: DEFAULT_NWS_API_BASE.to_string(),
            user_agent: concat!("slackbrief/", env!("CARGO_PKG_VERSION")).to_string(),
            http_timeout: HTTP_TIMEOUT,
        }
    }

    /// Read the Slack token from the environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        let token = env::var(SLACK_TOKEN_ENV)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(SettingsError::MissingSlackToken)?;
        Ok(Self::new(token))
    }

    pub fn with_slack_api_base(mut self, base: Option<String>) -> Self {
        if let Some(base) = base.filter(|b| !b.trim().is_empty()) {
            self.slack_api_base = base.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_nws_api_base(mut self, base: Option<String>) -> Self {
        if let Some(base) = base.filter(|b| !b.trim().is_empty()) {
            self.nws_api_base = base.trim_end_matches('/').to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_strip_trailing_slash_and_ignore_blank() {
        let settings = ServerSettings::new("xoxb-test")
            .with_slack_api_base(Some("http://127.0.0.1:9000/api/".into()))
            .with_nws_api_base(Some("  ".into()));

        assert_eq!(settings.slack_api_base, "http://127.0.0.1:9000/api");
        assert_eq!(settings.nws_api_base, DEFAULT_NWS_API_BASE);
        assert!(settings.user_agent.starts_with("slackbrief/"));
    }
}
