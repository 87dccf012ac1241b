//! Slack Web API tools.

use super::args::Args;
use super::{ToolHandler, ToolOutcome, ToolSpec};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_CHANNEL_LIMIT: u64 = 100;
const DEFAULT_MESSAGE_LIMIT: u64 = 50;

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Failed to reach Slack: {0}")]
    Http(#[source] reqwest::Error),
    #[error("Slack API error: {0}")]
    Api(String),
}

impl From<SlackError> for ToolOutcome {
    fn from(err: SlackError) -> Self {
        ToolOutcome::Failure(err.to_string())
    }
}

/// Minimal Slack Web API client shared by the Slack tools.
pub struct SlackApi {
    http: Client,
    base: String,
    token: String,
}

impl SlackApi {
    pub fn new(http: Client, base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base: base.into(),
            token: token.into(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base.trim_end_matches('/'))
    }

    async fn get(&self, method: &str, query: &[(&str, String)]) -> Result<Value, SlackError> {
        let request = self
            .http
            .get(self.url(method))
            .bearer_auth(&self.token)
            .query(query);
        self.send(method, request).await
    }

    async fn post(&self, method: &str, body: &Value) -> Result<Value, SlackError> {
        let request = self
            .http
            .post(self.url(method))
            .bearer_auth(&self.token)
            .json(body);
        self.send(method, request).await
    }

    /// Send a Web API call; `"ok": false` replies become [`SlackError::Api`].
    async fn send(&self, method: &str, request: RequestBuilder) -> Result<Value, SlackError> {
        debug!(method, "Calling Slack Web API");
        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                warn!(method, error = %err, "Slack request failed");
                SlackError::Http(err)
            })?;
        let body: Value = response.json().await.map_err(|err| {
            warn!(method, error = %err, "Slack response was not JSON");
            SlackError::Http(err)
        })?;

        if body.get("ok").and_then(Value::as_bool) == Some(true) {
            Ok(body)
        } else {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            warn!(method, error, "Slack API returned an error");
            Err(SlackError::Api(error.to_string()))
        }
    }
}

pub fn format_channel(channel: &Value) -> String {
    let name = channel.get("name").and_then(Value::as_str).unwrap_or("unknown");
    let id = channel.get("id").and_then(Value::as_str).unwrap_or("?");
    let mut line = format!("#{name} ({id})");
    if let Some(members) = channel.get("num_members").and_then(Value::as_u64) {
        line.push_str(&format!(" - {members} members"));
    }
    if let Some(topic) = channel
        .pointer("/topic/value")
        .and_then(Value::as_str)
        .filter(|topic| !topic.trim().is_empty())
    {
        line.push_str(&format!(" | topic: {topic}"));
    }
    line
}

/// Render a Slack `ts` (`"1714554000.000100"`) as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(ts: &str) -> Option<String> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, "0"));
    let secs: i64 = secs.parse().ok()?;
    let micros: u32 = format!("{frac:0<6}").get(..6)?.parse().ok()?;
    let time = DateTime::from_timestamp(secs, micros * 1000)?;
    Some(time.format("%Y-%m-%d %H:%M:%S").to_string())
}

pub fn format_message(message: &Value) -> String {
    let ts = message.get("ts").and_then(Value::as_str).unwrap_or_default();
    let when = format_timestamp(ts).unwrap_or_else(|| ts.to_string());
    let author = ["user", "bot_id"]
        .iter()
        .find_map(|key| message.get(*key).and_then(Value::as_str))
        .unwrap_or("unknown");
    let text = message.get("text").and_then(Value::as_str).unwrap_or_default();
    format!("[{when} UTC] {author}: {text}")
}

pub struct ListChannels {
    api: Arc<SlackApi>,
}

impl ListChannels {
    pub fn new(api: Arc<SlackApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ToolHandler for ListChannels {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "slack_list_channels",
            description: "List all channels in the Slack workspace.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of channels to return (default 100, max 1000)",
                        "default": DEFAULT_CHANNEL_LIMIT
                    }
                }
            }),
        }
    }

    async fn call(&self, arguments: Value) -> ToolOutcome {
        let limit = match Args::new(&arguments).and_then(|args| args.limit("limit", DEFAULT_CHANNEL_LIMIT)) {
            Ok(limit) => limit,
            Err(err) => return err.into(),
        };
        info!(limit, "Listing Slack channels");

        let query = [
            ("limit", limit.to_string()),
            ("exclude_archived", "true".to_string()),
            ("types", "public_channel".to_string()),
        ];
        let body = match self.api.get("conversations.list", &query).await {
            Ok(body) => body,
            Err(err) => return err.into(),
        };

        let channels = body
            .get("channels")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if channels.is_empty() {
            return ToolOutcome::Success("No channels found.".to_string());
        }
        let lines: Vec<String> = channels.iter().map(format_channel).collect();
        ToolOutcome::Success(lines.join("\n"))
    }
}

pub struct SendMessage {
    api: Arc<SlackApi>,
}

impl SendMessage {
    pub fn new(api: Arc<SlackApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ToolHandler for SendMessage {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "slack_send_message",
            description: "Send a message to a Slack channel.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "channel_id": {
                        "type": "string",
                        "description": "The ID of the channel to send the message to"
                    },
                    "text": {
                        "type": "string",
                        "description": "The message text to send"
                    }
                },
                "required": ["channel_id", "text"]
            }),
        }
    }

    async fn call(&self, arguments: Value) -> ToolOutcome {
        let (channel, text) = match Args::new(&arguments)
            .and_then(|args| Ok((args.string("channel_id")?, args.string("text")?)))
        {
            Ok(pair) => pair,
            Err(err) => return err.into(),
        };
        info!(channel, "Sending Slack message");

        let body = match self
            .api
            .post("chat.postMessage", &json!({"channel": channel, "text": text}))
            .await
        {
            Ok(body) => body,
            Err(err) => return err.into(),
        };

        let posted_to = body.get("channel").and_then(Value::as_str).unwrap_or(channel);
        let ts = body.get("ts").and_then(Value::as_str).unwrap_or("unknown");
        ToolOutcome::Success(format!("Message sent to {posted_to} at {ts}."))
    }
}

pub struct GetMessages {
    api: Arc<SlackApi>,
}

impl GetMessages {
    pub fn new(api: Arc<SlackApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ToolHandler for GetMessages {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "slack_get_messages",
            description: "Get recent messages from a Slack channel.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "channel_id": {
                        "type": "string",
                        "description": "The ID of the channel to get messages from"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of messages to return (default 50, max 1000)",
                        "default": DEFAULT_MESSAGE_LIMIT
                    }
                },
                "required": ["channel_id"]
            }),
        }
    }

    async fn call(&self, arguments: Value) -> ToolOutcome {
        let (channel, limit) = match Args::new(&arguments).and_then(|args| {
            Ok((
                args.string("channel_id")?,
                args.limit("limit", DEFAULT_MESSAGE_LIMIT)?,
            ))
        }) {
            Ok(pair) => pair,
            Err(err) => return err.into(),
        };
        info!(channel, limit, "Fetching Slack channel history");

        let query = [("channel", channel.to_string()), ("limit", limit.to_string())];
        let body = match self.api.get("conversations.history", &query).await {
            Ok(body) => body,
            Err(err) => return err.into(),
        };

        let messages = body
            .get("messages")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if messages.is_empty() {
            return ToolOutcome::Success("No messages found in this channel.".to_string());
        }
        // Slack returns newest first.
        let lines: Vec<String> = messages.iter().rev().map(format_message).collect();
        ToolOutcome::Success(lines.join("\n"))
    }
}
