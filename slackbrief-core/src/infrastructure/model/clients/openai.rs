//! OpenAI-compatible client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ModelProviderConfig;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::factory::resolve_api_key;
use crate::infrastructure::model::traits::ModelClient;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};
use crate::types::ToolCall;

/// OpenAI-compatible client (works with OpenAI, Mistral, Groq, vLLM, etc.)
#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
    api_path: String,
}

impl OpenAIClient {
    pub fn from_config(config: &ModelProviderConfig, timeout: Duration) -> Self {
        let api_key = resolve_api_key(&config.id, config.api_key.as_deref());
        Self {
            base: HttpClientBase::new(config.id.clone(), config.endpoint.clone(), api_key, timeout),
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| "/v1/chat/completions".to_string()),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAIClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(&self.api_path);

        let tools: Vec<Value> = request.tools.iter().map(|t| t.to_openai_tool()).collect();
        let payload = OpenAIRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_openai_format(&request.messages),
            tool_choice: (!tools.is_empty()).then_some("auto"),
            tools,
            max_tokens: request.max_tokens,
            stream: false,
        };

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending request to OpenAI-compatible provider"
        );

        let response: OpenAIResponse = self.base.post_with_bearer(&url, &payload).await?;
        debug!("Received response from OpenAI-compatible provider");

        let message = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing message"))?;

        let calls: Vec<ToolCall> = message
            .tool_calls
            .into_iter()
            .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
            .collect();

        if calls.is_empty() && message.content.is_none() {
            debug!("Provider returned neither content nor tool calls");
        }

        Ok(ModelResponse::tool_calls(message.content, calls))
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    tool_calls: Vec<OpenAIToolCall>,
}

#[derive(Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunctionCall,
}

#[derive(Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    arguments: String,
}

/// Providers send explicit `null` where the field is simply absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelInfo;
    use crate::types::{ChatMessage, FunctionSpec};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, key: Option<&str>) -> OpenAIClient {
        let config = ModelProviderConfig {
            id: "openai".into(),
            provider_type: "openai".into(),
            endpoint: server.uri(),
            api_key: None,
            api_path: None,
            models: vec![ModelInfo {
                name: "gpt-4-turbo".into(),
                display_name: None,
            }],
        };
        let mut client = OpenAIClient::from_config(&config, Duration::from_secs(5));
        client.base.api_key = key.map(str::to_string);
        client
    }

    fn request(tools: Vec<FunctionSpec>) -> ModelRequest {
        ModelRequest {
            provider: "openai".into(),
            model: "gpt-4-turbo".into(),
            messages: vec![ChatMessage::user("What's the weather in CA?")],
            tools,
            max_tokens: Some(1000),
        }
    }

    #[tokio::test]
    async fn parses_tool_calls_and_sends_auto_tool_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "tool_choice": "auto",
                "max_tokens": 1000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_123",
                            "type": "function",
                            "function": {"name": "get_alerts", "arguments": "{\"state\":\"CA\"}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("sk-test"));
        let tool = FunctionSpec {
            name: "get_alerts".into(),
            description: "Get weather alerts".into(),
            parameters: json!({"type": "object"}),
        };

        let response = client.chat(request(vec![tool])).await.expect("chat succeeds");

        assert!(response.message.content.is_none());
        let received = server.received_requests().await.unwrap_or_default();
        let body: Value = serde_json::from_slice(&received[0].body).expect("json body");
        assert_eq!(body["tools"][0]["function"]["name"], "get_alerts");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(
            response.message.tool_calls,
            vec![ToolCall::new("call_123", "get_alerts", r#"{"state":"CA"}"#)]
        );
    }

    #[tokio::test]
    async fn parses_plain_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "All quiet."}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("sk-test"));
        let response = client.chat(request(Vec::new())).await.expect("chat succeeds");

        assert_eq!(response.message.text(), "All quiet.");
        assert!(response.message.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn null_tool_calls_read_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "hi", "tool_calls": null}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("sk-test"));
        let response = client.chat(request(Vec::new())).await.expect("chat succeeds");

        assert_eq!(response.message.text(), "hi");
        assert!(response.message.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn null_arguments_read_as_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "slack_list_channels", "arguments": null}
                    }]
                }}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("sk-test"));
        let response = client.chat(request(Vec::new())).await.expect("chat succeeds");

        assert_eq!(
            response.message.tool_calls,
            vec![ToolCall::new("call_9", "slack_list_channels", "")]
        );
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_network() {
        let server = MockServer::start().await;
        let client = client_for(&server, None);

        let result = client.chat(request(Vec::new())).await;

        assert!(matches!(result, Err(ModelError::MissingApiKey { .. })));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn http_errors_surface_as_network_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("sk-test"));
        let result = client.chat(request(Vec::new())).await;

        assert!(matches!(result, Err(ModelError::Network { .. })));
    }

    #[tokio::test]
    async fn empty_choices_are_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("sk-test"));
        let result = client.chat(request(Vec::new())).await;

        assert!(matches!(result, Err(ModelError::InvalidResponse { .. })));
    }
}
