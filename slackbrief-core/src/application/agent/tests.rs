use super::*;
use crate::application::tooling::{ToolDescriptor, ToolHost, ToolInvokeError, ToolResult};
use crate::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use crate::types::{FunctionSpec, MessageRole, ToolCall};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
struct ScriptedProvider {
    responses: Arc<Mutex<VecDeque<ModelResponse>>>,
    recordings: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn requests(&self) -> Vec<ModelRequest> {
        self.recordings.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.recordings.lock().await.push(request.clone());
        self.responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| ModelError::invalid_response("scripted", "script exhausted"))
    }
}

enum Reply {
    Ok(ToolResult),
    Rejected,
    Broken,
}

struct StubHost {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl StubHost {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn answering(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|text| Reply::Ok(ToolResult::success(*text)))
                .collect(),
        )
    }

    async fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ToolHost for StubHost {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        Ok(Vec::new())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult, ToolInvokeError> {
        self.calls.lock().await.push((name.to_string(), arguments));
        match self.replies.lock().await.pop_front() {
            Some(Reply::Ok(result)) => Ok(result),
            Some(Reply::Rejected) => Err(ToolInvokeError::Rpc {
                server: "stub".into(),
                code: -32602,
                message: format!("Unknown tool: {name}"),
            }),
            Some(Reply::Broken) | None => Err(ToolInvokeError::Terminated {
                server: "stub".into(),
            }),
        }
    }
}

fn catalog() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec {
            name: "slack_get_messages".into(),
            description: "Read channel history".into(),
            parameters: json!({"type": "object", "properties": {"channel_id": {"type": "string"}}}),
        },
        FunctionSpec {
            name: "get_alerts".into(),
            description: "Weather alerts".into(),
            parameters: json!({"type": "object", "properties": {"state": {"type": "string"}}}),
        },
    ]
}

fn options(max_turns: usize) -> AgentOptions {
    AgentOptions {
        max_turns,
        ..AgentOptions::default()
    }
}

#[tokio::test]
async fn agent_returns_final_response_without_tools() {
    let provider = ScriptedProvider::new(vec![ModelResponse::text("It was a quiet day.")]);
    let host = StubHost::answering(&[]);
    let tools = catalog();
    let agent = Agent::new(&provider, &host, &tools);

    let outcome = agent
        .run("Summarize #general", &AgentOptions::default())
        .await
        .expect("agent succeeds");

    assert_eq!(outcome.render(), "It was a quiet day.");
    assert_eq!(outcome.response, "It was a quiet day.");
    assert_eq!(outcome.turns, 1);
    assert!(outcome.steps.is_empty());
    assert!(host.calls().await.is_empty());

    let records = provider.requests().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].messages.len(), 1);
    assert_eq!(records[0].messages[0].role, MessageRole::User);
    assert_eq!(records[0].messages[0].text(), "Summarize #general");
    assert_eq!(records[0].tools, tools);
    assert_eq!(records[0].max_tokens, Some(1000));
    assert_eq!(records[0].model, "gpt-4-turbo");
}

#[tokio::test]
async fn empty_final_reply_renders_as_empty_string() {
    let provider = ScriptedProvider::new(vec![ModelResponse::tool_calls(None, Vec::new())]);
    let host = StubHost::answering(&[]);
    let agent = Agent::new(&provider, &host, &[]);

    let outcome = agent.run("hi", &AgentOptions::default()).await.expect("agent succeeds");
    assert_eq!(outcome.render(), "");
    assert_eq!(outcome.response, "");
}

#[tokio::test]
async fn agent_dispatches_every_tool_call_in_order() {
    let provider = ScriptedProvider::new(vec![
        ModelResponse::tool_calls(
            None,
            vec![
                ToolCall::new("call_1", "slack_get_messages", r#"{"channel_id": "C1"}"#),
                ToolCall::new("call_2", "get_alerts", r#"{"state":"CA"}"#),
            ],
        ),
        ModelResponse::text("12 messages, mostly upbeat."),
    ]);
    let host = StubHost::answering(&["[2024-05-01 09:00:00 UTC] U1: hi", "No active alerts for this state."]);
    let tools = catalog();
    let agent = Agent::new(&provider, &host, &tools);

    let outcome = agent
        .run("Summarize #general", &AgentOptions::default())
        .await
        .expect("agent succeeds");

    assert_eq!(
        outcome.render(),
        "[Calling tool slack_get_messages with args {\"channel_id\":\"C1\"}]\n\
         [Calling tool get_alerts with args {\"state\":\"CA\"}]\n\
         12 messages, mostly upbeat."
    );
    assert_eq!(outcome.turns, 2);
    assert_eq!(outcome.steps.len(), 2);
    assert!(outcome.steps.iter().all(|step| step.success));

    let calls = host.calls().await;
    assert_eq!(
        calls,
        vec![
            ("slack_get_messages".to_string(), json!({"channel_id": "C1"})),
            ("get_alerts".to_string(), json!({"state": "CA"})),
        ]
    );

    let records = provider.requests().await;
    assert_eq!(records.len(), 2);
    let second = &records[1].messages;
    assert_eq!(second.len(), 1 + 1 + 2);
    assert_eq!(second[1].role, MessageRole::Assistant);
    assert_eq!(second[1].tool_calls.len(), 2);
    assert_eq!(second[2].role, MessageRole::Tool);
    assert_eq!(second[2].tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(second[2].text(), "[2024-05-01 09:00:00 UTC] U1: hi");
    assert_eq!(second[3].tool_call_id.as_deref(), Some("call_2"));
    assert_eq!(outcome.messages.len(), 5);
}

#[tokio::test]
async fn tool_errors_become_failed_steps_and_reach_the_model() {
    let provider = ScriptedProvider::new(vec![
        ModelResponse::tool_calls(None, vec![ToolCall::new("c1", "get_alerts", r#"{"state":"ZZ"}"#)]),
        ModelResponse::text("Could not read alerts."),
    ]);
    let host = StubHost::new(vec![Reply::Ok(ToolResult::failure(
        "Unable to fetch alerts or no alerts found.",
    ))]);
    let tools = catalog();
    let agent = Agent::new(&provider, &host, &tools);

    let outcome = agent.run("alerts?", &AgentOptions::default()).await.expect("agent succeeds");

    assert_eq!(outcome.failed_steps(), 1);
    assert!(!outcome.steps[0].success);
    let records = provider.requests().await;
    assert_eq!(
        records[1].messages[2].text(),
        "Unable to fetch alerts or no alerts found."
    );
}

#[tokio::test]
async fn malformed_arguments_skip_the_host() {
    let provider = ScriptedProvider::new(vec![
        ModelResponse::tool_calls(None, vec![ToolCall::new("c1", "get_alerts", "{state: CA")]),
        ModelResponse::text("Sorry."),
    ]);
    let host = StubHost::answering(&[]);
    let tools = catalog();
    let agent = Agent::new(&provider, &host, &tools);

    let outcome = agent.run("alerts?", &AgentOptions::default()).await.expect("agent succeeds");

    assert!(host.calls().await.is_empty());
    assert_eq!(outcome.transcript[0], "[Calling tool get_alerts with args {state: CA]");
    assert!(!outcome.steps[0].success);
    assert!(outcome.steps[0].output.contains("invalid arguments"));

    let records = provider.requests().await;
    assert_eq!(records[1].messages[2].tool_call_id.as_deref(), Some("c1"));
    assert!(records[1].messages[2].text().contains("invalid arguments"));
}

#[tokio::test]
async fn empty_argument_blob_is_sent_as_empty_object() {
    let provider = ScriptedProvider::new(vec![
        ModelResponse::tool_calls(None, vec![ToolCall::new("c1", "slack_list_channels", "")]),
        ModelResponse::text("done"),
    ]);
    let host = StubHost::answering(&["#general (C1)"]);
    let agent = Agent::new(&provider, &host, &[]);

    let outcome = agent.run("channels", &AgentOptions::default()).await.expect("agent succeeds");

    assert_eq!(host.calls().await[0].1, json!({}));
    assert_eq!(outcome.transcript[0], "[Calling tool slack_list_channels with args {}]");
}

#[tokio::test]
async fn rejected_calls_are_fed_back_to_the_model() {
    let provider = ScriptedProvider::new(vec![
        ModelResponse::tool_calls(None, vec![ToolCall::new("c1", "get_weather", "{}")]),
        ModelResponse::text("That tool does not exist."),
    ]);
    let host = StubHost::new(vec![Reply::Rejected]);
    let agent = Agent::new(&provider, &host, &[]);

    let outcome = agent.run("weather", &AgentOptions::default()).await.expect("agent succeeds");

    assert_eq!(outcome.response, "That tool does not exist.");
    assert!(!outcome.steps[0].success);
    assert!(outcome.steps[0].output.contains("Unknown tool: get_weather"));
}

#[tokio::test]
async fn transport_failures_abort_the_run() {
    let provider = ScriptedProvider::new(vec![ModelResponse::tool_calls(
        None,
        vec![ToolCall::new("c1", "get_alerts", r#"{"state":"CA"}"#)],
    )]);
    let host = StubHost::new(vec![Reply::Broken]);
    let agent = Agent::new(&provider, &host, &[]);

    let err = agent
        .run("alerts", &AgentOptions::default())
        .await
        .expect_err("transport failure aborts");

    assert!(matches!(err, AgentError::Tool { ref tool, .. } if tool == "get_alerts"));
}

#[tokio::test]
async fn provider_failures_abort_the_run() {
    let provider = ScriptedProvider::new(Vec::new());
    let host = StubHost::answering(&[]);
    let agent = Agent::new(&provider, &host, &[]);

    let err = agent.run("hi", &AgentOptions::default()).await.expect_err("provider fails");
    assert!(matches!(err, AgentError::Model(ModelError::InvalidResponse { .. })));
}

#[tokio::test]
async fn turn_budget_is_enforced() {
    let looping = || {
        ModelResponse::tool_calls(None, vec![ToolCall::new("c", "get_alerts", r#"{"state":"CA"}"#)])
    };
    let provider = ScriptedProvider::new(vec![looping(), looping(), looping()]);
    let host = StubHost::answering(&["none", "none", "none"]);
    let agent = Agent::new(&provider, &host, &[]);

    let err = agent.run("loop", &options(2)).await.expect_err("budget exhausted");

    match err {
        AgentError::TurnBudgetExhausted { max_turns, tool_calls } => {
            assert_eq!(max_turns, 2);
            assert_eq!(tool_calls, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(provider.requests().await.len(), 2);
}

#[test]
fn options_follow_config() {
    let config = crate::config::AppConfig {
        model: "gpt-4o".into(),
        max_tokens: 256,
        max_turns: 4,
        ..crate::config::AppConfig::default()
    };
    let options = AgentOptions::from_config(&config);
    assert_eq!(options.model, "gpt-4o");
    assert_eq!(options.max_tokens, Some(256));
    assert_eq!(options.max_turns, 4);
    assert_eq!(options.provider, "openai");
}
