//! Message adapters - convert between the internal history and provider formats

use crate::types::{ChatMessage, MessageRole, ToolCall};
use serde_json::{Map, Value, json};

/// Adapter for converting messages to different API formats
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to OpenAI chat-completions format.
    ///
    /// Assistant tool calls become `tool_calls` entries with the argument blob
    /// passed through as a string; tool results carry `tool_call_id`.
    pub fn to_openai_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                let mut entry = Map::new();
                entry.insert("role".into(), json!(msg.role.as_str()));
                entry.insert(
                    "content".into(),
                    msg.content.clone().map(Value::String).unwrap_or(Value::Null),
                );
                if !msg.tool_calls.is_empty() {
                    let calls = msg
                        .tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.arguments,
                                }
                            })
                        })
                        .collect();
                    entry.insert("tool_calls".into(), Value::Array(calls));
                }
                if let Some(id) = &msg.tool_call_id {
                    entry.insert("tool_call_id".into(), json!(id));
                }
                Value::Object(entry)
            })
            .collect()
    }

    /// Convert messages to Ollama `/api/chat` format.
    ///
    /// Ollama wants tool call arguments as an object and plain string content.
    pub fn to_ollama_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .enumerate()
            .map(|(position, msg)| {
                let mut entry = json!({
                    "role": msg.role.as_str(),
                    "content": msg.text(),
                });
                if !msg.tool_calls.is_empty() {
                    entry["tool_calls"] = Value::Array(
                        msg.tool_calls
                            .iter()
                            .map(|call| {
                                let arguments = serde_json::from_str::<Value>(&call.arguments)
                                    .unwrap_or_else(|_| json!({}));
                                json!({
                                    "function": {
                                        "name": call.name,
                                        "arguments": arguments,
                                    }
                                })
                            })
                            .collect(),
                    );
                }
                if msg.role == MessageRole::Tool {
                    if let Some(name) = Self::tool_name_for(&messages[..position], msg) {
                        entry["tool_name"] = json!(name);
                    }
                }
                entry
            })
            .collect()
    }

    /// Find the name of the call a tool-result message answers.
    ///
    /// Only the nearest assistant message before the result is searched:
    /// positional Ollama ids restart at `call_0` every turn.
    fn tool_name_for<'a>(earlier: &'a [ChatMessage], result: &ChatMessage) -> Option<&'a str> {
        let id = result.tool_call_id.as_deref()?;
        earlier
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant && !m.tool_calls.is_empty())?
            .tool_calls
            .iter()
            .find(|call| call.id == id)
            .map(|call| call.name.as_str())
    }

    /// Build internal tool calls from Ollama's response shape, where calls
    /// carry no id and arguments arrive as an object.
    pub fn from_ollama_tool_calls(calls: &[Value]) -> Vec<ToolCall> {
        calls
            .iter()
            .enumerate()
            .filter_map(|(index, call)| {
                let function = call.get("function")?;
                let name = function.get("name")?.as_str()?.to_string();
                let arguments = match function.get("arguments") {
                    Some(Value::String(raw)) => raw.clone(),
                    Some(value) => value.to_string(),
                    None => "{}".to_string(),
                };
                let id = call
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("call_{index}"));
                Some(ToolCall::new(id, name, arguments))
            })
            .collect()
    }
}
