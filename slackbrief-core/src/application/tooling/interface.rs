use super::error::ToolInvokeError;
use async_trait::async_trait;
use serde_json::Value;

/// Metadata for one tool as advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
}

impl ToolDescriptor {
    pub(crate) fn from_mcp(value: &Value) -> Option<Self> {
        let name = value.get("name")?.as_str()?.to_string();
        Some(Self {
            name,
            description: value
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            input_schema: value.get("inputSchema").cloned(),
        })
    }
}

/// Outcome of one `tools/call`, with failure as an explicit flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub text: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    /// Flatten an MCP `CallToolResult` into text.
    ///
    /// Text parts are joined with newlines; other content kinds are noted by
    /// type. `structuredContent` is used only when there is no `content`.
    pub fn from_mcp(result: &Value) -> Self {
        let is_error = result
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let parts: Vec<String> = result
            .get("content")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| match item.get("type").and_then(Value::as_str) {
                        Some("text") => item
                            .get("text")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        Some(kind) => format!("[{kind} content omitted]"),
                        None => item.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let text = if parts.is_empty() {
            result
                .get("structuredContent")
                .map(Value::to_string)
                .unwrap_or_default()
        } else {
            parts.join("\n")
        };

        Self { text, is_error }
    }
}

/// The two operations the conversation loop needs from a tool host.
#[async_trait]
pub trait ToolHost: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError>;

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult, ToolInvokeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_text_parts_and_reads_error_flag() {
        let result = ToolResult::from_mcp(&json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "image", "data": "...", "mimeType": "image/png"},
                {"type": "text", "text": "second"}
            ],
            "isError": true
        }));

        assert!(result.is_error);
        assert_eq!(result.text, "first\n[image content omitted]\nsecond");
    }

    #[test]
    fn falls_back_to_structured_content() {
        let result = ToolResult::from_mcp(&json!({"structuredContent": {"count": 3}}));
        assert!(!result.is_error);
        assert_eq!(result.text, r#"{"count":3}"#);
    }

    #[test]
    fn descriptor_requires_a_name() {
        assert!(ToolDescriptor::from_mcp(&json!({"description": "nameless"})).is_none());
        let descriptor = ToolDescriptor::from_mcp(&json!({
            "name": "get_alerts",
            "inputSchema": {"type": "object"}
        }))
        .expect("descriptor");
        assert_eq!(descriptor.name, "get_alerts");
        assert!(descriptor.description.is_none());
        assert_eq!(descriptor.input_schema, Some(json!({"type": "object"})));
    }
}
