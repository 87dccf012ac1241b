//! Newline-delimited JSON-RPC loop speaking MCP over a byte stream.

use crate::rpc::types::{RpcRequest, RpcResponse};
use crate::tools::ToolRegistry;
use serde_json::{Value, json};
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// Used when the client does not state a protocol version.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

pub struct McpServer {
    name: String,
    version: String,
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            registry,
        }
    }

    /// Serve requests one at a time until the reader reaches EOF.
    ///
    /// A frame that is not valid UTF-8 gets a parse error reply and the
    /// loop moves on to the next line.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(tools = self.registry.len(), "MCP server ready on stdio");
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let response = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    self.handle_line(trimmed).await
                }
                Err(err) => {
                    warn!(error = %err, "Received frame that is not UTF-8");
                    Some(RpcResponse::parse_error(format!("Parse error: {err}")))
                }
            };
            if let Some(response) = response {
                let mut frame = serde_json::to_string(&response).map_err(io::Error::other)?;
                frame.push('\n');
                writer.write_all(frame.as_bytes()).await?;
                writer.flush().await?;
            }
        }
        info!("Client closed the connection");
        Ok(())
    }

    /// Handle one frame. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "Received malformed JSON");
                return Some(RpcResponse::parse_error(format!("Parse error: {err}")));
            }
        };

        if value.get("method").is_none() {
            // A response to a request we never send; nothing to answer.
            debug!("Ignoring message without a method");
            return None;
        }

        let id = value.get("id").cloned().filter(|id| !id.is_null());
        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(err) => {
                return id.map(|id| RpcResponse::invalid_request(Some(id), format!("Invalid request: {err}")));
            }
        };

        if request.jsonrpc != "2.0" {
            return request.id.map(|id| {
                RpcResponse::invalid_request(Some(id), "Unsupported jsonrpc version (expected 2.0)")
            });
        }

        if request.is_notification() {
            debug!(method = %request.method, "Received notification");
            return None;
        }

        Some(self.dispatch(request).await)
    }

    async fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        debug!(method = %request.method, "Received JSON-RPC request");
        let id = request.id.clone();
        match request.method.as_str() {
            "initialize" => RpcResponse::success(id, self.initialize_result(request.params.as_ref())),
            "ping" => RpcResponse::success(id, json!({})),
            "tools/list" => RpcResponse::success(id, self.list_tools()),
            "tools/call" => self.call_tool(id, request.params).await,
            other => {
                warn!(method = other, "Unknown JSON-RPC method");
                RpcResponse::method_not_found(id, other)
            }
        }
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        let version = params
            .and_then(|params| params.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);
        let client = params
            .and_then(|params| params.pointer("/clientInfo/name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!(client, protocol = version, "Client initialized session");
        json!({
            "protocolVersion": version,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": self.name, "version": self.version},
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self.registry.specs().iter().map(|spec| spec.to_mcp()).collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, id: Option<Value>, params: Option<Value>) -> RpcResponse {
        let Some(Value::Object(mut params)) = params else {
            return RpcResponse::invalid_params(id, "params must be an object with a tool name");
        };
        let Some(name) = params.get("name").and_then(Value::as_str).map(str::to_string) else {
            return RpcResponse::invalid_params(id, "params.name must be a string");
        };
        let Some(handler) = self.registry.get(&name) else {
            error!(tool = %name, "Unknown tool requested");
            return RpcResponse::invalid_params(id, format!("Unknown tool: {name}"));
        };

        let arguments = params.remove("arguments").unwrap_or_else(|| json!({}));
        info!(tool = %name, "Calling tool");
        let outcome = handler.call(arguments).await;
        if outcome.is_failure() {
            warn!(tool = %name, message = outcome.text(), "Tool call failed");
        }
        RpcResponse::success(id, outcome.into_call_result())
    }
}
