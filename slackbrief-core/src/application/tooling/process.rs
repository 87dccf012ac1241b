use super::error::ToolInvokeError;
use super::interface::{ToolDescriptor, ToolHost, ToolResult};
use crate::config::ServerConfig;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Grace period for the server to exit after its stdin is closed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

type Responder = oneshot::Sender<Result<Value, ToolInvokeError>>;

/// One MCP session with a locally spawned server.
///
/// The child is spawned with kill-on-drop, so dropping the last handle (for
/// example when a run is cancelled) also terminates the server. Call
/// [`McpProcess::shutdown`] for an orderly exit.
#[derive(Clone)]
pub struct McpProcess {
    inner: Arc<McpProcessInner>,
}

struct McpProcessInner {
    server: ServerConfig,
    request_timeout: Duration,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: AsyncMutex<HashMap<String, Responder>>,
    id_counter: AtomicU64,
    closed: AtomicBool,
}

impl McpProcess {
    /// Spawn the server and complete the `initialize` handshake.
    pub async fn connect(
        server: ServerConfig,
        request_timeout: Duration,
    ) -> Result<Self, ToolInvokeError> {
        let inner = Arc::new(McpProcessInner {
            server,
            request_timeout,
            child: AsyncMutex::new(None),
            writer: AsyncMutex::new(None),
            pending: AsyncMutex::new(HashMap::new()),
            id_counter: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        });

        inner.spawn().await?;
        let process = Self { inner };
        if let Err(err) = process.inner.initialize_sequence().await {
            process.shutdown().await;
            return Err(err);
        }
        info!(server = %process.inner.server.name, "Connected to MCP server");
        Ok(process)
    }

    /// Close stdin, wait briefly for the server to exit, then kill it.
    pub async fn shutdown(&self) {
        self.inner.reset().await;
        debug!(server = %self.inner.server.name, "MCP session closed");
    }
}

#[async_trait]
impl ToolHost for McpProcess {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = match cursor.take() {
                Some(cursor) => json!({ "cursor": cursor }),
                None => json!({}),
            };
            let result = self.inner.send_request("tools/list", params).await?;
            if let Some(items) = result.get("tools").and_then(Value::as_array) {
                tools.extend(items.iter().filter_map(ToolDescriptor::from_mcp));
            }
            match result.get("nextCursor").and_then(Value::as_str) {
                Some(next) if !next.is_empty() => cursor = Some(next.to_string()),
                _ => break,
            }
        }

        debug!(
            server = %self.inner.server.name,
            count = tools.len(),
            "Fetched tool catalogue"
        );
        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult, ToolInvokeError> {
        let params = json!({
            "name": name,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            }
        });
        let result = self.inner.send_request("tools/call", params).await?;
        Ok(ToolResult::from_mcp(&result))
    }
}

impl McpProcessInner {
    async fn spawn(self: &Arc<Self>) -> Result<(), ToolInvokeError> {
        let mut command = Command::new(&self.server.command);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.server.workdir {
            command.current_dir(dir);
        }
        if !self.server.args.is_empty() {
            command.args(&self.server.args);
        }
        for (key, value) in &self.server.env {
            command.env(key, value);
        }

        debug!(
            server = %self.server.name,
            command = %self.server.command.display(),
            "Spawning MCP server"
        );
        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: self.server.name.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdout"))?;

        *self.writer.lock().await = Some(BufWriter::new(stdin));
        *self.child.lock().await = Some(child);

        let reader = Arc::downgrade(self);
        let name = self.server.name.clone();
        tokio::spawn(async move {
            reader_loop(reader, name, stdout).await;
        });

        Ok(())
    }

    async fn initialize_sequence(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "title": "slackbrief"
            },
            "capabilities": {}
        });
        let init_result = self.send_request("initialize", params).await?;
        if let Some(version) = init_result.get("protocolVersion").and_then(Value::as_str) {
            if version != PROTOCOL_VERSION {
                debug!(
                    server = %self.server.name,
                    version,
                    "Server negotiated a different protocol version"
                );
            }
        }
        self.send_notification("notifications/initialized", json!({}))
            .await
    }

    async fn process_inbound_message(&self, value: Value) -> Result<(), ToolInvokeError> {
        match (value.get("id").cloned(), value.get("method").is_some()) {
            (Some(id), true) => self.handle_server_request(id, value).await,
            (Some(id), false) => {
                self.handle_response(id, value).await;
                Ok(())
            }
            (None, true) => {
                if let Some(method) = value.get("method").and_then(Value::as_str) {
                    debug!(
                        server = %self.server.name,
                        method,
                        "received notification from server"
                    );
                }
                Ok(())
            }
            (None, false) => Ok(()),
        }
    }

    async fn handle_response(&self, id: Value, value: Value) {
        let Some(key) = response_key(&id) else {
            return;
        };

        let responder = self.pending.lock().await.remove(&key);
        let Some(sender) = responder else {
            debug!(
                server = %self.server.name,
                response_id = key,
                "received response for unknown request"
            );
            return;
        };

        let outcome = match value.get("error") {
            Some(error) => {
                let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32000);
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                Err(ToolInvokeError::Rpc {
                    server: self.server.name.clone(),
                    code,
                    message,
                })
            }
            None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
        };
        let _ = sender.send(outcome);
    }

    async fn handle_server_request(&self, id: Value, value: Value) -> Result<(), ToolInvokeError> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        match method {
            "ping" => {
                self.write_message(&json!({ "jsonrpc": "2.0", "id": id, "result": {} }))
                    .await
            }
            other => {
                warn!(
                    server = %self.server.name,
                    method = other,
                    "server sent unsupported request"
                );
                self.write_message(&json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {
                        "code": -32601,
                        "message": format!("client does not implement method '{other}'"),
                    }
                }))
                .await
            }
        }
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);
        if self.closed.load(Ordering::SeqCst) {
            self.pending.lock().await.remove(&id);
            return Err(ToolInvokeError::Terminated {
                server: self.server.name.clone(),
            });
        }

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        if let Err(err) = self.write_message(&payload).await {
            self.pending.lock().await.remove(&id);
            return Err(err);
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(ToolInvokeError::Cancelled {
                server: self.server.name.clone(),
            }),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(ToolInvokeError::Timeout {
                    server: self.server.name.clone(),
                    method: method.to_string(),
                    timeout: self.request_timeout,
                })
            }
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });
        self.write_message(&payload).await
    }

    async fn write_message(&self, message: &Value) -> Result<(), ToolInvokeError> {
        let mut encoded =
            serde_json::to_string(message).map_err(|source| ToolInvokeError::InvalidJson {
                server: self.server.name.clone(),
                source,
            })?;
        encoded.push('\n');

        let mut writer = self.writer.lock().await;
        let stream = writer
            .as_mut()
            .ok_or_else(|| self.transport_error("writer not initialised"))?;
        stream
            .write_all(encoded.as_bytes())
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|source| self.transport_error(source.to_string()))
    }

    async fn reset(&self) {
        // Dropping the writer closes the server's stdin.
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }

        let mut child = self.child.lock().await;
        if let Some(mut running) = child.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, running.wait()).await {
                Ok(Ok(status)) => {
                    debug!(server = %self.server.name, %status, "MCP server exited");
                }
                _ => {
                    if let Err(err) = running.kill().await {
                        debug!(
                            server = %self.server.name,
                            %err,
                            "failed to kill MCP server process (may have already exited)"
                        );
                    }
                }
            }
        }
        drop(child);

        self.fail_all_pending().await;
    }

    async fn fail_all_pending(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut pending = self.pending.lock().await;
        for (_, sender) in pending.drain() {
            let _ = sender.send(Err(ToolInvokeError::Terminated {
                server: self.server.name.clone(),
            }));
        }
    }

    fn next_id(&self) -> String {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("req-{id}")
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.server.name.clone(),
            message: message.into(),
        }
    }
}

/// Route server output to pending requests until stdout closes or the
/// session is dropped.
async fn reader_loop(inner: Weak<McpProcessInner>, server: String, stdout: ChildStdout) {
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(raw)) = lines.next_line().await {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('\u{1b}') {
            debug!(
                server = %server,
                line = trimmed,
                "skipping non-JSON ANSI log line from MCP server"
            );
            continue;
        }
        let Some(session) = inner.upgrade() else {
            break;
        };
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => {
                if let Err(err) = session.process_inbound_message(value).await {
                    warn!(
                        server = %server,
                        %err,
                        "failed to process message from MCP server"
                    );
                }
            }
            Err(source) => {
                warn!(
                    server = %server,
                    line = trimmed,
                    %source,
                    "received invalid JSON from MCP server"
                );
            }
        }
    }

    if let Some(session) = inner.upgrade() {
        session.fail_all_pending().await;
    }
    debug!(server = %server, "MCP server output closed");
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}
