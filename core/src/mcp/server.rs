/// MCP server over newline-delimited JSON-RPC 2.0
///
/// Each request line is handled on its own task so a long `speak` never
/// blocks `ping` or discovery calls; responses funnel through a single
/// writer task to keep lines intact.
use super::types::*;
use crate::tools::{ToolError, ToolRegistry};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "VocalizeAgent";

#[derive(Clone)]
pub struct McpServer {
    registry: ToolRegistry,
    info: Arc<ServerInfo>,
    instructions: Option<String>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            info: Arc::new(ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<(), McpError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until the reader reaches EOF. In-flight requests are allowed
    /// to finish and their responses are flushed before returning.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), McpError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        info!(target: "mcp_server", server = %self.info.name, "MCP server listening");

        let (tx, mut rx) = mpsc::channel::<String>(64);
        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let mut lines = BufReader::new(reader).lines();
        let mut handlers = Vec::new();
        let read_result = loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(e) => break Err(McpError::Transport(e.to_string())),
            };
            if line.trim().is_empty() {
                continue;
            }

            let server = self.clone();
            let tx = tx.clone();
            handlers.push(tokio::spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    match serde_json::to_string(&response) {
                        Ok(encoded) => {
                            let _ = tx.send(encoded).await;
                        }
                        Err(e) => warn!(target: "mcp_server", error = %e, "Failed to encode response"),
                    }
                }
            }));
            handlers.retain(|h| !h.is_finished());
        };

        for handle in handlers {
            let _ = handle.await;
        }
        drop(tx);

        match writer_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(McpError::Io(e)),
            Err(e) => return Err(McpError::Transport(e.to_string())),
        }

        info!(target: "mcp_server", "MCP client disconnected");
        read_result
    }

    /// Handle one raw line. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(target: "mcp_server", error = %e, "Unparseable request");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let id = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ));
            }
        };

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(target: "mcp_server", method = %request.method, "Handling request");

        if request.jsonrpc != "2.0" {
            let err = McpError::Protocol(format!(
                "jsonrpc must be \"2.0\", got \"{}\"",
                request.jsonrpc
            ));
            warn!(target: "mcp_server", code = err.code(), error = %err, "Rejected request");
            return request
                .id
                .map(|id| JsonRpcResponse::failure(id, err.rpc_code(), err.to_string()));
        }

        let Some(id) = request.id else {
            match request.method.as_str() {
                "notifications/initialized" => {
                    info!(target: "mcp_server", "Client initialized");
                }
                other => debug!(target: "mcp_server", method = %other, "Ignoring notification"),
            }
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(request.params).await,
            other => {
                return Some(JsonRpcResponse::failure(
                    id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {}", other),
                ));
            }
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                debug!(target: "mcp_server", code = e.code(), error = %e, "Request failed");
                JsonRpcResponse::failure(id, e.rpc_code(), e.to_string())
            }
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = match params {
            Some(p) => serde_json::from_value(p)
                .map_err(|e| McpError::InvalidParams(e.to_string()))?,
            None => InitializeParams::default(),
        };

        let version = negotiate_protocol_version(params.protocol_version.as_deref());
        if let Some(client) = &params.client_info {
            info!(
                target: "mcp_server",
                client = %client.name,
                client_version = %client.version,
                protocol = version,
                "MCP client connected"
            );
        }

        let result = InitializeResult {
            protocol_version: version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                experimental: None,
            },
            server_info: (*self.info).clone(),
            instructions: self.instructions.clone(),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn list_tools(&self) -> Result<Value, McpError> {
        let tools = self
            .registry
            .list_tools()
            .iter()
            .map(|tool| McpTool {
                name: tool.name(),
                description: Some(tool.description()),
                input_schema: tool.parameters(),
            })
            .collect();
        Ok(serde_json::to_value(ListToolsResult {
            tools,
            next_cursor: None,
        })?)
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: CallToolParams = serde_json::from_value(
            params.ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?,
        )
        .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let arguments = params
            .arguments
            .unwrap_or_else(|| Value::Object(Default::default()));

        let result = match self.registry.call(&params.name, arguments).await {
            Ok(Value::String(text)) => McpToolCall::text(text, false),
            Ok(other) => McpToolCall::text(other.to_string(), false),
            Err(ToolError::NotFound(name)) => return Err(McpError::ToolNotFound(name)),
            Err(e) => McpToolCall::text(e.to_string(), true),
        };
        Ok(serde_json::to_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tool, ToolResult};
    use async_trait::async_trait;
    use serde_json::json;

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> String {
            "upper".into()
        }

        fn description(&self) -> String {
            "Uppercase text".into()
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        async fn call(&self, arguments: Value) -> ToolResult<Value> {
            let text = arguments
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidArguments("text is required".into()))?;
            Ok(Value::String(text.to_uppercase()))
        }
    }

    async fn server() -> McpServer {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(UpperTool)).await;
        McpServer::new(registry)
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let server = server().await;
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"0"}}}"#)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "VocalizeAgent");
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let server = server().await;
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn parse_errors_use_null_id() {
        let server = server().await;
        let resp = server.handle_line("{not json").await.unwrap();
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn unknown_method() {
        let server = server().await;
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(resp.id, json!("a"));
        assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn tool_call_returns_text_content() {
        let server = server().await;
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"upper","arguments":{"text":"hi"}}}"#)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["content"][0]["text"], "HI");
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn tool_argument_errors_are_flagged() {
        let server = server().await;
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"upper","arguments":{}}}"#)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let server = server().await;
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope"}}"#)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn wrong_jsonrpc_version_is_invalid_request() {
        let server = server().await;
        let resp = server
            .handle_line(r#"{"jsonrpc":"1.0","id":5,"method":"ping"}"#)
            .await
            .unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_REQUEST);
        assert!(error.message.starts_with("Protocol error: jsonrpc must be \"2.0\""));

        let silent = server
            .handle_line(r#"{"jsonrpc":"1.0","method":"notifications/initialized"}"#)
            .await;
        assert!(silent.is_none());
    }

    struct ClosedWriter;

    impl AsyncWrite for ClosedWriter {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn closed_output_is_an_io_error() {
        let server = server().await;
        let input: &'static [u8] = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n";
        let err = server.serve(input, ClosedWriter).await.unwrap_err();
        assert!(matches!(err, McpError::Io(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe));
    }
}
