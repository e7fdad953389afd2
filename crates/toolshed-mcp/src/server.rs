//! MCP Server implementation
//!
//! Reads one JSON-RPC message per line from stdin and writes one response
//! per line to stdout. Notifications get no response.

use std::io::{BufRead, Write};

use chrono::Local;
use serde_json::{Value, json};

use crate::context::ServerContext;
use crate::handlers::handle_tool_call;
use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, LoggingCapability, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
    ReadResourceParams, ResourcesCapability, ServerCapabilities, ServerInfo, ToolCallParams,
    ToolsCapability,
};
use crate::resource_handlers::read_resource;
use crate::resources::get_resource_definitions;
use crate::tools::{ToolDefinition, ToolResult, get_tool_definitions};
use crate::{Error, Result};

/// MCP server over the vault, credential rotation and the LLM router
///
/// # Example
///
/// ```ignore
/// use toolshed_core::SettingsLoader;
/// use toolshed_mcp::{ServerContext, ToolshedMcpServer};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = SettingsLoader::new().load()?;
///     let server = ToolshedMcpServer::new(ServerContext::from_settings(settings)?);
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct ToolshedMcpServer {
    context: ServerContext,
    tools: Vec<ToolDefinition>,
}

impl ToolshedMcpServer {
    pub fn new(context: ServerContext) -> Self {
        Self {
            context,
            tools: get_tool_definitions(),
        }
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        tracing::info!("MCP server ready, listening on stdio");

        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let response = match self.handle_message(line).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to handle message");
                    serde_json::to_string(&JsonRpcResponse::error(
                        None,
                        INTERNAL_ERROR,
                        format!("Internal error: {e}"),
                    ))?
                }
            };
            if !response.is_empty() {
                writeln!(stdout, "{response}")?;
                stdout.flush()?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle a single MCP message
    ///
    /// Returns the JSON-RPC response as a string, or an empty string for
    /// notifications. Malformed JSON yields a parse error response with a
    /// null id.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid JSON-RPC message");
                let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return Ok(String::new());
        }

        let response = if request.jsonrpc != "2.0" {
            JsonRpcResponse::error(
                request.id,
                INVALID_REQUEST,
                format!("Invalid Request: unsupported jsonrpc version '{}'", request.jsonrpc),
            )
        } else {
            match request.method.as_str() {
                "initialize" => self.handle_initialize(request.id)?,
                "ping" => JsonRpcResponse::success(request.id, json!({})),
                "tools/list" => self.handle_tools_list(request.id),
                "tools/call" => self.handle_tools_call(request.id, request.params).await?,
                "resources/list" => self.handle_resources_list(request.id),
                "resources/read" => self.handle_resources_read(request.id, request.params)?,
                _ => JsonRpcResponse::error(
                    request.id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                ),
            }
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    fn handle_initialize(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
                resources: ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                },
                logging: LoggingCapability {},
            },
            server_info: ServerInfo {
                name: "toolshed-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.tools }))
    }

    /// Tool failures become successful responses with `isError: true`.
    /// Unknown tools and malformed arguments are protocol errors.
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ));
            }
        };

        tracing::info!(tool = %params.name, "Tool call");
        match handle_tool_call(&self.context, &params.name, params.arguments).await {
            Ok(value) => {
                let text = match value {
                    Value::String(text) => text,
                    other => serde_json::to_string_pretty(&other)?,
                };
                Ok(JsonRpcResponse::success(id, serde_json::to_value(ToolResult::text(text))?))
            }
            Err(Error::UnknownTool(name)) => Ok(JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown tool: {name}"),
            )),
            Err(Error::InvalidArguments(message)) => Ok(JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Invalid arguments for {}: {message}", params.name),
            )),
            Err(e) => {
                tracing::warn!(tool = %params.name, error = %e, "Tool failed");
                let result = ToolResult::error(e.to_string());
                Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
            }
        }
    }

    fn handle_resources_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let resources = get_resource_definitions(Local::now().date_naive());
        JsonRpcResponse::success(id, json!({ "resources": resources }))
    }

    fn handle_resources_read(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let params: ReadResourceParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ));
            }
        };

        match read_resource(&self.context, &params.uri, Local::now().date_naive()) {
            Ok(content) => Ok(JsonRpcResponse::success(id, json!({ "contents": [content] }))),
            Err(e) => Ok(JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Resource error: {e}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use toolshed_rotation::{MemorySecretStore, RotationManager};
    use toolshed_router::{CompletionRequest, LlmClient, ModelSpec, Router};
    use toolshed_test_utils::TestVault;

    struct Silent;

    #[async_trait]
    impl LlmClient for Silent {
        async fn complete(
            &self,
            _model: &ModelSpec,
            _request: &CompletionRequest,
        ) -> toolshed_router::Result<String> {
            Ok(String::new())
        }
    }

    fn server(fixture: &TestVault) -> ToolshedMcpServer {
        let settings = fixture.settings();
        let rotation = RotationManager::from_settings(&settings.rotation)
            .with_store(Arc::new(MemorySecretStore::new("API_Keys")));
        let router = Router::with_client(&settings.router, Arc::new(Silent)).unwrap();
        ToolshedMcpServer::new(ServerContext::new(settings, rotation, router))
    }

    async fn call(server: &ToolshedMcpServer, request: &str) -> Value {
        serde_json::from_str(&server.handle_message(request).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let fixture = TestVault::new();
        let server = server(&fixture);

        let response = call(
            &server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#,
        )
        .await;
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], "toolshed-mcp");
        assert!(response["result"]["capabilities"]["logging"].is_object());
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let fixture = TestVault::new();
        let server = server(&fixture);

        for request in [
            r#"{"jsonrpc":"2.0","method":"initialized"}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","method":"tools/list"}"#,
            r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"check_rotation_status"}}"#,
        ] {
            assert!(server.handle_message(request).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_handle_tools_list() {
        let fixture = TestVault::new();
        let server = server(&fixture);

        let response = call(&server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 14);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[tokio::test]
    async fn test_ping() {
        let fixture = TestVault::new();
        let server = server(&fixture);
        let response = call(&server, r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#).await;
        assert_eq!(response["result"], json!({}));
        assert_eq!(response["id"], "p");
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let fixture = TestVault::new();
        let server = server(&fixture);
        let response = call(&server, r#"{"jsonrpc":"1.0","id":3,"method":"ping"}"#).await;
        assert_eq!(response["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_tool_failure_is_error_result() {
        let fixture = TestVault::new();
        let server = server(&fixture);

        let response = call(
            &server,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"get_note_content","arguments":{"path":"missing.md"}}}"#,
        )
        .await;
        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], true);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Note not found"), "{text}");
    }

    #[tokio::test]
    async fn test_resources_read_unknown() {
        let fixture = TestVault::new();
        let server = server(&fixture);

        let response = call(
            &server,
            r#"{"jsonrpc":"2.0","id":7,"method":"resources/read","params":{"uri":"vault://nowhere"}}"#,
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
    }
}
