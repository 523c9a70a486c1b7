use serde_json::{json, Value};
use std::collections::HashMap;

use super::protocol::{
    CallToolParams, CallToolResult, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION,
    PROTOCOL_VERSION,
};
use super::tool::McpTool;
use crate::error::GatewayError;

pub const SERVER_NAME: &str = "headless-agents";

pub struct McpServer {
    tools: HashMap<String, Box<dyn McpTool>>,
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl McpServer {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register_tool(&mut self, tool: Box<dyn McpTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Handles one line from the local channel. Returns `None` for
    /// notifications, which get no response.
    pub async fn handle_message(&self, payload: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(payload) {
            Ok(value) => {
                let raw_id = value.get("id").cloned().filter(is_valid_id).unwrap_or(Value::Null);
                match serde_json::from_value::<JsonRpcRequest>(value) {
                    Ok(req) => self.handle_request(req).await?,
                    Err(e) => {
                        let err = GatewayError::InvalidRequest(e.to_string());
                        log::error!("[MCP Error] {}", err);
                        JsonRpcResponse::failure(raw_id, &err)
                    }
                }
            }
            Err(e) => {
                log::error!("[MCP Error] failed to parse message: {}", e);
                JsonRpcResponse::failure(Value::Null, &GatewayError::Parse(e.to_string()))
            }
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                log::error!("[MCP Error] failed to serialize response: {}", e);
                None
            }
        }
    }

    async fn handle_request(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // JSON-RPC 2.0: notifications carry no id and get no response
        let Some(id) = req.id else {
            log::debug!("MCP notification received: {}", req.method);
            return None;
        };

        if !is_valid_id(&id) {
            let err = GatewayError::InvalidRequest("id must be a string or number".into());
            log::error!("[MCP Error] {}", err);
            return Some(JsonRpcResponse::failure(Value::Null, &err));
        }

        if req.jsonrpc != JSONRPC_VERSION {
            let err = GatewayError::InvalidRequest(format!(
                "unsupported jsonrpc version {:?}",
                req.jsonrpc
            ));
            log::error!("[MCP Error] {}", err);
            return Some(JsonRpcResponse::failure(id, &err));
        }

        let result = match req.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {}, "resources": {}, "prompts": {} },
                "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            "tools/call" => self.handle_tool_call(req.params).await,
            _ => Err(GatewayError::MethodNotFound(req.method.clone())),
        };

        Some(match result {
            Ok(res) => JsonRpcResponse::success(id, res),
            Err(err) => {
                log::error!("[MCP Error] {} failed: {}", req.method, err);
                JsonRpcResponse::failure(id, &err)
            }
        })
    }

    fn list_tools(&self) -> Value {
        let mut tool_list: Vec<Value> = self
            .tools
            .values()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "inputSchema": t.input_schema()
                })
            })
            .collect();
        tool_list.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
        json!({ "tools": tool_list })
    }

    async fn handle_tool_call(&self, params: Option<Value>) -> Result<Value, GatewayError> {
        let params = params.ok_or(GatewayError::MissingParams)?;
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| GatewayError::InvalidArguments(e.to_string()))?;

        let tool = self
            .tools
            .get(&params.name)
            .ok_or_else(|| GatewayError::UnknownTool(params.name.clone()))?;

        let text = tool.call(params.arguments.unwrap_or_else(|| json!({}))).await?;

        serde_json::to_value(CallToolResult::text(text))
            .map_err(|e| GatewayError::Upstream(e.into()))
    }
}

fn is_valid_id(id: &Value) -> bool {
    id.is_string() || id.is_number()
}
