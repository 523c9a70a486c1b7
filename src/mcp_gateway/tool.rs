use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::agent_client::AgentClient;
use crate::error::GatewayError;

#[async_trait]
pub trait McpTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    /// Returns the text placed in the single `text` content block.
    async fn call(&self, arguments: Value) -> Result<String, GatewayError>;
}

pub const CALL_AGENT: &str = "call_agent";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CallAgentArgs {
    pub agent_id: String,
    pub request: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl CallAgentArgs {
    pub fn parse(arguments: Value) -> Result<Self, GatewayError> {
        let args: Self = serde_json::from_value(arguments)
            .map_err(|e| GatewayError::InvalidArguments(e.to_string()))?;
        if args.agent_id.is_empty() {
            return Err(GatewayError::InvalidArguments("agent_id must not be empty".into()));
        }
        if args.request.is_empty() {
            return Err(GatewayError::InvalidArguments("request must not be empty".into()));
        }
        Ok(args)
    }
}

/// The one tool this gateway exposes: forwards a request to a Headless Agent.
pub struct CallAgentTool {
    client: AgentClient,
}

impl CallAgentTool {
    pub fn new(client: AgentClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl McpTool for CallAgentTool {
    fn name(&self) -> &str {
        CALL_AGENT
    }

    fn description(&self) -> &str {
        "Call a Headless Agent with a request"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "agent_id": {
                    "type": "string",
                    "description": "The ID of the agent to call"
                },
                "request": {
                    "type": "string",
                    "description": "The request message to send to the agent"
                },
                "conversation_id": {
                    "type": "string",
                    "description": "Optional conversation ID for continuing conversations"
                }
            },
            "required": ["agent_id", "request"]
        })
    }

    async fn call(&self, arguments: Value) -> Result<String, GatewayError> {
        let args = CallAgentArgs::parse(arguments)?;

        let data = self
            .client
            .call_agent(&args.agent_id, &args.request, args.conversation_id.as_deref())
            .await?;

        serde_json::to_string_pretty(&data).map_err(|e| GatewayError::Upstream(e.into()))
    }
}
