pub mod protocol;
pub mod server;
pub mod tool;

pub use server::McpServer;
pub use tool::{CallAgentArgs, CallAgentTool, McpTool};

use crate::agent_client::AgentClient;
use crate::config::Config;
use crate::error::GatewayError;

pub fn init_mcp_gateway(config: &Config) -> Result<McpServer, GatewayError> {
    let client = AgentClient::new(config)?;
    let mut server = McpServer::new();
    let tool = CallAgentTool::new(client);
    let tool_name = tool.name().to_string();
    server.register_tool(Box::new(tool));
    log::info!("Registered MCP Tool: {}", tool_name);
    Ok(server)
}
