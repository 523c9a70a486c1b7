//! Stdio MCP server exposing the Headless Agents `call` API as the
//! `call_agent` tool.

pub mod agent_client;
pub mod config;
pub mod error;
pub mod mcp_gateway;
pub mod stdio_link;

pub use config::Config;
pub use error::{ConfigError, GatewayError, UpstreamError};
pub use mcp_gateway::{init_mcp_gateway, McpServer};
pub use stdio_link::StdioLink;
