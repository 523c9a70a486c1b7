use std::sync::Arc;

use env_logger::{Env, Target};
use headless_agents_mcp::{init_mcp_gateway, Config, StdioLink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志，stdout 只留给协议帧
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .init();

    // 只读取工作目录下的 .env，不向上级目录查找；不存在时忽略
    if let Err(e) = dotenvy::from_path(".env") {
        if !e.not_found() {
            log::warn!("Failed to load .env: {}", e);
        }
    }

    // 缺少 API key 时直接退出，不打开 stdio 通道
    let config = Config::from_env()?;

    let mcp_server = Arc::new(init_mcp_gateway(&config)?);

    let link = StdioLink::new(tokio::io::stdin(), tokio::io::stdout(), mcp_server);
    log::info!("Headless Agents MCP server running on stdio");
    link.run().await?;

    log::info!("Headless Agents MCP server stopped");
    Ok(())
}
