use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::mcp_gateway::McpServer;

/// Newline-delimited JSON-RPC over a reader/writer pair (stdin/stdout in
/// production). Every request runs on its own task; a single writer task
/// owns the output so frames never interleave.
pub struct StdioLink<R, W> {
    reader: R,
    writer: W,
    mcp_server: Arc<McpServer>,
}

impl<R, W> StdioLink<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, writer: W, mcp_server: Arc<McpServer>) -> Self {
        Self {
            reader,
            writer,
            mcp_server,
        }
    }

    /// Runs until the reader hits EOF, then waits for in-flight requests.
    pub async fn run(self) -> anyhow::Result<()> {
        let (tx_out, rx_out) = mpsc::channel::<String>(100);
        let writer_task = tokio::spawn(write_loop(self.writer, rx_out));

        let mut reader = BufReader::new(self.reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            // 非 UTF-8 帧按有损解码，交给 handle_message 返回 -32700
            let line = match std::str::from_utf8(&buf) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    log::error!("[MCP Error] frame is not valid UTF-8: {}", e);
                    String::from_utf8_lossy(&buf).trim().to_string()
                }
            };
            if line.is_empty() {
                continue;
            }

            let server = self.mcp_server.clone();
            let tx_out = tx_out.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    if let Err(e) = tx_out.send(response).await {
                        log::error!("[MCP Error] output channel closed: {}", e);
                    }
                }
            });
        }

        log::info!("stdin closed, draining pending responses");
        // 所有请求任务结束后发送端全部释放，写任务随之退出
        drop(tx_out);
        writer_task.await??;
        Ok(())
    }
}

async fn write_loop<W>(mut writer: W, mut rx_out: mpsc::Receiver<String>) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = rx_out.recv().await {
        writer.write_all(frame.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::mcp_gateway::McpTool;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    struct SlowTool;

    #[async_trait]
    impl McpTool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "Sleeps for the given number of milliseconds"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn call(&self, arguments: Value) -> Result<String, GatewayError> {
            let ms = arguments["ms"].as_u64().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(format!("slept {ms}"))
        }
    }

    async fn run_with_input(input: &str) -> Vec<Value> {
        run_with_bytes(input.as_bytes()).await
    }

    async fn run_with_bytes(input: &[u8]) -> Vec<Value> {
        let mut server = McpServer::new();
        server.register_tool(Box::new(SlowTool));

        let (out_writer, mut out_reader) = tokio::io::duplex(64 * 1024);
        let link = StdioLink::new(input, out_writer, Arc::new(server));
        link.run().await.unwrap();

        let mut output = String::new();
        out_reader.read_to_string(&mut output).await.unwrap();
        output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn answers_each_request_on_its_own_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#, "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#, "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"prompts/list"}"#, "\n",
        );
        let responses = run_with_input(input).await;
        assert_eq!(responses.len(), 3);

        let mut ids: Vec<i64> = responses.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn slow_call_does_not_block_later_requests() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":"slow","method":"tools/call","#,
            r#""params":{"name":"slow","arguments":{"ms":200}}}"#, "\n",
            r#"{"jsonrpc":"2.0","id":"fast","method":"ping"}"#, "\n",
        );
        let responses = run_with_input(input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], "fast");
        assert_eq!(responses[1]["result"]["content"][0]["text"], "slept 200");
    }

    #[tokio::test]
    async fn garbage_line_is_reported_and_loop_continues() {
        let input = concat!(
            "this is not json\n",
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, "\n",
        );
        let responses = run_with_input(input).await;
        assert_eq!(responses.len(), 2);
        assert!(responses.iter().any(|r| r["error"]["code"] == -32700));
        assert!(responses.iter().any(|r| r["id"] == 1 && r["result"] == json!({})));
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_stop_the_loop() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        input.extend_from_slice(b"\n");

        let responses = run_with_bytes(&input).await;
        assert_eq!(responses.len(), 2);
        assert!(responses.iter().any(|r| r["error"]["code"] == -32700));
        assert!(responses.iter().any(|r| r["id"] == 1 && r["result"] == json!({})));
    }

    #[tokio::test]
    async fn last_line_without_newline_is_still_handled() {
        let responses = run_with_input(r#"{"jsonrpc":"2.0","id":4,"method":"ping"}"#).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 4);
    }
}
