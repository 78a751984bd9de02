//! In-memory helper double for tests.

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tronbun_ipc::{EventRouter, Transport, TransportConfig};

/// The helper's side of a pair of in-memory pipes.
pub(crate) struct FakeHelper {
    commands: Lines<BufReader<DuplexStream>>,
    output: DuplexStream,
}

impl FakeHelper {
    pub(crate) fn connect(router: Arc<dyn EventRouter>) -> (Transport, FakeHelper) {
        let (host_stdin, helper_stdin) = tokio::io::duplex(64 * 1024);
        let (helper_stdout, host_stdout) = tokio::io::duplex(64 * 1024);
        let transport = Transport::from_streams(
            host_stdin,
            host_stdout,
            TransportConfig::new("WebView"),
            router,
        );
        (transport, Self::from_pipes(helper_stdin, helper_stdout))
    }

    pub(crate) fn from_pipes(stdin: DuplexStream, stdout: DuplexStream) -> Self {
        Self {
            commands: BufReader::new(stdin).lines(),
            output: stdout,
        }
    }

    pub(crate) async fn next_command(&mut self) -> Value {
        let line = self.commands.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    /// Read commands until one with `method` arrives, answering the rest.
    pub(crate) async fn expect(&mut self, method: &str) -> Value {
        loop {
            let cmd = self.next_command().await;
            if cmd["method"] == method {
                return cmd;
            }
            self.ack(&cmd).await;
        }
    }

    pub(crate) async fn send(&mut self, message: Value) {
        let line = format!("{message}\n");
        self.output.write_all(line.as_bytes()).await.unwrap();
        self.output.flush().await.unwrap();
    }

    pub(crate) async fn respond(&mut self, cmd: &Value, result: Value) {
        self.send(serde_json::json!({"type": "response", "id": cmd["id"], "result": result}))
            .await;
    }

    pub(crate) async fn ack(&mut self, cmd: &Value) {
        self.respond(cmd, Value::Null).await;
    }
}
