//! Newline-delimited JSON-RPC 2.0 over a child process's stdio.
//!
//! [`RpcChannel`] does the framing and id matching over any async
//! reader/writer pair; [`StdioTransport`] owns the child process around it.

use crate::error::ToolError;
use serde_json::{json, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// How long `close` waits for a graceful exit before killing the child.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Request/response channel with sequential numeric ids.
pub struct RpcChannel<R, W> {
    reader: R,
    writer: W,
    next_id: i64,
}

impl<R, W> RpcChannel<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            next_id: 1,
        }
    }

    /// Send a request and wait for the response with the same id.
    ///
    /// Server notifications and unrelated responses that arrive first are
    /// skipped.
    pub async fn request(
        &mut self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ToolError> {
        let id = self.next_id;
        self.next_id += 1;
        trace!(method, id, "sending request");

        self.write_message(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))
        .await?;

        loop {
            let message = tokio::time::timeout(timeout, self.read_message())
                .await
                .map_err(|_| ToolError::Timeout(timeout))??;

            let Some(response_id) = message.get("id") else {
                trace!(?message, "skipping notification");
                continue;
            };
            let matches = response_id.as_i64() == Some(id)
                || response_id.as_str().and_then(|s| s.parse::<i64>().ok()) == Some(id);
            if !matches {
                trace!(?message, "skipping unmatched response");
                continue;
            }

            if let Some(error) = message.get("error") {
                return Err(ToolError::Server {
                    code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                    message: error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string(),
                });
            }
            return Ok(message.get("result").cloned().unwrap_or_else(|| json!({})));
        }
    }

    /// Send a notification (no response expected).
    pub async fn notify(&mut self, method: &str, params: Value) -> Result<(), ToolError> {
        trace!(method, "sending notification");
        self.write_message(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        }))
        .await
    }

    async fn write_message(&mut self, message: &Value) -> Result<(), ToolError> {
        let mut framed = serde_json::to_string(message)
            .map_err(|e| ToolError::Protocol(format!("failed to serialize message: {e}")))?;
        framed.push('\n');
        self.writer
            .write_all(framed.as_bytes())
            .await
            .map_err(|e| ToolError::Io(format!("failed to write message: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| ToolError::Io(format!("failed to flush: {e}")))?;
        Ok(())
    }

    async fn read_message(&mut self) -> Result<Value, ToolError> {
        loop {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .await
                .map_err(|e| ToolError::Io(format!("failed to read message: {e}")))?;
            if read == 0 {
                return Err(ToolError::Io(
                    "tool server closed its output unexpectedly".to_string(),
                ));
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_str(trimmed)
                .map_err(|e| ToolError::Protocol(format!("invalid JSON from server: {e}")));
        }
    }

    fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// A spawned stdio server process and its JSON-RPC channel.
pub struct StdioTransport {
    child: Child,
    channel: RpcChannel<BufReader<ChildStdout>, ChildStdin>,
    stderr_task: Option<JoinHandle<()>>,
    command: String,
}

impl StdioTransport {
    /// Spawn `command args..` in `working_dir` with piped stdio.
    ///
    /// The child is killed if the transport is dropped without `close`.
    pub fn spawn(command: &str, args: &[String], working_dir: &Path) -> Result<Self, ToolError> {
        debug!(command, ?args, dir = %working_dir.display(), "spawning tool server");

        let mut child = Command::new(command)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ToolError::BinaryNotFound(command.to_string()),
                _ => ToolError::Spawn(format!("failed to spawn `{command}`: {e}")),
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolError::Spawn("failed to capture stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolError::Spawn("failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ToolError::Spawn("failed to capture stderr".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            drain_stderr(BufReader::new(stderr)).await;
        });

        Ok(Self {
            child,
            channel: RpcChannel::new(BufReader::new(stdout), stdin),
            stderr_task: Some(stderr_task),
            command: command.to_string(),
        })
    }

    pub async fn request(
        &mut self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ToolError> {
        self.channel.request(method, params, timeout).await
    }

    pub async fn notify(&mut self, method: &str, params: Value) -> Result<(), ToolError> {
        self.channel.notify(method, params).await
    }

    /// Close stdin, give the server a moment to exit, then kill it.
    pub async fn close(self) {
        let Self {
            mut child,
            channel,
            stderr_task,
            command,
        } = self;
        debug!(command, "closing tool server");

        let (_stdout, stdin) = channel.into_parts();
        drop(stdin);

        match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => debug!(%status, "tool server exited"),
            Ok(Err(e)) => warn!("waiting for tool server failed: {e}"),
            Err(_) => {
                debug!("tool server did not exit in time; killing");
                let _ = child.start_kill();
                let _ = child.wait().await;
            }
        }

        if let Some(task) = stderr_task {
            task.abort();
        }
    }
}

/// Log every stderr line until EOF and return how many were read. Bytes
/// that are not UTF-8 are decoded lossily; the pipe must keep being read or
/// the child blocks once it fills.
async fn drain_stderr<R: AsyncBufRead + Unpin>(mut reader: R) -> usize {
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => return count,
            Ok(_) => {
                count += 1;
                let line = String::from_utf8_lossy(&buf);
                debug!("tool server stderr: {}", line.trim_end());
            }
            Err(e) => {
                warn!(error = %e, "tool server stderr unreadable");
                return count;
            }
        }
    }
}
