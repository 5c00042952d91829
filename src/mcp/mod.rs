//! Filesystem tool-server session.
//!
//! All directory listing and mutation goes through one external MCP
//! filesystem server launched for the chosen target directory. The session is
//! started once per run and stopped on every exit path.

mod transport;
pub mod types;

use crate::config::ServerConfig;
use crate::error::ToolError;
use crate::guard::TargetDirectory;
use crate::plan::{PlannedOperation, CREATE_DIRECTORY_TOOL, MOVE_FILE_TOOL};
use crate::preflight;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use transport::StdioTransport;
use types::{CallToolParams, CallToolResult, InitializeParams, InitializeResult};

/// Tool name for directory enumeration.
pub const LIST_DIRECTORY_TOOL: &str = "list_directory";

/// The first `npx -y` launch may download the server package.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(120);
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Filesystem operations the review loop needs.
///
/// Paths are relative to the session's target directory. `Ok` carries the
/// server's human-readable result text.
#[async_trait]
pub trait FilesystemTools: Send {
    async fn list_directory(&mut self, path: &str) -> Result<String, ToolError>;
    async fn create_directory(&mut self, path: &str) -> Result<String, ToolError>;
    async fn move_file(&mut self, source: &str, destination: &str) -> Result<String, ToolError>;

    /// Perform one planned operation.
    async fn apply(&mut self, operation: &PlannedOperation) -> Result<String, ToolError> {
        match operation {
            PlannedOperation::CreateDirectory { path } => self.create_directory(path).await,
            PlannedOperation::MoveEntry { from, to } => self.move_file(from, to).await,
        }
    }
}

/// A started tool server. The owner must call [`ToolServer::stop`] once it
/// is done, whatever the outcome of the work.
#[async_trait]
pub trait ToolServer: FilesystemTools + Sized {
    async fn stop(self);
}

/// Live session with the filesystem server for one target directory.
pub struct ToolSession {
    transport: StdioTransport,
    root: PathBuf,
}

impl ToolSession {
    /// Launch the server scoped to `target` and complete the MCP handshake.
    pub async fn start(server: &ServerConfig, target: &TargetDirectory) -> Result<Self, ToolError> {
        preflight::check_server_binary(&server.command).await?;

        let root = target.path().to_path_buf();
        let args = server_args(server, &root);
        let mut transport = StdioTransport::spawn(&server.command, &args, &root)?;

        match handshake(&mut transport).await {
            Ok(result) => {
                info!(
                    protocol = %result.protocol_version,
                    server = ?result.server_info,
                    root = %root.display(),
                    "tool server ready"
                );
                Ok(Self { transport, root })
            }
            Err(e) => {
                transport.close().await;
                Err(e)
            }
        }
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String, ToolError> {
        debug!(tool = name, %arguments, "calling tool");
        let params = serde_json::to_value(CallToolParams { name, arguments })
            .map_err(|e| ToolError::Protocol(e.to_string()))?;
        let raw = self
            .transport
            .request("tools/call", params, CALL_TIMEOUT)
            .await?;
        let result: CallToolResult = serde_json::from_value(raw)
            .map_err(|e| ToolError::Protocol(format!("malformed tool result: {e}")))?;
        let text = result.text();
        if result.is_error {
            return Err(ToolError::ExecutionFailed(text));
        }
        Ok(text)
    }

    /// Absolute form of a target-relative path; the server rejects anything
    /// outside the directory it was launched with.
    fn absolute(&self, relative: &str) -> String {
        let trimmed = relative.trim();
        if trimmed.is_empty() || trimmed == "." {
            return self.root.display().to_string();
        }
        self.root.join(trimmed).display().to_string()
    }
}

#[async_trait]
impl FilesystemTools for ToolSession {
    async fn list_directory(&mut self, path: &str) -> Result<String, ToolError> {
        let path = self.absolute(path);
        self.call_tool(LIST_DIRECTORY_TOOL, json!({ "path": path }))
            .await
    }

    async fn create_directory(&mut self, path: &str) -> Result<String, ToolError> {
        let path = self.absolute(path);
        self.call_tool(CREATE_DIRECTORY_TOOL, json!({ "path": path }))
            .await
    }

    async fn move_file(&mut self, source: &str, destination: &str) -> Result<String, ToolError> {
        let arguments = json!({
            "source": self.absolute(source),
            "destination": self.absolute(destination),
        });
        self.call_tool(MOVE_FILE_TOOL, arguments).await
    }
}

#[async_trait]
impl ToolServer for ToolSession {
    async fn stop(self) {
        self.transport.close().await;
    }
}

async fn handshake(transport: &mut StdioTransport) -> Result<InitializeResult, ToolError> {
    let params = serde_json::to_value(InitializeParams::for_this_client())
        .map_err(|e| ToolError::Protocol(e.to_string()))?;
    let raw = transport
        .request("initialize", params, HANDSHAKE_TIMEOUT)
        .await?;
    let result: InitializeResult = serde_json::from_value(raw)
        .map_err(|e| ToolError::Protocol(format!("malformed initialize result: {e}")))?;
    transport
        .notify("notifications/initialized", json!({}))
        .await?;
    Ok(result)
}

/// Launcher arguments: `npx` gets `-y <package> <root>`, any other command is
/// treated as the server itself and gets `[<package>] <root>`.
fn server_args(server: &ServerConfig, root: &Path) -> Vec<String> {
    let mut args = Vec::new();
    let launcher = Path::new(&server.command)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    if launcher == "npx" {
        args.push("-y".to_string());
    }
    if !server.package.trim().is_empty() {
        args.push(server.package.clone());
    }
    args.push(root.display().to_string());
    args
}
