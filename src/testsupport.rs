//! Shared test fixtures: a temp-dir fixture and scripted stand-ins for the
//! model, the tool server, the console and the renderer.

use crate::api::ModelClient;
use crate::error::{ApiError, ToolError};
use crate::mcp::{FilesystemTools, ToolServer};
use crate::plan::PlannedOperation;
use crate::types::{Candidate, Content, GenerateRequest, GenerateResponse};
use crate::ui::render::RenderSink;
use crate::ui::terminal::Console;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("tidy-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    /// Root directory path for this fixture.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a child path under the fixture root.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }

    /// Create a child directory (and parents).
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.child(relative);
        fs::create_dir_all(&path).expect("failed to create fixture directory");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Model reply carrying `text` as the first candidate.
pub fn text_response(text: &str) -> GenerateResponse {
    GenerateResponse {
        candidates: vec![Candidate {
            content: Some(Content::model(text)),
            finish_reason: Some("STOP".to_string()),
        }],
        usage_metadata: None,
        prompt_feedback: None,
    }
}

/// Model that replays a fixed script and records every request.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ApiError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, ApiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text_response(&text)),
            Some(Err(err)) => Err(err),
            None => Err(ApiError::InvalidResponse("script exhausted".to_string())),
        }
    }
}

/// One call observed by [`RecordingTools`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    List(String),
    Mutation(PlannedOperation),
}

/// In-memory tool server that records calls and never touches disk.
#[derive(Debug)]
pub struct RecordingTools {
    listings: VecDeque<Result<String, ToolError>>,
    default_listing: String,
    /// Zero-based mutation index that fails, with its error text.
    fail_at: Option<(usize, String)>,
    calls: Vec<ToolCall>,
    stops: Arc<AtomicUsize>,
}

impl Default for RecordingTools {
    fn default() -> Self {
        Self {
            listings: VecDeque::new(),
            default_listing: "[FILE] a.jpg\n[FILE] notes.txt".to_string(),
            fail_at: None,
            calls: Vec::new(),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl RecordingTools {
    /// Listing returned by every `list_directory` call.
    pub fn with_listing(mut self, listing: &str) -> Self {
        self.default_listing = listing.to_string();
        self
    }

    /// Queue one listing result ahead of the default.
    pub fn then_listing(mut self, listing: Result<String, ToolError>) -> Self {
        self.listings.push_back(listing);
        self
    }

    pub fn failing_at(mut self, mutation_index: usize, message: &str) -> Self {
        self.fail_at = Some((mutation_index, message.to_string()));
        self
    }

    pub fn calls(&self) -> &[ToolCall] {
        &self.calls
    }

    /// Mutating operations in submission order.
    pub fn mutations(&self) -> Vec<PlannedOperation> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ToolCall::Mutation(op) => Some(op.clone()),
                ToolCall::List(_) => None,
            })
            .collect()
    }

    /// Shared count of [`ToolServer::stop`] calls; outlives the tools.
    pub fn stop_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stops)
    }

    pub fn listing_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, ToolCall::List(_)))
            .count()
    }

    fn record_mutation(&mut self, op: PlannedOperation) -> Result<String, ToolError> {
        let index = self.mutations().len();
        let reply = format!("done: {op}");
        self.calls.push(ToolCall::Mutation(op));
        match &self.fail_at {
            Some((at, message)) if *at == index => Err(ToolError::ExecutionFailed(message.clone())),
            _ => Ok(reply),
        }
    }
}

#[async_trait]
impl FilesystemTools for RecordingTools {
    async fn list_directory(&mut self, path: &str) -> Result<String, ToolError> {
        self.calls.push(ToolCall::List(path.to_string()));
        match self.listings.pop_front() {
            Some(listing) => listing,
            None => Ok(self.default_listing.clone()),
        }
    }

    async fn create_directory(&mut self, path: &str) -> Result<String, ToolError> {
        self.record_mutation(PlannedOperation::create_directory(path))
    }

    async fn move_file(&mut self, source: &str, destination: &str) -> Result<String, ToolError> {
        self.record_mutation(PlannedOperation::move_entry(source, destination))
    }
}

#[async_trait]
impl ToolServer for RecordingTools {
    async fn stop(self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Console that answers from a script and then reports EOF.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            prompts: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}

/// Render sink that keeps every line as `kind: text`.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    fn push(&self, kind: &str, text: &str) {
        self.lines.lock().unwrap().push(format!("{kind}: {text}"));
    }
}

impl RenderSink for RecordingSink {
    fn header(&self, model: &str) {
        self.push("header", model);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn section(&self, title: &str) {
        self.push("section", title);
    }
    fn activity(&self, text: &str) {
        self.push("activity", text);
    }
    fn field(&self, key: &str, value: &str) {
        self.push("field", &format!("{key}={value}"));
    }
    fn detail(&self, text: &str) {
        self.push("detail", text);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn plan_line(&self, line: &str) {
        self.push("plan", line);
    }
    fn response_block(&self, text: &str) {
        self.push("response", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
        assert!(fixture.mkdir("a/b").is_dir());
    }

    #[test]
    fn scripted_console_reports_eof_after_script() {
        let mut console = ScriptedConsole::new(&["yes"]);
        assert_eq!(console.read_line("? ").unwrap().as_deref(), Some("yes"));
        assert_eq!(console.read_line("? ").unwrap(), None);
        assert_eq!(console.prompts().len(), 2);
    }

    #[tokio::test]
    async fn recording_tools_fail_at_requested_mutation() {
        let mut tools = RecordingTools::default().failing_at(1, "ENOENT");
        assert!(tools.create_directory("A").await.is_ok());
        assert!(tools.move_file("x", "A/x").await.is_err());
        assert_eq!(tools.mutations().len(), 2);
    }
}
