//! The list → plan → review → execute loop.
//!
//! One run organizes one target directory:
//!
//! ```text
//! Listing ──► Planning ──► AwaitingDecision ──► Executing ──► Done
//!    ▲                        │        │
//!    └──── Revise(feedback) ──┘        └── Reject / EOF ──► Aborted
//! ```
//!
//! Nothing is written to disk unless the user types `yes` for a non-empty
//! plan that passes [`crate::plan::validate`].

mod conversation;
mod decision;
mod execute;

pub use conversation::Conversation;
pub use decision::ReviewDecision;
pub use execute::{execute_plan, ExecutionReport, OperationOutcome};

use crate::api::ModelClient;
use crate::error::ToolError;
use crate::guard::TargetDirectory;
use crate::mcp::{FilesystemTools, ToolServer};
use crate::plan::{self, Plan};
use crate::prompt::{self, SystemPromptParams};
use crate::ui::render::RenderSink;
use crate::ui::settings;
use crate::ui::terminal::Console;
use tracing::{debug, info};

/// How a finished run ended well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The target directory has no entries.
    NothingToOrganize,
    Executed(ExecutionReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The user answered `no`.
    Rejected,
    /// Console input closed before a decision.
    InputClosed,
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done(Completion),
    Aborted(AbortReason),
}

/// Everything a run carries from state to state.
#[derive(Debug, Clone)]
pub struct RunContext {
    target: TargetDirectory,
    /// Free-text organization hint, sent with the first planning request.
    user_context: Option<String>,
    conversation: Conversation,
    /// Latest directory listing.
    structure: String,
    /// Plan awaiting a decision; empty when none is available.
    plan: Plan,
    /// Feedback for the next planning request.
    feedback: Option<String>,
    debug: bool,
}

impl RunContext {
    pub fn new(target: TargetDirectory, user_context: Option<String>, debug: bool) -> Self {
        let system_prompt = prompt::render_system_prompt(SystemPromptParams {
            target_dir: &target.to_string(),
        });
        Self {
            target,
            user_context: user_context.filter(|c| !c.trim().is_empty()),
            conversation: Conversation::new(system_prompt),
            structure: String::new(),
            plan: Plan::default(),
            feedback: None,
            debug,
        }
    }

    pub fn target(&self) -> &TargetDirectory {
        &self.target
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

/// Run the review loop against a started `server`, then stop it.
///
/// The server is stopped exactly once on every path: done, rejected, closed
/// input, or a fatal listing error.
pub async fn organize<S: ToolServer>(
    mut server: S,
    model: &dyn ModelClient,
    console: &mut dyn Console,
    sink: &dyn RenderSink,
    ctx: &mut RunContext,
) -> Result<Outcome, ToolError> {
    let outcome = Reviewer::new(model, &mut server, console, sink)
        .run(ctx)
        .await;
    server.stop().await;
    outcome
}

#[derive(Debug)]
enum State {
    Listing,
    Planning,
    AwaitingDecision,
    Executing,
    Finished(Outcome),
}

/// Collaborators the loop talks to.
pub struct Reviewer<'a> {
    model: &'a dyn ModelClient,
    tools: &'a mut dyn FilesystemTools,
    console: &'a mut dyn Console,
    sink: &'a dyn RenderSink,
}

impl<'a> Reviewer<'a> {
    pub fn new(
        model: &'a dyn ModelClient,
        tools: &'a mut dyn FilesystemTools,
        console: &'a mut dyn Console,
        sink: &'a dyn RenderSink,
    ) -> Self {
        Self {
            model,
            tools,
            console,
            sink,
        }
    }

    /// Drive one run to `Done` or `Aborted`.
    ///
    /// Only a failure of the initial listing is an error; every later
    /// model or tool problem is reported and handled inside the loop.
    pub async fn run(&mut self, ctx: &mut RunContext) -> Result<Outcome, ToolError> {
        let mut state = State::Listing;
        loop {
            debug!(?state, "review state");
            state = match state {
                State::Listing => self.list(ctx).await?,
                State::Planning => self.propose(ctx).await,
                State::AwaitingDecision => self.decide(ctx),
                State::Executing => self.execute(ctx).await,
                State::Finished(outcome) => {
                    info!(?outcome, "run finished");
                    return Ok(outcome);
                }
            };
        }
    }

    async fn list(&mut self, ctx: &mut RunContext) -> Result<State, ToolError> {
        self.sink
            .activity(&format!("Listing the contents of {}...", ctx.target));
        let listing = match self.tools.list_directory(".").await {
            Ok(listing) => listing,
            // A failed re-list after feedback goes back to the prompt.
            Err(err) if ctx.feedback.is_some() => {
                self.sink
                    .error(&format!("Could not list the directory again: {err}"));
                self.sink
                    .detail("Type feedback to try again, or 'no' to exit.");
                ctx.feedback = None;
                ctx.plan = Plan::default();
                return Ok(State::AwaitingDecision);
            }
            Err(err) => return Err(err),
        };

        if listing.trim().is_empty() {
            self.sink
                .activity("The directory is empty; there is nothing to organize.");
            return Ok(State::Finished(Outcome::Done(Completion::NothingToOrganize)));
        }
        debug!(entries = listing.lines().count(), "directory listed");
        self.sink.section("Current structure");
        self.sink.response_block(&listing);
        ctx.structure = listing;
        Ok(State::Planning)
    }

    async fn propose(&mut self, ctx: &mut RunContext) -> State {
        ctx.plan = Plan::default();
        let question = match ctx.feedback.take() {
            Some(feedback) => {
                self.sink
                    .activity("Asking the model to revise the plan based on your feedback...");
                prompt::revision_request(&feedback, &ctx.structure)
            }
            None => {
                self.sink
                    .activity("Asking the model to propose an organization plan...");
                self.sink
                    .detail("(This may take a while for large directories.)");
                prompt::planning_request(
                    &ctx.target.to_string(),
                    &ctx.structure,
                    ctx.user_context.as_deref(),
                )
            }
        };

        let request = ctx.conversation.ask(question);
        let response = match self.model.generate(&request).await {
            Ok(response) => response,
            Err(err) => {
                ctx.conversation.abandon_question();
                self.sink.error(&format!("Model request failed: {err}"));
                self.sink
                    .detail("Type feedback to try again, or 'no' to exit.");
                return State::AwaitingDecision;
            }
        };

        let Some(text) = response.text() else {
            ctx.conversation.abandon_question();
            self.sink.warn(&format!(
                "The model returned no plan ({}).",
                response.empty_reason()
            ));
            self.sink
                .detail("Type feedback to guide the model, or 'no' to exit.");
            return State::AwaitingDecision;
        };
        ctx.conversation.record_reply(text.clone());

        if ctx.debug {
            self.sink.section("Raw model response");
            self.sink.response_block(&text);
        }

        ctx.plan = plan::extract(&text);
        self.present(&ctx.plan);
        State::AwaitingDecision
    }

    fn present(&self, plan: &Plan) {
        if plan.is_empty() {
            self.sink
                .warn("No actionable plan steps could be extracted from the model's proposal.");
            self.sink
                .detail("Type feedback to guide the model, or 'no' to exit.");
            return;
        }
        self.sink.section("Proposed plan (review carefully)");
        for line in plan.render_lines() {
            self.sink.plan_line(&line);
        }
        let (creates, moves) = plan.counts();
        self.sink
            .field("Directories to create", &creates.to_string());
        self.sink.field("Entries to move", &moves.to_string());
    }

    fn decide(&mut self, ctx: &mut RunContext) -> State {
        loop {
            let answer = match self.console.read_line(settings::PROMPT_DECISION) {
                Ok(Some(answer)) => answer,
                Ok(None) => {
                    self.sink.activity("Input closed. Exiting without organizing.");
                    return State::Finished(Outcome::Aborted(AbortReason::InputClosed));
                }
                Err(err) => {
                    self.sink.error(&format!("Could not read input: {err}"));
                    return State::Finished(Outcome::Aborted(AbortReason::InputClosed));
                }
            };

            match ReviewDecision::parse(&answer) {
                None => continue,
                Some(ReviewDecision::Reject) => {
                    self.sink.activity("Exiting without organizing.");
                    return State::Finished(Outcome::Aborted(AbortReason::Rejected));
                }
                Some(ReviewDecision::Revise { feedback }) => {
                    debug!(%feedback, "revision requested");
                    ctx.plan = Plan::default();
                    ctx.feedback = Some(feedback);
                    return State::Listing;
                }
                Some(ReviewDecision::Approve) => {
                    if ctx.plan.is_empty() {
                        self.sink.warn(
                            "No valid plan to execute. Please provide feedback or type 'no'.",
                        );
                        continue;
                    }
                    if let Err(violations) = plan::validate(&ctx.plan) {
                        self.sink
                            .error("The plan was not executed because it breaks these rules:");
                        for violation in &violations {
                            self.sink.detail(&violation.to_string());
                        }
                        self.sink
                            .detail("Describe a fix for the model, or type 'no' to exit.");
                        continue;
                    }
                    return State::Executing;
                }
            }
        }
    }

    async fn execute(&mut self, ctx: &mut RunContext) -> State {
        self.sink.section("Executing the plan");
        let report = execute_plan(&ctx.plan, &mut *self.tools, self.sink).await;
        self.sink.field("Result", &report.summary());
        if report.is_complete() {
            self.sink.activity(&format!(
                "Organization complete. Please check the directory: {}",
                ctx.target
            ));
        } else {
            self.sink.warn(&format!(
                "Execution stopped at the first failure; {} may be partially organized.",
                ctx.target
            ));
        }
        State::Finished(Outcome::Done(Completion::Executed(report)))
    }
}
