//! Replaying an approved plan through the tool session.

use crate::mcp::FilesystemTools;
use crate::plan::{Plan, PlannedOperation};
use crate::ui::render::RenderSink;
use tracing::{info, warn};

/// What happened to one planned operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// Server confirmation text.
    Succeeded(String),
    Failed(String),
    /// Not attempted because an earlier operation failed.
    Skipped,
}

/// Per-operation result of one execution batch, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    entries: Vec<(PlannedOperation, OperationOutcome)>,
}

impl ExecutionReport {
    pub fn entries(&self) -> &[(PlannedOperation, OperationOutcome)] {
        &self.entries
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, OperationOutcome::Succeeded(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, OperationOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, OperationOutcome::Skipped))
    }

    /// True when every operation succeeded.
    pub fn is_complete(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, outcome)| matches!(outcome, OperationOutcome::Succeeded(_)))
    }

    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed, {} skipped",
            self.succeeded(),
            self.failed(),
            self.skipped()
        )
    }

    fn count(&self, pred: impl Fn(&OperationOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Submit every operation of `plan` in order, stopping at the first failure.
///
/// Operations after a failure are reported as skipped. Nothing is rolled back.
pub async fn execute_plan(
    plan: &Plan,
    tools: &mut dyn FilesystemTools,
    sink: &dyn RenderSink,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();
    let mut failed = false;

    for (idx, op) in plan.iter().enumerate() {
        let step = idx + 1;
        if failed {
            sink.detail(&format!("[skip] {step}. {op}"));
            report.entries.push((op.clone(), OperationOutcome::Skipped));
            continue;
        }

        match tools.apply(op).await {
            Ok(message) => {
                info!(step, operation = %op, "operation succeeded");
                sink.detail(&format!("[ok]   {step}. {op}"));
                report
                    .entries
                    .push((op.clone(), OperationOutcome::Succeeded(message)));
            }
            Err(err) => {
                warn!(step, operation = %op, error = %err, "operation failed");
                sink.error(&format!("{step}. {op} failed: {err}"));
                report
                    .entries
                    .push((op.clone(), OperationOutcome::Failed(err.to_string())));
                failed = true;
            }
        }
    }
    report
}
