//! Organization plans: typed filesystem operations proposed by the model.
//!
//! A [`Plan`] is an ordered list of [`PlannedOperation`]s whose paths are all
//! relative to the target directory. Order is significant (a directory must
//! exist before anything is moved into it) and is never changed after
//! extraction.

mod extract;
mod validate;

pub use extract::extract;
pub use validate::{validate, PlanViolation};

use serde_json::{json, Value};
use std::fmt;

/// Tool name the filesystem server exposes for directory creation.
pub const CREATE_DIRECTORY_TOOL: &str = "create_directory";
/// Tool name the filesystem server exposes for file/folder moves.
pub const MOVE_FILE_TOOL: &str = "move_file";

/// One proposed filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedOperation {
    CreateDirectory { path: String },
    MoveEntry { from: String, to: String },
}

impl PlannedOperation {
    pub fn create_directory(path: impl Into<String>) -> Self {
        Self::CreateDirectory { path: path.into() }
    }

    pub fn move_entry(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::MoveEntry {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Name of the server tool that performs this operation.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::CreateDirectory { .. } => CREATE_DIRECTORY_TOOL,
            Self::MoveEntry { .. } => MOVE_FILE_TOOL,
        }
    }

    /// Tool arguments in the server's schema, still relative to the target.
    pub fn arguments(&self) -> Value {
        match self {
            Self::CreateDirectory { path } => json!({ "path": path }),
            Self::MoveEntry { from, to } => json!({ "source": from, "destination": to }),
        }
    }
}

impl fmt::Display for PlannedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDirectory { path } => {
                write!(f, "{CREATE_DIRECTORY_TOOL}({})", Quoted(path))
            }
            Self::MoveEntry { from, to } => {
                write!(f, "{MOVE_FILE_TOOL}({}, {})", Quoted(from), Quoted(to))
            }
        }
    }
}

/// Single-quoted argument with `'` and `\` escaped, as [`extract`] reads it.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("'")?;
        for c in self.0.chars() {
            if matches!(c, '\'' | '\\') {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("'")
    }
}

/// Ordered operations awaiting a decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    operations: Vec<PlannedOperation>,
}

impl Plan {
    pub fn new(operations: Vec<PlannedOperation>) -> Self {
        Self { operations }
    }

    pub fn operations(&self) -> &[PlannedOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlannedOperation> {
        self.operations.iter()
    }

    /// Count of (directory creations, moves).
    pub fn counts(&self) -> (usize, usize) {
        self.operations
            .iter()
            .fold((0, 0), |(creates, moves), op| match op {
                PlannedOperation::CreateDirectory { .. } => (creates + 1, moves),
                PlannedOperation::MoveEntry { .. } => (creates, moves + 1),
            })
    }

    /// One line per operation, numbered in emission order.
    pub fn render_lines(&self) -> Vec<String> {
        let width = self.operations.len().to_string().len();
        self.operations
            .iter()
            .enumerate()
            .map(|(idx, op)| format!("{:>width$}. {op}", idx + 1))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a PlannedOperation;
    type IntoIter = std::slice::Iter<'a, PlannedOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_follow_server_schema() {
        assert_eq!(
            PlannedOperation::create_directory("Photos").arguments(),
            json!({ "path": "Photos" })
        );
        assert_eq!(
            PlannedOperation::move_entry("a.jpg", "Photos/a.jpg").arguments(),
            json!({ "source": "a.jpg", "destination": "Photos/a.jpg" })
        );
    }

    #[test]
    fn counts_split_creates_and_moves() {
        let plan = Plan::new(vec![
            PlannedOperation::create_directory("A"),
            PlannedOperation::move_entry("x", "A/x"),
            PlannedOperation::move_entry("y", "A/y"),
        ]);
        assert_eq!(plan.counts(), (1, 2));
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn render_lines_are_numbered_and_aligned() {
        let ops = (0..10)
            .map(|i| PlannedOperation::create_directory(format!("d{i}")))
            .collect();
        let lines = Plan::new(ops).render_lines();
        assert_eq!(lines[0], " 1. create_directory('d0')");
        assert_eq!(lines[9], "10. create_directory('d9')");
    }

    #[test]
    fn display_uses_call_syntax_that_extracts_back() {
        let op = PlannedOperation::move_entry("old", "new/old");
        assert_eq!(extract(&op.to_string()).operations(), &[op]);
    }

    #[test]
    fn quotes_and_backslashes_are_escaped_in_display() {
        let create = PlannedOperation::create_directory("Bob's Files");
        assert_eq!(create.to_string(), r"create_directory('Bob\'s Files')");

        let mv = PlannedOperation::move_entry(r"it's.txt", r"Docs\Bob's\it's.txt");
        assert_eq!(
            extract(&format!("{create}\n{mv}")).operations(),
            &[create, mv]
        );
    }
}
