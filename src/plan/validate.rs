//! Pre-execution checks for an approved plan.
//!
//! Extraction accepts anything shaped like an operation. Before a plan is
//! replayed against the tool server every path must stay inside the target
//! directory and no entry may be moved into itself or its own descendant.

use super::{Plan, PlannedOperation};
use std::fmt;

/// One reason a plan cannot be executed. `index` is 1-based, matching the
/// numbering shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanViolation {
    EmptyPath { index: usize },
    AbsolutePath { index: usize, path: String },
    EscapesTarget { index: usize, path: String },
    MovesTargetRoot { index: usize },
    MoveIntoItself {
        index: usize,
        from: String,
        to: String,
    },
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath { index } => write!(f, "step {index}: empty path"),
            Self::AbsolutePath { index, path } => {
                write!(f, "step {index}: '{path}' is absolute; only relative paths are allowed")
            }
            Self::EscapesTarget { index, path } => {
                write!(f, "step {index}: '{path}' leaves the target directory")
            }
            Self::MovesTargetRoot { index } => {
                write!(f, "step {index}: the target directory itself cannot be moved")
            }
            Self::MoveIntoItself { index, from, to } => {
                write!(f, "step {index}: cannot move '{from}' into itself ('{to}')")
            }
        }
    }
}

/// Check every operation; returns all violations, not just the first.
pub fn validate(plan: &Plan) -> Result<(), Vec<PlanViolation>> {
    let mut violations = Vec::new();
    for (idx, op) in plan.iter().enumerate() {
        let index = idx + 1;
        match op {
            PlannedOperation::CreateDirectory { path } => {
                if let Err(v) = normalize(index, path) {
                    violations.push(v);
                }
            }
            PlannedOperation::MoveEntry { from, to } => {
                let source = normalize(index, from);
                let destination = normalize(index, to);
                match (source, destination) {
                    (Ok(source), Ok(destination)) => {
                        if source.is_empty() {
                            violations.push(PlanViolation::MovesTargetRoot { index });
                        } else if destination.starts_with(&source) {
                            violations.push(PlanViolation::MoveIntoItself {
                                index,
                                from: from.clone(),
                                to: to.clone(),
                            });
                        }
                    }
                    (source, destination) => {
                        violations.extend(source.err());
                        violations.extend(destination.err());
                    }
                }
            }
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Split a relative path into components, dropping `.` and empty segments.
/// Both separators are accepted since the model may emit either.
fn normalize(index: usize, raw: &str) -> Result<Vec<&str>, PlanViolation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlanViolation::EmptyPath { index });
    }
    if is_absolute(trimmed) {
        return Err(PlanViolation::AbsolutePath {
            index,
            path: raw.to_string(),
        });
    }
    let mut components = Vec::new();
    for part in trimmed.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                return Err(PlanViolation::EscapesTarget {
                    index,
                    path: raw.to_string(),
                });
            }
            other => components.push(other),
        }
    }
    Ok(components)
}

fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') || path.starts_with('~') {
        return true;
    }
    // Windows drive prefix, e.g. `C:` or `c:\`.
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}
