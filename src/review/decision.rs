//! The user's answer to a proposed plan.

/// Parsed decision at the review prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
    Revise { feedback: String },
}

impl ReviewDecision {
    /// `yes` approves and `no` rejects (case-insensitive, surrounding
    /// whitespace ignored); any other non-empty text is revision feedback.
    /// Blank input is not a decision.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case("yes") {
            return Some(Self::Approve);
        }
        if trimmed.eq_ignore_ascii_case("no") {
            return Some(Self::Reject);
        }
        Some(Self::Revise {
            feedback: trimmed.to_string(),
        })
    }
}
