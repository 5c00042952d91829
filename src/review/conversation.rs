//! Planning conversation history.

use crate::types::{Content, GenerateRequest, GenerationConfig};

/// Low temperature keeps plans close to the documented format.
const PLANNING_TEMPERATURE: f64 = 0.2;

/// Alternating user/model turns plus the fixed system instruction.
#[derive(Debug, Clone)]
pub struct Conversation {
    system: Content,
    turns: Vec<Content>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system: Content::instruction(system_prompt),
            turns: Vec::new(),
        }
    }

    /// Append a user turn and build the request for the whole history.
    pub fn ask(&mut self, text: impl Into<String>) -> GenerateRequest {
        self.turns.push(Content::user(text));
        GenerateRequest {
            contents: self.turns.clone(),
            system_instruction: Some(self.system.clone()),
            generation_config: Some(GenerationConfig {
                temperature: Some(PLANNING_TEMPERATURE),
                max_output_tokens: None,
            }),
        }
    }

    /// Record the model's reply to the last question.
    pub fn record_reply(&mut self, text: impl Into<String>) {
        self.turns.push(Content::model(text));
    }

    /// Drop an unanswered trailing user turn so the next question does not
    /// follow another user turn.
    pub fn abandon_question(&mut self) {
        if matches!(
            self.turns.last().and_then(|turn| turn.role),
            Some(crate::types::Role::User)
        ) {
            self.turns.pop();
        }
    }

    pub fn turns(&self) -> &[Content] {
        &self.turns
    }
}
