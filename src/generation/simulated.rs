use std::time::Duration;

use async_trait::async_trait;

use super::{GenerationError, TextGenerator};
use crate::chat::ChatMessage;

pub const DEFAULT_EXPLAIN_DELAY: Duration = Duration::from_millis(600);
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1200);

pub const SIMULATED_CHAT_REPLY: &str = "This is a simulated AI response. (Real AI coming soon!)";

/// Local stand-in for the hosted model: canned text after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedGenerator {
    explain_delay: Duration,
    reply_delay: Duration,
}

impl SimulatedGenerator {
    pub fn new(explain_delay: Duration, reply_delay: Duration) -> Self {
        Self {
            explain_delay,
            reply_delay,
        }
    }

    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl Default for SimulatedGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_EXPLAIN_DELAY, DEFAULT_REPLY_DELAY)
    }
}

/// The deterministic explanation template.
pub fn simulated_explanation(selected_text: &str, question: &str) -> String {
    format!(
        "Based on the selected text \"{selected_text}\", here's an explanation for your question \"{question}\":\n\n\
         This is a simulated AI response. A connected model would explain the highlighted content here.\n\n\
         You can highlight text within this response to open a nested doubt and dig deeper."
    )
}

#[async_trait]
impl TextGenerator for SimulatedGenerator {
    async fn explain(
        &self,
        selected_text: &str,
        question: &str,
    ) -> Result<String, GenerationError> {
        if !self.explain_delay.is_zero() {
            tokio::time::sleep(self.explain_delay).await;
        }
        Ok(simulated_explanation(selected_text, question))
    }

    async fn reply(&self, _transcript: &[ChatMessage]) -> Result<String, GenerationError> {
        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }
        Ok(SIMULATED_CHAT_REPLY.to_string())
    }
}
