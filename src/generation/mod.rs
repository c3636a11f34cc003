//! Text-generation collaborators behind the doubt popups and the chat
//! assistant.
//!
//! The overlay and chat controllers only ever see `dyn TextGenerator`, so the
//! simulated backend and the hosted one are interchangeable.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{chat::ChatMessage, config::AppConfig, settings::GeneratorMode};

pub mod gemini;
pub mod simulated;

pub use gemini::GeminiGenerator;
pub use simulated::SimulatedGenerator;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("text generation service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("text generation is not configured: {0}")]
    NotConfigured(&'static str),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Explains `selected_text` in light of the reader's free-form question.
    async fn explain(&self, selected_text: &str, question: &str)
        -> Result<String, GenerationError>;

    /// Next assistant turn for a chat transcript.
    async fn reply(&self, transcript: &[ChatMessage]) -> Result<String, GenerationError>;
}

/// Picks the generator for the configured mode. Gemini without an API key
/// falls back to the simulated one.
pub fn build_generator(
    mode: GeneratorMode,
    config: &AppConfig,
    simulated: SimulatedGenerator,
) -> Arc<dyn TextGenerator> {
    match (mode, config.gemini_api_key.as_deref()) {
        (GeneratorMode::Gemini, Some(key)) => Arc::new(GeminiGenerator::new(key.to_string())),
        (GeneratorMode::Gemini, None) => {
            log::warn!("Gemini mode selected but IDEAPAL_GEMINI_API_KEY is unset; using simulated replies");
            Arc::new(simulated)
        }
        (GeneratorMode::Simulated, _) => Arc::new(simulated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gemini_without_key_falls_back_to_simulated() {
        let generator = build_generator(
            GeneratorMode::Gemini,
            &AppConfig::default(),
            SimulatedGenerator::immediate(),
        );
        let text = generator.explain("gravity", "why?").await.unwrap();
        assert_eq!(text, simulated::simulated_explanation("gravity", "why?"));
    }

    #[tokio::test]
    async fn simulated_mode_ignores_the_key() {
        let config = AppConfig {
            gemini_api_key: Some("key".into()),
            ..AppConfig::default()
        };
        let generator = build_generator(
            GeneratorMode::Simulated,
            &config,
            SimulatedGenerator::immediate(),
        );
        assert_eq!(
            generator.reply(&[]).await.unwrap(),
            simulated::SIMULATED_CHAT_REPLY
        );
    }
}
