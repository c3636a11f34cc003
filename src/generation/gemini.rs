use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{GenerationError, TextGenerator};
use crate::chat::{ChatMessage, ChatRole};

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Gemini takes a single prompt, so the transcript is flattened into
/// `User:` / `AI:` lines.
pub fn transcript_prompt(transcript: &[ChatMessage]) -> String {
    transcript
        .iter()
        .map(|message| {
            let speaker = match message.role {
                ChatRole::User => "User",
                ChatRole::Ai => "AI",
            };
            format!("{speaker}: {}", message.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn explain_prompt(selected_text: &str, question: &str) -> String {
    format!(
        "A student highlighted this passage while studying:\n\"{selected_text}\"\n\n\
         Their question about it: {question}\n\n\
         Answer clearly and briefly, at the student's level."
    )
}

pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, GEMINI_API_URL.to_string())
    }

    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            endpoint,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::NotConfigured("missing Gemini API key"));
        }

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::Status(response.status()));
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed
            .first_text()
            .unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn explain(
        &self,
        selected_text: &str,
        question: &str,
    ) -> Result<String, GenerationError> {
        self.generate(&explain_prompt(selected_text, question)).await
    }

    async fn reply(&self, transcript: &[ChatMessage]) -> Result<String, GenerationError> {
        self.generate(&transcript_prompt(transcript)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_transcript() {
        let transcript = vec![
            ChatMessage::user("what is entropy?"),
            ChatMessage::ai("disorder, roughly"),
            ChatMessage::user("more please"),
        ];
        assert_eq!(
            transcript_prompt(&transcript),
            "User: what is entropy?\nAI: disorder, roughly\nUser: more please"
        );
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"hello"},{"text":"ignored"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("hello"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.first_text().is_none());

        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(blocked.first_text().is_none());
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "hi" }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[tokio::test]
    async fn blank_key_is_rejected_before_any_request() {
        let generator = GeminiGenerator::with_endpoint("  ".into(), "http://127.0.0.1:9".into());
        let err = generator.explain("a", "b").await.unwrap_err();
        assert!(matches!(err, GenerationError::NotConfigured(_)));
    }
}
