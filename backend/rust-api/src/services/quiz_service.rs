//! Quiz generation: prompt the model, parse, repair, validate, retry.

use std::sync::Arc;
use thiserror::Error;

use crate::config::QuizConfig;
use crate::metrics::{QUIZ_ATTEMPTS_TOTAL, QUIZ_GENERATIONS_TOTAL};
use crate::models::completion::{ChatMessage, CompletionRequest, ResponseFormat};
use crate::models::quiz::{QuizDocument, QuizTopic};
use crate::services::completion_client::{CompletionClient, CompletionError};
use crate::services::json_repair::repair_json;
use crate::services::quiz_schema::{validate_quiz, SchemaError};
use crate::utils::retry::{retry_async, RetryExhausted, RetryPolicy};

pub const QUIZ_SYSTEM_PROMPT: &str = r#"You are a quiz generator. You MUST respond with ONLY a valid JSON object that strictly follows this exact structure:

{
  "topic": "Quiz Topic",
  "questions": [
    {
      "question": "Question text?",
      "options": {
        "A": "Option A text",
        "B": "Option B text",
        "C": "Option C text",
        "D": "Option D text"
      },
      "correctAnswer": "A",
      "feedback": "Short explanation of why this answer is correct and others are not"
    }
    ... exactly 10 questions total
  ]
}

STRICT RULES:
1. Respond with ONLY the JSON object. Do not include markdown, code blocks, or text outside JSON.
2. All strings MUST use double quotes.
3. There MUST be exactly 10 questions in the "questions" array.
4. Each "correctAnswer" MUST be one of "A", "B", "C", or "D".
5. Every question MUST include a "feedback" field.
6. Do NOT include comments inside the JSON."#;

/// Why a single attempt did not produce a quiz. Every variant is retryable.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Empty response from AI")]
    EmptyContent,

    #[error("Response is not valid JSON even after repair: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response did not match expected quiz format: {0}")]
    Schema(#[from] SchemaError),
}

impl AttemptError {
    fn outcome(&self) -> &'static str {
        match self {
            AttemptError::Completion(_) => "transport_error",
            AttemptError::EmptyContent => "empty_content",
            AttemptError::Parse(_) => "parse_error",
            AttemptError::Schema(_) => "schema_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Failed to generate valid quiz after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: AttemptError },
}

impl From<RetryExhausted<AttemptError>> for QuizError {
    fn from(err: RetryExhausted<AttemptError>) -> Self {
        QuizError::Exhausted {
            attempts: err.attempts,
            source: err.last_error,
        }
    }
}

#[derive(Clone)]
pub struct QuizService {
    client: Arc<dyn CompletionClient>,
    model: String,
    settings: QuizConfig,
    policy: RetryPolicy,
}

impl QuizService {
    pub fn new(client: Arc<dyn CompletionClient>, model: String, settings: QuizConfig) -> Self {
        let policy = settings.retry_policy();
        Self {
            client,
            model,
            settings,
            policy,
        }
    }

    pub async fn generate(&self, topic: &QuizTopic) -> Result<QuizDocument, QuizError> {
        tracing::info!("Generating quiz for topic: {}", topic);

        let request = self.build_request(topic);
        let request = &request;
        let result = retry_async(&self.policy, move |attempt| {
            async move {
                let outcome = self.attempt(request).await;
                let label = match &outcome {
                    Ok(_) => "success",
                    Err(e) => e.outcome(),
                };
                QUIZ_ATTEMPTS_TOTAL.with_label_values(&[label]).inc();
                if outcome.is_ok() && attempt > 1 {
                    tracing::info!("Quiz for topic {} generated on attempt {}", topic, attempt);
                }
                outcome
            }
        })
        .await;

        match result {
            Ok(quiz) => {
                QUIZ_GENERATIONS_TOTAL.with_label_values(&["success"]).inc();
                Ok(quiz)
            }
            Err(exhausted) => {
                QUIZ_GENERATIONS_TOTAL.with_label_values(&["failed"]).inc();
                let err = QuizError::from(exhausted);
                tracing::error!("Quiz generation failed for topic {}: {}", topic, err);
                Err(err)
            }
        }
    }

    fn build_request(&self, topic: &QuizTopic) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(QUIZ_SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Create a 10-question multiple-choice quiz about \"{}\". Respond with ONLY the JSON object.",
                    topic
                )),
            ],
            response_format: Some(ResponseFormat::json_object()),
            max_tokens: Some(self.settings.max_tokens),
            temperature: Some(self.settings.temperature),
        }
    }

    /// One full model call plus parse/repair/validate. Holds no state between calls.
    async fn attempt(&self, request: &CompletionRequest) -> Result<QuizDocument, AttemptError> {
        let response = self.client.complete(request).await?;
        let raw = response.first_content().ok_or(AttemptError::EmptyContent)?;
        tracing::debug!("Raw AI response: {}", raw);

        let value = parse_model_output(raw)?;
        Ok(validate_quiz(&value)?)
    }
}

/// Parses model text directly, falling back to one repair pass.
pub fn parse_model_output(raw: &str) -> Result<serde_json::Value, serde_json::Error> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            let repaired = repair_json(raw);
            tracing::debug!("Direct parse failed ({}); repaired JSON: {}", e, repaired);
            serde_json::from_str(&repaired)
        }
    }
}
