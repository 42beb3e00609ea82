use std::sync::Arc;

use crate::metrics::CHAT_REQUESTS_TOTAL;
use crate::models::completion::{ChatMessage, CompletionRequest, CompletionResponse};
use crate::services::completion_client::{CompletionClient, CompletionError};

pub const TUTOR_SYSTEM_PROMPT: &str = "You are StudyBuddy AI, an intelligent and friendly AI tutor designed to help students learn effectively. Your goal is to provide clear, concise explanations and brief responses to support fast learning.

Key Responsibilities:
- Offer quick, subject-specific help in Math, Science, Literature, History, and more.
- Give step-by-step guidance in a brief, to-the-point manner.
- Use short study tips like mnemonics, summaries, or key points.
- Keep answers under 3-4 sentences unless asked for more detail.
- Encourage learning with positivity and clarity.

IMPORTANT: Respond in English only. Maintain an encouraging tone, and always redirect back to academic topics if off-subject.";

/// Forwards a student conversation to the model behind the tutor prompt.
#[derive(Clone)]
pub struct ChatService {
    client: Arc<dyn CompletionClient>,
    model: String,
}

impl ChatService {
    pub fn new(client: Arc<dyn CompletionClient>, model: String) -> Self {
        Self { client, model }
    }

    pub async fn reply(
        &self,
        conversation: Vec<ChatMessage>,
    ) -> Result<CompletionResponse, CompletionError> {
        tracing::info!("Forwarding chat with {} messages", conversation.len());

        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(ChatMessage::system(TUTOR_SYSTEM_PROMPT));
        messages.extend(conversation);

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            response_format: None,
            max_tokens: None,
            temperature: None,
        };

        let result = self.client.complete(&request).await;
        let status = if result.is_ok() { "success" } else { "failed" };
        CHAT_REQUESTS_TOTAL.with_label_values(&[status]).inc();
        result
    }
}
