use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::completion::{ChatMessage, ChatRole};

pub const MAX_CHAT_MESSAGES: u64 = 50;
pub const MAX_MESSAGE_CHARS: usize = 8000;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(
        length(min = 1, max = MAX_CHAT_MESSAGES, message = "messages must contain 1 to 50 entries"),
        custom(function = "validate_messages")
    )]
    pub messages: Vec<ChatMessage>,
}

fn validate_messages(messages: &[ChatMessage]) -> Result<(), ValidationError> {
    for message in messages {
        if message.role == ChatRole::System {
            return Err(ValidationError::new("system_role")
                .with_message("system messages are not accepted from clients".into()));
        }
        let content = message.content.trim();
        if content.is_empty() {
            return Err(ValidationError::new("empty_content")
                .with_message("message content must not be empty".into()));
        }
        if message.content.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ValidationError::new("content_too_long")
                .with_message("message content exceeds 8000 characters".into()));
        }
    }
    Ok(())
}
