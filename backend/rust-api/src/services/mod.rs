use std::sync::Arc;

use crate::config::Config;
use completion_client::{CompletionClient, OpenRouterClient};

pub mod chat_service;
pub mod completion_client;
pub mod json_repair;
pub mod quiz_schema;
pub mod quiz_service;

use chat_service::ChatService;
use quiz_service::QuizService;

pub struct AppState {
    pub config: Config,
    pub quiz: QuizService,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = OpenRouterClient::new(&config.completion)?;
        tracing::info!(
            "Completion client ready: url={}, quiz_model={}, chat_model={}",
            config.completion.api_url,
            config.completion.quiz_model,
            config.completion.chat_model
        );
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Builds the state around an existing completion client.
    pub fn with_client(config: Config, client: Arc<dyn CompletionClient>) -> Self {
        let quiz = QuizService::new(
            client.clone(),
            config.completion.quiz_model.clone(),
            config.quiz.clone(),
        );
        let chat = ChatService::new(client, config.completion.chat_model.clone());

        Self { config, quiz, chat }
    }
}
