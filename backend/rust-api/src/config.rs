use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::utils::retry::RetryPolicy;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_QUIZ_MODEL: &str = "openai/gpt-oss-20b:free";
pub const DEFAULT_CHAT_MODEL: &str = "deepseek/deepseek-r1-0528:free";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub completion: CompletionConfig,
    pub quiz: QuizConfig,
    pub metrics_auth: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub quiz_model: String,
    pub chat_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizConfig {
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            quiz_model: DEFAULT_QUIZ_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_backoff_ms: 0,
            max_tokens: 1500,
            temperature: 0.3,
        }
    }
}

impl QuizConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/{env}.toml first, then APP_* overrides (APP_QUIZ__MAX_RETRIES=3)
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").prefix_separator("_").separator("__"))
            .build()?;

        let completion_defaults = CompletionConfig::default();
        let quiz_defaults = QuizConfig::default();

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("PORT").map(|port| format!("0.0.0.0:{}", port)))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let api_key = settings
            .get_string("completion.api_key")
            .or_else(|_| env::var("OPENROUTER_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        let completion = CompletionConfig {
            api_url: settings
                .get_string("completion.api_url")
                .unwrap_or(completion_defaults.api_url),
            api_key,
            quiz_model: settings
                .get_string("completion.quiz_model")
                .unwrap_or(completion_defaults.quiz_model),
            chat_model: settings
                .get_string("completion.chat_model")
                .unwrap_or(completion_defaults.chat_model),
            timeout_secs: settings
                .get_int("completion.timeout_secs")
                .ok()
                .and_then(|v| u64::try_from(v).ok())
                .unwrap_or(completion_defaults.timeout_secs),
        };

        let quiz = QuizConfig {
            max_retries: settings
                .get_int("quiz.max_retries")
                .ok()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(quiz_defaults.max_retries),
            retry_backoff_ms: settings
                .get_int("quiz.retry_backoff_ms")
                .ok()
                .and_then(|v| u64::try_from(v).ok())
                .unwrap_or(quiz_defaults.retry_backoff_ms),
            max_tokens: settings
                .get_int("quiz.max_tokens")
                .ok()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(quiz_defaults.max_tokens),
            temperature: settings
                .get_float("quiz.temperature")
                .map(|v| v as f32)
                .unwrap_or(quiz_defaults.temperature),
        };

        let metrics_auth = settings
            .get_string("metrics.auth")
            .or_else(|_| env::var("METRICS_AUTH"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    tracing::warn!("METRICS_AUTH is not set in production; using default credentials");
                }
                "admin:changeme".to_string()
            });

        Ok(Config {
            bind_addr,
            completion,
            quiz,
            metrics_auth,
        })
    }
}
