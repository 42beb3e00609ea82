#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use studymunch_api::{
    config::{CompletionConfig, Config, QuizConfig},
    create_router,
    models::completion::{CompletionRequest, CompletionResponse},
    services::{
        completion_client::{CompletionClient, CompletionError},
        AppState,
    },
};
use tower::ServiceExt;

pub const METRICS_AUTH: &str = "metrics:secret";

pub enum Reply {
    Text(String),
    Status(u16),
}

/// Completion client that replays canned replies and records every request.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(CompletionResponse::from_text(text)),
            Some(Reply::Status(code)) => Err(CompletionError::Status {
                status: reqwest::StatusCode::from_u16(code).unwrap(),
                body: "upstream unavailable".into(),
            }),
            None => Ok(CompletionResponse::default()),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".into(),
        completion: CompletionConfig {
            api_key: Some("sk-test".into()),
            quiz_model: "test/quiz-model".into(),
            chat_model: "test/chat-model".into(),
            ..CompletionConfig::default()
        },
        quiz: QuizConfig::default(),
        metrics_auth: METRICS_AUTH.into(),
    }
}

pub fn create_test_app(client: Arc<ScriptedClient>) -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(AppState::with_client(test_config(), client));
    create_router(app_state)
}

pub fn quiz_json(topic: &str, count: usize) -> Value {
    let questions: Vec<Value> = (0..count)
        .map(|i| {
            let answer = ["A", "B", "C", "D"][i % 4];
            json!({
                "question": format!("{} question {}?", topic, i + 1),
                "options": { "A": "first", "B": "second", "C": "third", "D": "fourth" },
                "correctAnswer": answer,
                "feedback": "Because the text says so."
            })
        })
        .collect();
    json!({ "topic": topic, "questions": questions })
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body).into_owned())
        })
    };
    (status, json)
}
