use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    models::quiz::{QuizDocument, QuizScore, QuizTopic, ScoreQuizRequest},
    services::{quiz_schema::validate_quiz, AppState},
};

use super::ApiError;

/// POST /api/quizAi - generate a 10-question quiz for `{ "topic": ... }`
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<QuizDocument>, ApiError> {
    let topic = body
        .get("topic")
        .and_then(Value::as_str)
        .and_then(QuizTopic::parse)
        .ok_or_else(|| ApiError::bad_request("Topic is required and must be a string"))?;

    let quiz = state.quiz.generate(&topic).await.map_err(|e| {
        ApiError::internal("Failed to generate quiz", Some(e.to_string()))
    })?;

    Ok(Json(quiz))
}

/// POST /api/quizAi/score - grade selected answers against a quiz
pub async fn score_quiz(
    AppJson(req): AppJson<ScoreQuizRequest>,
) -> Result<Json<QuizScore>, ApiError> {
    let quiz = validate_quiz(&req.quiz).map_err(|e| {
        tracing::warn!("Rejected quiz for scoring: {}", e);
        ApiError::invalid("Invalid quiz document", e.to_string())
    })?;

    if req.answers.len() > quiz.questions.len() {
        return Err(ApiError::bad_request(format!(
            "Expected at most {} answers, got {}",
            quiz.questions.len(),
            req.answers.len()
        )));
    }

    let score = quiz.grade(&req.answers);
    tracing::info!(
        "Scored quiz on {}: {}/{}",
        quiz.topic,
        score.correct,
        score.total
    );
    Ok(Json(score))
}
