mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{create_test_app, post_json, quiz_json, send, Reply, ScriptedClient};
use serde_json::json;

#[tokio::test]
async fn test_generate_quiz_success() {
    let client = ScriptedClient::new(vec![Reply::Text(quiz_json("Photosynthesis", 10).to_string())]);
    let app = create_test_app(client.clone());

    let (status, body) = post_json(&app, "/api/quizAi", json!({ "topic": "Photosynthesis" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], "Photosynthesis");
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 10);
    for question in questions {
        let answer = question["correctAnswer"].as_str().unwrap();
        assert!(["A", "B", "C", "D"].contains(&answer));
        assert!(question["options"][answer].is_string());
    }
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_topic_is_trimmed_before_prompting() {
    let client = ScriptedClient::new(vec![Reply::Text(quiz_json("Volcanoes", 10).to_string())]);
    let app = create_test_app(client.clone());

    let (status, _) = post_json(&app, "/api/quizAi", json!({ "topic": "   Volcanoes \n" })).await;

    assert_eq!(status, StatusCode::OK);
    let requests = client.requests();
    assert_eq!(requests[0].model, "test/quiz-model");
    assert!(requests[0].messages[1]
        .content
        .contains("quiz about \"Volcanoes\""));
}

#[tokio::test]
async fn test_blank_topic_rejected_without_model_call() {
    for body in [
        json!({ "topic": "" }),
        json!({ "topic": "   \t\n" }),
        json!({ "topic": 42 }),
        json!({ "subject": "Math" }),
        json!({}),
    ] {
        let client = ScriptedClient::new(vec![]);
        let app = create_test_app(client.clone());

        let (status, response) = post_json(&app, "/api/quizAi", body.clone()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response["error"], "Topic is required and must be a string");
        assert_eq!(client.calls(), 0, "body: {}", body);
    }
}

#[tokio::test]
async fn test_malformed_body_is_client_error() {
    let client = ScriptedClient::new(vec![]);
    let app = create_test_app(client.clone());

    let (status, response) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/quizAi")
            .header("content-type", "application/json")
            .body(Body::from("{topic: "))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].is_string());
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_get_not_allowed() {
    let client = ScriptedClient::new(vec![]);
    let app = create_test_app(client.clone());

    let (status, response) = send(
        &app,
        Request::builder()
            .method("GET")
            .uri("/api/quizAi")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response["error"], "Method Not Allowed");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_exhausted_retries_return_500() {
    let client = ScriptedClient::new(vec![
        Reply::Text(quiz_json("History", 9).to_string()),
        Reply::Text(quiz_json("History", 9).to_string()),
        Reply::Text(quiz_json("History", 9).to_string()),
    ]);
    let app = create_test_app(client.clone());

    let (status, response) = post_json(&app, "/api/quizAi", json!({ "topic": "History" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"], "Failed to generate quiz");
    let details = response["details"].as_str().unwrap();
    assert!(details.contains("expected exactly 10 questions, found 9"), "{}", details);
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_upstream_failure_then_success() {
    let client = ScriptedClient::new(vec![
        Reply::Status(429),
        Reply::Text(quiz_json("Chemistry", 10).to_string()),
    ]);
    let app = create_test_app(client.clone());

    let (status, response) = post_json(&app, "/api/quizAi", json!({ "topic": "Chemistry" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["questions"].as_array().unwrap().len(), 10);
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_fenced_single_quoted_output_is_repaired() {
    let questions: Vec<String> = (0..10)
        .map(|i| {
            format!(
                "{{question:'What\\'s step {}?', options:{{A:'one', B:'two', C:'three', D:'four',}}, correctAnswer:'B', feedback:'It's the second.'}}",
                i + 1
            )
        })
        .collect();
    let raw = format!(
        "```json\n{{topic:'Algebra', questions:[{},]}}\n```",
        questions.join(", ")
    );
    let client = ScriptedClient::new(vec![Reply::Text(raw)]);
    let app = create_test_app(client.clone());

    let (status, response) = post_json(&app, "/api/quizAi", json!({ "topic": "Algebra" })).await;

    assert_eq!(status, StatusCode::OK, "{}", response);
    assert_eq!(response["topic"], "Algebra");
    assert_eq!(response["questions"][0]["question"], "What's step 1?");
    assert_eq!(response["questions"][9]["feedback"], "It's the second.");
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_score_quiz() {
    let client = ScriptedClient::new(vec![]);
    let app = create_test_app(client.clone());
    // correct answers cycle A, B, C, D
    let answers = json!(["A", "B", "C", "A", null, "B"]);

    let (status, response) = post_json(
        &app,
        "/api/quizAi/score",
        json!({ "quiz": quiz_json("Geography", 10), "answers": answers }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "correct": 4, "total": 10, "percentage": 40 }));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_score_rejects_invalid_quiz() {
    let client = ScriptedClient::new(vec![]);
    let app = create_test_app(client);
    let mut quiz = quiz_json("Geography", 10);
    quiz["questions"][0]["options"]
        .as_object_mut()
        .unwrap()
        .remove("D");

    let (status, response) = post_json(
        &app,
        "/api/quizAi/score",
        json!({ "quiz": quiz, "answers": ["A"] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid quiz document");
    assert!(response["details"].as_str().unwrap().contains("question 0"));
}

#[tokio::test]
async fn test_score_rejects_too_many_answers() {
    let client = ScriptedClient::new(vec![]);
    let app = create_test_app(client);
    let answers: Vec<&str> = vec!["A"; 11];

    let (status, _) = post_json(
        &app,
        "/api/quizAi/score",
        json!({ "quiz": quiz_json("Geography", 10), "answers": answers }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
