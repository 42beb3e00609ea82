//! Structural validation of model output against the quiz shape.
//!
//! The checks run depth-first over an untyped [`Value`] and stop at the first
//! violation. Nothing is coerced: a value either narrows to a
//! [`QuizDocument`] or is rejected with the reason.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::quiz::{
    OptionKey, QuizDocument, QuizOptions, QuizQuestion, QUIZ_QUESTION_COUNT,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("quiz must be a JSON object")]
    NotAnObject,

    #[error("quiz topic must be a string")]
    TopicNotText,

    #[error("quiz questions must be an array")]
    QuestionsNotArray,

    #[error("expected exactly {expected} questions, found {found}")]
    WrongQuestionCount { expected: usize, found: usize },

    #[error("question {index}: {reason}")]
    InvalidQuestion { index: usize, reason: QuestionViolation },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionViolation {
    #[error("must be a JSON object")]
    NotAnObject,

    #[error("field `{0}` must be a string")]
    FieldNotText(&'static str),

    #[error("options must be an object")]
    OptionsNotObject,

    #[error("option `{0}` is missing or not a string")]
    MissingOption(&'static str),

    #[error("unexpected option key `{0}`")]
    UnexpectedOption(String),

    #[error("correctAnswer `{0}` is not one of A, B, C, D")]
    UnknownAnswer(String),
}

/// Validates `value` and returns it reinterpreted as a [`QuizDocument`].
pub fn validate_quiz(value: &Value) -> Result<QuizDocument, SchemaError> {
    let quiz = value.as_object().ok_or(SchemaError::NotAnObject)?;

    let topic = quiz
        .get("topic")
        .and_then(Value::as_str)
        .ok_or(SchemaError::TopicNotText)?;

    let questions = quiz
        .get("questions")
        .and_then(Value::as_array)
        .ok_or(SchemaError::QuestionsNotArray)?;

    if questions.len() != QUIZ_QUESTION_COUNT {
        return Err(SchemaError::WrongQuestionCount {
            expected: QUIZ_QUESTION_COUNT,
            found: questions.len(),
        });
    }

    let questions = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            validate_question(question)
                .map_err(|reason| SchemaError::InvalidQuestion { index, reason })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuizDocument {
        topic: topic.to_string(),
        questions,
    })
}

pub fn is_quiz_document(value: &Value) -> bool {
    validate_quiz(value).is_ok()
}

fn validate_question(value: &Value) -> Result<QuizQuestion, QuestionViolation> {
    let question = value.as_object().ok_or(QuestionViolation::NotAnObject)?;

    let text = text_field(question, "question")?;
    let options = question
        .get("options")
        .ok_or(QuestionViolation::OptionsNotObject)
        .and_then(validate_options)?;

    let answer = text_field(question, "correctAnswer")?;
    let correct_answer = OptionKey::from_label(answer)
        .ok_or_else(|| QuestionViolation::UnknownAnswer(answer.to_string()))?;

    let feedback = text_field(question, "feedback")?;

    Ok(QuizQuestion {
        question: text.to_string(),
        options,
        correct_answer,
        feedback: feedback.to_string(),
    })
}

fn validate_options(value: &Value) -> Result<QuizOptions, QuestionViolation> {
    let options = value.as_object().ok_or(QuestionViolation::OptionsNotObject)?;

    if let Some(extra) = options
        .keys()
        .find(|key| OptionKey::from_label(key).is_none())
    {
        return Err(QuestionViolation::UnexpectedOption(extra.clone()));
    }

    let option = |key: OptionKey| {
        options
            .get(key.as_str())
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(QuestionViolation::MissingOption(key.as_str()))
    };

    Ok(QuizOptions {
        a: option(OptionKey::A)?,
        b: option(OptionKey::B)?,
        c: option(OptionKey::C)?,
        d: option(OptionKey::D)?,
    })
}

fn text_field<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, QuestionViolation> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or(QuestionViolation::FieldNotText(field))
}
