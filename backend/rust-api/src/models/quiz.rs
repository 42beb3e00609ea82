use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of questions every generated quiz must contain.
pub const QUIZ_QUESTION_COUNT: usize = 10;

/// Topic supplied by the caller, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizTopic(String);

impl QuizTopic {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuizTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::A => "A",
            OptionKey::B => "B",
            OptionKey::C => "C",
            OptionKey::D => "D",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuizOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl QuizOptions {
    pub fn get(&self, key: OptionKey) -> &str {
        match key {
            OptionKey::A => &self.a,
            OptionKey::B => &self.b,
            OptionKey::C => &self.c,
            OptionKey::D => &self.d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: QuizOptions,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: OptionKey,
    pub feedback: String,
}

/// A validated quiz. Only produced by the schema validator, so the question
/// count is always [`QUIZ_QUESTION_COUNT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDocument {
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
}

impl QuizDocument {
    /// Grades positional answers. Missing or `None` entries count as wrong.
    pub fn grade(&self, answers: &[Option<OptionKey>]) -> QuizScore {
        let correct = self
            .questions
            .iter()
            .enumerate()
            .filter(|(index, question)| {
                answers.get(*index).copied().flatten() == Some(question.correct_answer)
            })
            .count() as u32;
        QuizScore::new(correct, self.questions.len() as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

impl QuizScore {
    pub fn new(correct: u32, total: u32) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((correct as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            correct,
            total,
            percentage,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScoreQuizRequest {
    pub quiz: serde_json::Value,
    #[serde(default)]
    pub answers: Vec<Option<OptionKey>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: OptionKey) -> QuizQuestion {
        QuizQuestion {
            question: "Which one?".into(),
            options: QuizOptions {
                a: "one".into(),
                b: "two".into(),
                c: "three".into(),
                d: "four".into(),
            },
            correct_answer: correct,
            feedback: "Because.".into(),
        }
    }

    #[test]
    fn test_topic_is_trimmed() {
        let topic = QuizTopic::parse("  Photosynthesis \n").unwrap();
        assert_eq!(topic.as_str(), "Photosynthesis");
    }

    #[test]
    fn test_blank_topic_rejected() {
        assert!(QuizTopic::parse("").is_none());
        assert!(QuizTopic::parse(" \t\n ").is_none());
    }

    #[test]
    fn test_option_key_labels() {
        assert_eq!(OptionKey::from_label("C"), Some(OptionKey::C));
        assert_eq!(OptionKey::from_label("c"), None);
        assert_eq!(OptionKey::from_label("E"), None);
    }

    #[test]
    fn test_grade_counts_positional_matches() {
        let quiz = QuizDocument {
            topic: "Mixed".into(),
            questions: vec![
                question(OptionKey::A),
                question(OptionKey::B),
                question(OptionKey::C),
                question(OptionKey::D),
            ],
        };

        let score = quiz.grade(&[Some(OptionKey::A), Some(OptionKey::C), None]);

        assert_eq!(score.correct, 1);
        assert_eq!(score.total, 4);
        assert_eq!(score.percentage, 25);
    }

    #[test]
    fn test_score_percentage_rounds() {
        assert_eq!(QuizScore::new(2, 3).percentage, 67);
        assert_eq!(QuizScore::new(0, 0).percentage, 0);
    }

    #[test]
    fn test_question_serializes_camel_case_answer() {
        let json = serde_json::to_value(question(OptionKey::B)).unwrap();
        assert_eq!(json["correctAnswer"], "B");
        assert_eq!(json["options"]["D"], "four");
    }
}
