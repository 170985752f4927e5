// src/models.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizType {
    pub name: String,
    #[serde(default)]
    pub question_ids: Vec<String>,
}

/// A question as served by the API, without its answer.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnswerRequest<'a> {
    pub answer: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct History {
    pub answer: String,
    pub expected_answer: String,
}

impl History {
    pub fn is_correct(&self) -> bool {
        self.answer == self.expected_answer
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flow {
    pub quiz_type: String,
    #[serde(default)]
    pub history_ids: Vec<String>,
    pub closed_at: Option<String>,
    pub accuracy_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Score {
    pub user_quiz: Flow,
    pub cohort_accuracy: Option<f64>,
    pub cohort_size: usize,
}
