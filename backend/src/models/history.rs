// src/models/history.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Identifiable;

/// One submitted answer. Append-only, persisted in `history.data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub id: String,
    pub user_id: String,
    pub question_id: String,

    /// What the user submitted.
    pub answer: String,

    /// Snapshot of the question's correct answer at submission time.
    pub expected_answer: String,

    pub created_at: DateTime<Utc>,
}

impl History {
    pub fn new(
        user_id: impl Into<String>,
        question_id: impl Into<String>,
        answer: impl Into<String>,
        expected_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            question_id: question_id.into(),
            answer: answer.into(),
            expected_answer: expected_answer.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_correct(&self) -> bool {
        self.answer == self.expected_answer
    }
}

impl Identifiable for History {
    fn id(&self) -> String {
        self.id.clone()
    }
}

/// DTO for submitting an answer.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, max = 500))]
    pub answer: String,
}
