// src/models/quiz_type.rs

use serde::{Deserialize, Serialize};

use super::Identifiable;

/// A named, ordered list of questions. Persisted in `quiz_types.data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizType {
    pub name: String,

    /// Question identities in the order they are served.
    #[serde(default)]
    pub question_ids: Vec<String>,
}

impl QuizType {
    pub fn contains(&self, question_id: &str) -> bool {
        self.question_ids.iter().any(|id| id == question_id)
    }
}

impl Identifiable for QuizType {
    fn id(&self) -> String {
        self.name.clone()
    }
}
