// src/models/question.rs

use serde::{Deserialize, Serialize};

use super::Identifiable;

/// Persisted in `questions.data.json`. Read-only catalog data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    /// The text shown to the user.
    pub prompt: String,

    /// Choices in display order (e.g. `["A: Madrid", "B: Paris"]`).
    #[serde(default)]
    pub options: Vec<String>,

    /// The canonical correct choice.
    pub answer: String,
}

impl Identifiable for Question {
    fn id(&self) -> String {
        self.id.clone()
    }
}

/// DTO for sending a question to the client (excludes the answer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            prompt: q.prompt,
            options: q.options,
        }
    }
}
