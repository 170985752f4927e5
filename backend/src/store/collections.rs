// src/store/collections.rs

use std::path::Path;

use super::{Repository, StoreError};
use crate::models::{History, Question, QuestionFlow, QuizType, User};

/// The five collections backing the quiz service, one file each.
#[derive(Debug)]
pub struct Collections {
    pub users: Repository<User>,
    pub history: Repository<History>,
    pub questions: Repository<Question>,
    pub quiz_types: Repository<QuizType>,
    pub flows: Repository<QuestionFlow>,
}

impl Collections {
    /// Opens every collection under `data_dir`. Any failure is fatal: the
    /// service must not run with a collection it could not load.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = data_dir.as_ref();
        Ok(Self {
            users: Repository::in_dir(dir, "users")?,
            history: Repository::in_dir(dir, "history")?,
            questions: Repository::in_dir(dir, "questions")?,
            quiz_types: Repository::in_dir(dir, "quiz_types")?,
            flows: Repository::in_dir(dir, "question_flows")?,
        })
    }
}
