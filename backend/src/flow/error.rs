// src/flow/error.rs

use thiserror::Error;

use crate::store::StoreError;

/// Coarse classification of a [`FlowError`], used by the HTTP layer to pick a
/// status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidState,
    Validation,
    Storage,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("quiz type '{0}' not found")]
    QuizTypeNotFound(String),

    #[error("question flow '{0}' not found")]
    FlowNotFound(String),

    #[error("question '{0}' not found")]
    QuestionNotFound(String),

    #[error("quiz type '{0}' has no questions")]
    NoQuestions(String),

    #[error("username '{0}' already exists")]
    UsernameTaken(String),

    #[error("user '{user}' already joined quiz type '{quiz_type}'")]
    AlreadyJoined { user: String, quiz_type: String },

    #[error("question '{0}' was already answered in this flow")]
    AlreadyAnswered(String),

    #[error("question flow is already closed")]
    FlowClosed,

    #[error("all questions have been answered; the question flow is now closed")]
    AllAnswered,

    #[error("question '{question}' is not part of quiz type '{quiz_type}'")]
    QuestionNotInQuiz { question: String, quiz_type: String },

    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    #[error(transparent)]
    Storage(StoreError),
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::UserNotFound(_)
            | FlowError::QuizTypeNotFound(_)
            | FlowError::FlowNotFound(_)
            | FlowError::QuestionNotFound(_)
            | FlowError::NoQuestions(_) => ErrorKind::NotFound,
            FlowError::UsernameTaken(_)
            | FlowError::AlreadyJoined { .. }
            | FlowError::AlreadyAnswered(_) => ErrorKind::Conflict,
            FlowError::FlowClosed | FlowError::AllAnswered => ErrorKind::InvalidState,
            FlowError::QuestionNotInQuiz { .. } | FlowError::InvalidEntity(_) => {
                ErrorKind::Validation
            }
            FlowError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<StoreError> for FlowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidEntity(msg) => FlowError::InvalidEntity(msg),
            other => FlowError::Storage(other),
        }
    }
}
