// src/models/mod.rs

pub mod history;
pub mod question;
pub mod question_flow;
pub mod quiz_type;
pub mod user;

pub use history::History;
pub use question::{PublicQuestion, Question};
pub use question_flow::{QuestionFlow, Score, flow_id};
pub use quiz_type::QuizType;
pub use user::User;

/// Anything that can be kept in a [`Repository`](crate::store::Repository).
///
/// The identity must be a pure function of the entity's own fields so that
/// callers can recompute it without a secondary index.
pub trait Identifiable {
    fn id(&self) -> String;
}
