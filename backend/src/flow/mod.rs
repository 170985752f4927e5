// src/flow/mod.rs

//! The quiz-taking protocol on top of the five collections.
//!
//! Every operation that writes, or that must see several collections in a
//! consistent state, runs under one process-wide coordination lock. Catalog
//! reads (`list_quiz_types`, `get_question`, `get_user`) only take the
//! per-collection read locks.

mod error;

use std::{
    collections::HashSet,
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;

pub use error::{ErrorKind, FlowError};

use crate::{
    models::{
        History, Identifiable, Question, QuestionFlow, QuizType, Score, User, flow_id,
        user::USERNAME_RE,
    },
    store::{Collections, StoreError},
};

#[derive(Debug)]
pub struct FlowManager {
    collections: Collections,
    lock: Mutex<()>,
}

impl FlowManager {
    pub fn new(collections: Collections) -> Self {
        Self {
            collections,
            lock: Mutex::new(()),
        }
    }

    /// Opens every collection under `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(Collections::open(data_dir)?))
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    fn coordinate(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new user. An existing username is reported as
    /// [`FlowError::UsernameTaken`]; callers decide whether that means "log in".
    pub fn create_user(&self, username: &str) -> Result<User, FlowError> {
        if !USERNAME_RE.is_match(username) {
            return Err(FlowError::InvalidEntity(format!(
                "invalid username '{username}': use letters, digits, '_', '.' or '-'"
            )));
        }

        let _guard = self.coordinate();
        let users = &self.collections.users;

        if users.contains(username) {
            return Err(FlowError::UsernameTaken(username.to_string()));
        }

        let user = User::new(username);
        users.save(user.clone())?;

        tracing::info!(username, "User created");
        Ok(user)
    }

    pub fn get_user(&self, username: &str) -> Result<User, FlowError> {
        self.collections
            .users
            .find(username)
            .ok_or_else(|| FlowError::UserNotFound(username.to_string()))
    }

    /// Every quiz type, ordered by name.
    pub fn list_quiz_types(&self) -> Result<Vec<QuizType>, FlowError> {
        Ok(self.collections.quiz_types.list_all())
    }

    pub fn get_question(&self, id: &str) -> Result<Question, FlowError> {
        self.collections
            .questions
            .find(id)
            .ok_or_else(|| FlowError::QuestionNotFound(id.to_string()))
    }

    /// Starts a flow for `user_id` on `quiz_type` and links it to the user.
    ///
    /// Both writes happen under the coordination lock. If the user record
    /// cannot be updated the new flow is removed again.
    pub fn join_quiz(&self, user_id: &str, quiz_type: &str) -> Result<QuestionFlow, FlowError> {
        let _guard = self.coordinate();
        let Collections {
            users,
            quiz_types,
            flows,
            ..
        } = &self.collections;

        if !quiz_types.contains(quiz_type) {
            return Err(FlowError::QuizTypeNotFound(quiz_type.to_string()));
        }

        let id = flow_id(user_id, quiz_type);
        if flows.contains(&id) {
            return Err(FlowError::AlreadyJoined {
                user: user_id.to_string(),
                quiz_type: quiz_type.to_string(),
            });
        }

        let mut user = users
            .find(user_id)
            .ok_or_else(|| FlowError::UserNotFound(user_id.to_string()))?;

        let flow = QuestionFlow::new(user_id, quiz_type);
        flows.save(flow.clone())?;

        user.flow_ids.push(id.clone());
        if let Err(e) = users.save(user) {
            tracing::error!(flow = %id, error = %e, "Failed to link flow to user, removing flow");
            if let Err(undo) = flows.remove(&id) {
                tracing::error!(flow = %id, error = %undo, "Failed to remove orphaned flow");
            }
            return Err(e.into());
        }

        tracing::info!(user = user_id, quiz_type, "Quiz joined");
        Ok(flow)
    }

    pub fn get_flow(&self, user_id: &str, quiz_type: &str) -> Result<QuestionFlow, FlowError> {
        let id = flow_id(user_id, quiz_type);
        self.collections
            .flows
            .find(&id)
            .ok_or(FlowError::FlowNotFound(id))
    }

    /// Returns the first question of the quiz type, in catalog order, that
    /// this flow has not answered yet.
    ///
    /// When none is left the flow is closed at the time of its latest answer
    /// and [`FlowError::AllAnswered`] is returned.
    pub fn next_question(&self, flow_id: &str) -> Result<Question, FlowError> {
        let _guard = self.coordinate();

        let mut flow = self.open_flow(flow_id)?;
        let quiz = self.quiz_of(&flow)?;
        if quiz.question_ids.is_empty() {
            return Err(FlowError::NoQuestions(quiz.name));
        }

        let answers = self.answers_of(&flow);
        let answered: HashSet<&str> = answers.iter().map(|h| h.question_id.as_str()).collect();

        for question_id in quiz
            .question_ids
            .iter()
            .filter(|id| !answered.contains(id.as_str()))
        {
            match self.collections.questions.find(question_id) {
                Some(question) => return Ok(question),
                None => {
                    tracing::warn!(question = %question_id, quiz_type = %quiz.name, "Catalog references a missing question");
                }
            }
        }

        let closed_at = answers
            .iter()
            .map(|h| h.created_at)
            .max()
            .unwrap_or_else(Utc::now);
        flow.closed_at = Some(closed_at);
        self.collections.flows.save(flow)?;

        tracing::info!(flow = flow_id, %closed_at, "Question flow closed");
        Err(FlowError::AllAnswered)
    }

    /// Records `answer` for `question_id` and recomputes the flow's accuracy.
    ///
    /// The question's current answer is copied into the history record;
    /// accuracy is always derived from those copies.
    pub fn record_answer(
        &self,
        flow_id: &str,
        question_id: &str,
        answer: &str,
    ) -> Result<History, FlowError> {
        let _guard = self.coordinate();
        let Collections {
            history,
            questions,
            flows,
            ..
        } = &self.collections;

        let mut flow = self.open_flow(flow_id)?;
        let quiz = self.quiz_of(&flow)?;
        if !quiz.contains(question_id) {
            return Err(FlowError::QuestionNotInQuiz {
                question: question_id.to_string(),
                quiz_type: quiz.name,
            });
        }

        let mut answers = self.answers_of(&flow);
        if answers.iter().any(|h| h.question_id == question_id) {
            return Err(FlowError::AlreadyAnswered(question_id.to_string()));
        }

        let question = questions
            .find(question_id)
            .ok_or_else(|| FlowError::QuestionNotFound(question_id.to_string()))?;

        let entry = History::new(&flow.user_id, question_id, answer, &question.answer);
        history.save(entry.clone())?;

        flow.history_ids.push(entry.id.clone());
        answers.push(entry.clone());
        flow.accuracy_rate = accuracy(&answers);

        if let Err(e) = flows.save(flow) {
            tracing::error!(flow = flow_id, error = %e, "Failed to update flow, removing history entry");
            if let Err(undo) = history.remove(&entry.id) {
                tracing::error!(history = %entry.id, error = %undo, "Failed to remove orphaned history entry");
            }
            return Err(e.into());
        }

        tracing::debug!(
            flow = flow_id,
            question = question_id,
            correct = entry.is_correct(),
            "Answer recorded"
        );
        Ok(entry)
    }

    /// The user's flow plus the mean accuracy of every closed flow of the
    /// same quiz type.
    pub fn get_score(&self, user_id: &str, quiz_type: &str) -> Result<Score, FlowError> {
        let _guard = self.coordinate();

        let user_quiz = self.get_flow(user_id, quiz_type)?;

        let closed: Vec<f64> = self
            .collections
            .flows
            .list_all()
            .into_iter()
            .filter(|f| f.quiz_type == quiz_type && f.is_closed())
            .map(|f| f.accuracy_rate)
            .collect();

        let cohort_accuracy =
            (!closed.is_empty()).then(|| closed.iter().sum::<f64>() / closed.len() as f64);

        Ok(Score {
            user_quiz,
            cohort_accuracy,
            cohort_size: closed.len(),
        })
    }

    fn open_flow(&self, id: &str) -> Result<QuestionFlow, FlowError> {
        let flow = self
            .collections
            .flows
            .find(id)
            .ok_or_else(|| FlowError::FlowNotFound(id.to_string()))?;

        if flow.is_closed() {
            return Err(FlowError::FlowClosed);
        }
        Ok(flow)
    }

    fn quiz_of(&self, flow: &QuestionFlow) -> Result<QuizType, FlowError> {
        self.collections
            .quiz_types
            .find(&flow.quiz_type)
            .ok_or_else(|| FlowError::QuizTypeNotFound(flow.quiz_type.clone()))
    }

    /// Resolves the flow's history. Dangling references are skipped.
    fn answers_of(&self, flow: &QuestionFlow) -> Vec<History> {
        flow.history_ids
            .iter()
            .filter_map(|id| {
                let entry = self.collections.history.find(id);
                if entry.is_none() {
                    tracing::warn!(flow = %flow.id(), history = %id, "Flow references a missing history entry");
                }
                entry
            })
            .collect()
    }
}

/// Fraction of correct answers, `1.0` when nothing was answered yet.
fn accuracy(answers: &[History]) -> f64 {
    if answers.is_empty() {
        return 1.0;
    }
    let correct = answers.iter().filter(|h| h.is_correct()).count();
    correct as f64 / answers.len() as f64
}
