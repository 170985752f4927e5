// src/models/question_flow.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Identifiable;

/// Deterministic identity of the flow owned by `user_id` for `quiz_type`.
///
/// Neither usernames nor quiz type names may contain `:` (user creation and
/// catalog import reject it), so the first separator splits the pair.
pub fn flow_id(user_id: &str, quiz_type: &str) -> String {
    format!("{user_id}:{quiz_type}")
}

/// One user's attempt at one quiz type. Persisted in `question_flows.data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionFlow {
    pub user_id: String,
    pub quiz_type: String,

    /// History identities in submission order.
    #[serde(default)]
    pub history_ids: Vec<String>,

    pub created_at: DateTime<Utc>,

    /// `None` while the flow is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Fraction of correct answers so far, `1.0` before the first answer.
    pub accuracy_rate: f64,
}

impl QuestionFlow {
    pub fn new(user_id: impl Into<String>, quiz_type: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            quiz_type: quiz_type.into(),
            history_ids: Vec::new(),
            created_at: Utc::now(),
            closed_at: None,
            accuracy_rate: 1.0,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

impl Identifiable for QuestionFlow {
    fn id(&self) -> String {
        flow_id(&self.user_id, &self.quiz_type)
    }
}

/// A user's flow together with the average accuracy of every closed flow
/// of the same quiz type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub user_quiz: QuestionFlow,

    /// `None` when no flow of this quiz type has been closed yet.
    pub cohort_accuracy: Option<f64>,

    pub cohort_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_recomputable_from_fields() {
        let flow = QuestionFlow::new("alice", "geo");
        assert_eq!(flow.id(), flow_id("alice", "geo"));
        assert_eq!(flow.accuracy_rate, 1.0);
        assert!(!flow.is_closed());
    }

    #[test]
    fn open_flow_omits_closed_at() {
        let flow = QuestionFlow::new("alice", "geo");
        let json = serde_json::to_value(&flow).unwrap();
        assert!(json.get("closed_at").is_none());

        let back: QuestionFlow = serde_json::from_value(json).unwrap();
        assert_eq!(back, flow);
    }
}
