// src/models/user.rs

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Identifiable;

/// Characters allowed in a username. `:` is excluded because it separates the
/// two halves of a flow identity.
pub static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid username regex"));

/// Persisted in `users.data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique username, also the identity.
    pub username: String,

    pub created_at: DateTime<Utc>,

    /// Identities of the flows this user has joined, in join order.
    #[serde(default)]
    pub flow_ids: Vec<String>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            created_at: Utc::now(),
            flow_ids: Vec::new(),
        }
    }
}

impl Identifiable for User {
    fn id(&self) -> String {
        self.username.clone()
    }
}

/// DTO for logging in. Unknown usernames are registered on the fly.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        length(
            min = 1,
            max = 50,
            message = "Username length must be between 1 and 50 characters."
        ),
        regex(
            path = *USERNAME_RE,
            message = "Username may only contain letters, digits, '_', '.' and '-'."
        )
    )]
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        let ok = LoginRequest {
            username: "alice_01.x-y".to_string(),
        };
        assert!(ok.validate().is_ok());

        for bad in ["", "a:b", "with space", &"x".repeat(51)] {
            let req = LoginRequest {
                username: bad.to_string(),
            };
            assert!(req.validate().is_err(), "{bad:?} should be rejected");
        }
    }
}
