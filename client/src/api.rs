// src/api.rs

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::models::{AccessTokenResponse, AnswerRequest, History, Question, QuizType, Score};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("not logged in")]
    NoToken,
}

/// What happened when joining a quiz type.
#[derive(Debug, PartialEq, Eq)]
pub enum Joined {
    New,
    /// The flow already exists; it may be resumed.
    Existing,
}

/// What happened when submitting an answer.
#[derive(Debug)]
pub enum Submitted {
    Recorded(History),
    AlreadyAnswered,
}

/// Thin client for the quiz HTTP API.
pub struct ApiClient {
    base: Url,
    http: Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(mut base: Url) -> Result<Self, ApiError> {
        // Relative joins drop the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            base,
            http,
            token: None,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::NoToken)?;
        Ok(builder.bearer_auth(token))
    }

    /// Logs in (registering the name on first use) and keeps the token.
    pub async fn login(&mut self, username: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("api/login")?)
            .json(&serde_json::json!({ "username": username }))
            .send()
            .await?;

        let body: AccessTokenResponse = expect_json(response, StatusCode::CREATED).await?;
        self.token = Some(body.access_token);
        Ok(())
    }

    pub async fn quiz_types(&self) -> Result<Vec<QuizType>, ApiError> {
        let response = self
            .authed(self.http.get(self.url("api/quiz/types")?))?
            .send()
            .await?;
        expect_json(response, StatusCode::OK).await
    }

    pub async fn join_quiz(&self, quiz_type: &str) -> Result<Joined, ApiError> {
        let url = self.quiz_url(quiz_type, &["join"])?;
        let response = self.authed(self.http.post(url))?.send().await?;

        match response.status() {
            StatusCode::CREATED => Ok(Joined::New),
            StatusCode::CONFLICT => Ok(Joined::Existing),
            _ => Err(status_error(response).await),
        }
    }

    /// `None` once the quiz is finished.
    pub async fn next_question(&self, quiz_type: &str) -> Result<Option<Question>, ApiError> {
        let url = self.quiz_url(quiz_type, &["next"])?;
        let response = self.authed(self.http.get(url))?.send().await?;

        if response.status() == StatusCode::CONFLICT {
            return Ok(None);
        }
        expect_json(response, StatusCode::OK).await.map(Some)
    }

    pub async fn submit_answer(
        &self,
        quiz_type: &str,
        question_id: &str,
        answer: &str,
    ) -> Result<Submitted, ApiError> {
        let url = self.quiz_url(quiz_type, &["answers", question_id])?;
        let response = self
            .authed(self.http.post(url))?
            .json(&AnswerRequest { answer })
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Ok(Submitted::AlreadyAnswered);
        }
        expect_json(response, StatusCode::CREATED)
            .await
            .map(Submitted::Recorded)
    }

    pub async fn score(&self, quiz_type: &str) -> Result<Score, ApiError> {
        let url = self.quiz_url(quiz_type, &["score"])?;
        let response = self.authed(self.http.get(url))?.send().await?;
        expect_json(response, StatusCode::OK).await
    }

    /// `api/quiz/types/<quiz_type>/<rest..>`, with every segment escaped.
    fn quiz_url(&self, quiz_type: &str, rest: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.url("api/quiz/types/")?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty().push(quiz_type).extend(rest);
        }
        Ok(url)
    }
}

async fn expect_json<T: DeserializeOwned>(
    response: Response,
    expected: StatusCode,
) -> Result<T, ApiError> {
    if response.status() != expected {
        return Err(status_error(response).await);
    }
    Ok(response.json().await?)
}

async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body["error"]
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => String::new(),
    };
    ApiError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_urls_escape_segments() {
        let client = ApiClient::new(Url::parse("http://localhost:8080/").unwrap()).unwrap();

        let url = client.quiz_url("world geo", &["answers", "q/1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/quiz/types/world%20geo/answers/q%2F1"
        );
    }

    #[test]
    fn base_path_is_kept() {
        let client = ApiClient::new(Url::parse("http://example.com/quiz").unwrap()).unwrap();
        let url = client.quiz_url("geo", &["next"]).unwrap();
        assert_eq!(url.as_str(), "http://example.com/quiz/api/quiz/types/geo/next");
    }
}
