//! REST backend access.
//!
//! [`Backend`] is the seam between the client and the server. The session
//! and views only ever see this trait; [`HttpBackend`] is the real
//! implementation.

mod http;

pub(crate) use http::HttpBackend;

use serde::{Deserialize, Serialize};

use crate::models::{Expense, NewExpense, User};

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("Not authenticated")]
    NotAuthenticated,
    /// The server answered with a non-success status.
    #[error("{}", .message.as_deref().unwrap_or("Request rejected by server"))]
    Rejected { status: u16, message: Option<String> },
    #[error("Unable to connect to {0}")]
    Connect(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message to show the user: the server's own message when it sent one,
    /// otherwise `fallback` for rejections and the error text for anything else.
    pub(crate) fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(m), ..
            } => m.clone(),
            Self::Rejected { message: None, .. } => fallback.to_string(),
            other => other.to_string(),
        }
    }

    pub(crate) fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::Rejected { status: 401, .. }
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub(crate) name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) token: String,
}

pub(crate) trait Backend {
    /// `POST /auth/register`, returns the new session token.
    fn register(&self, body: &RegisterRequest<'_>) -> Result<String, ApiError>;

    /// `POST /auth/login`, returns the session token.
    fn login(&self, body: &LoginRequest<'_>) -> Result<String, ApiError>;

    /// `GET /auth/user`
    fn current_user(&self, token: &str) -> Result<User, ApiError>;

    /// `GET /expenses`
    fn list_expenses(&self, token: &str) -> Result<Vec<Expense>, ApiError>;

    /// `POST /expenses`, returns the stored expense.
    fn create_expense(&self, token: &str, expense: &NewExpense) -> Result<Expense, ApiError>;

    /// `DELETE /expenses/{id}`
    fn delete_expense(&self, token: &str, id: &str) -> Result<(), ApiError>;
}

/// Error payloads come in two shapes:
/// `{"msg": "..."}` and `{"errors": [{"msg": "..."}, ...]}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
struct FieldError {
    #[serde(default)]
    msg: Option<String>,
}

/// Pull the most specific message out of an error body. The first
/// validation error wins over the top-level `msg`.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .errors
        .into_iter()
        .find_map(|e| e.msg)
        .or(parsed.msg)
        .filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
pub(crate) mod mock_server;
