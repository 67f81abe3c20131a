use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::{
    extract_message, ApiError, Backend, LoginRequest, RegisterRequest, TokenResponse,
};
use crate::config::{AuthHeader, Config};
use crate::models::{Expense, NewExpense, User};

/// Blocking JSON client for the Fin-Track REST API.
#[derive(Debug)]
pub(crate) struct HttpBackend {
    client: Client,
    base_url: String,
    auth_header: AuthHeader,
}

impl HttpBackend {
    pub(crate) fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("fintrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            auth_header: config.auth_header,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn expense_url(&self, id: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.url("/expenses"))
            .map_err(|e| ApiError::Transport(format!("invalid API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport("invalid API URL".into()))?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        match self.auth_header {
            AuthHeader::Bearer => request.bearer_auth(token),
            AuthHeader::XAuthToken => request.header("x-auth-token", token),
        }
    }

    fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, ApiError> {
        let response = request.send().map_err(|e| self.map_request_error(e))?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(%status, what, "request succeeded");
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = extract_message(&body);
        tracing::warn!(
            status = status.as_u16(),
            what,
            message = message.as_deref().unwrap_or(""),
            "request rejected"
        );
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn map_request_error(&self, error: reqwest::Error) -> ApiError {
        tracing::error!(error = %error, base_url = %self.base_url, "request failed");
        if error.is_timeout() {
            ApiError::Timeout
        } else if error.is_connect() {
            ApiError::Connect(self.base_url.clone())
        } else {
            ApiError::Transport(error.to_string())
        }
    }
}

impl Backend for HttpBackend {
    fn register(&self, body: &RegisterRequest<'_>) -> Result<String, ApiError> {
        let request = self.client.post(self.url("/auth/register")).json(body);
        let response = self.send(request, "register")?;
        Ok(Self::json::<TokenResponse>(response)?.token)
    }

    fn login(&self, body: &LoginRequest<'_>) -> Result<String, ApiError> {
        let request = self.client.post(self.url("/auth/login")).json(body);
        let response = self.send(request, "login")?;
        Ok(Self::json::<TokenResponse>(response)?.token)
    }

    fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let request = self.authorize(self.client.get(self.url("/auth/user")), token);
        Self::json(self.send(request, "load user")?)
    }

    fn list_expenses(&self, token: &str) -> Result<Vec<Expense>, ApiError> {
        let request = self.authorize(self.client.get(self.url("/expenses")), token);
        Self::json(self.send(request, "list expenses")?)
    }

    fn create_expense(&self, token: &str, expense: &NewExpense) -> Result<Expense, ApiError> {
        let request = self.authorize(
            self.client.post(self.url("/expenses")).json(expense),
            token,
        );
        Self::json(self.send(request, "create expense")?)
    }

    fn delete_expense(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let request = self.authorize(self.client.delete(self.expense_url(id)?), token);
        self.send(request, "delete expense")?;
        Ok(())
    }
}
