//! Authentication state shared by every view.
//!
//! Owns the persisted token and the backend handle. Views never touch the
//! token directly: expense calls go through the session so they always
//! carry the current credentials.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::api::{ApiError, Backend, LoginRequest, RegisterRequest};
use crate::models::{Expense, NewExpense, User};
use crate::storage::LocalStorage;

pub(crate) const MIN_PASSWORD_LEN: usize = 6;
const LOGIN_FALLBACK: &str = "Login failed";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@ \t\r\n]+@[^@ \t\r\n]+\.[^@ \t\r\n]+$").ok());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AuthState {
    pub(crate) token: Option<String>,
    pub(crate) user: Option<User>,
    pub(crate) authenticated: bool,
    /// True until the first `load_user` has finished.
    pub(crate) loading: bool,
}

/// Result of a login or signup attempt. Storage failures are reported
/// separately through the outer `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AuthOutcome {
    Success,
    Failed(String),
}

impl AuthOutcome {
    #[cfg(test)]
    pub(crate) fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

pub(crate) struct Session {
    storage: LocalStorage,
    backend: Box<dyn Backend>,
    state: AuthState,
}

impl Session {
    pub(crate) fn new(storage: LocalStorage, backend: Box<dyn Backend>) -> Result<Self> {
        let token = storage.token()?;
        Ok(Self {
            storage,
            backend,
            state: AuthState {
                token,
                user: None,
                authenticated: false,
                loading: true,
            },
        })
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &AuthState {
        &self.state
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub(crate) fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub(crate) fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Resolve the stored token into a user. Any failure drops the token.
    pub(crate) fn load_user(&mut self) -> Result<()> {
        let Some(token) = self.storage.token()? else {
            self.reset();
            return Ok(());
        };

        match self.backend.current_user(&token) {
            Ok(user) => {
                tracing::info!(email = %user.email, "session restored");
                self.state = AuthState {
                    token: Some(token),
                    user: Some(user),
                    authenticated: true,
                    loading: false,
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored token rejected, signing out");
                self.storage.remove_token()?;
                self.reset();
            }
        }
        Ok(())
    }

    pub(crate) fn login(&mut self, email: &str, password: &str) -> Result<AuthOutcome> {
        let email = email.trim();
        let body = LoginRequest { email, password };
        match self.backend.login(&body) {
            Ok(token) => self.accept_token(&token),
            Err(e) => {
                tracing::warn!(email, error = %e, "login failed");
                Ok(AuthOutcome::Failed(e.user_message(LOGIN_FALLBACK)))
            }
        }
    }

    /// Create an account and sign straight into it.
    pub(crate) fn register(&mut self, name: &str, email: &str, password: &str) -> Result<AuthOutcome> {
        let (name, email) = (name.trim(), email.trim());
        if let Err(message) = validate_signup(name, email, password) {
            return Ok(AuthOutcome::Failed(message));
        }

        let body = RegisterRequest {
            name,
            email,
            password,
        };
        match self.backend.register(&body) {
            Ok(token) => self.accept_token(&token),
            Err(e) => {
                tracing::warn!(email, error = %e, "registration failed");
                Ok(AuthOutcome::Failed(e.user_message(REGISTER_FALLBACK)))
            }
        }
    }

    pub(crate) fn logout(&mut self) -> Result<()> {
        self.storage.remove_token()?;
        self.reset();
        tracing::info!("signed out");
        Ok(())
    }

    fn accept_token(&mut self, token: &str) -> Result<AuthOutcome> {
        self.storage.set_token(token)?;
        self.load_user()?;
        if self.state.authenticated {
            Ok(AuthOutcome::Success)
        } else {
            Ok(AuthOutcome::Failed(
                "Signed in, but the account could not be loaded".into(),
            ))
        }
    }

    fn reset(&mut self) {
        self.state = AuthState::default();
    }

    // ── Expenses ──────────────────────────────────────────────

    fn token(&self) -> Result<&str, ApiError> {
        self.state.token.as_deref().ok_or(ApiError::NotAuthenticated)
    }

    pub(crate) fn fetch_expenses(&self) -> Result<Vec<Expense>, ApiError> {
        let expenses = self.backend.list_expenses(self.token()?)?;
        tracing::debug!(count = expenses.len(), "fetched expenses");
        Ok(expenses)
    }

    pub(crate) fn add_expense(&self, expense: &NewExpense) -> Result<Expense, ApiError> {
        let created = self.backend.create_expense(self.token()?, expense)?;
        tracing::info!(id = %created.id, category = %created.category, "expense added");
        Ok(created)
    }

    pub(crate) fn delete_expense(&self, id: &str) -> Result<(), ApiError> {
        self.backend.delete_expense(self.token()?, id)?;
        tracing::info!(id, "expense deleted");
        Ok(())
    }
}

/// Client-side checks mirroring the signup form's required fields.
pub(crate) fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), String> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err("Please fill all required fields".into());
    }
    if !is_valid_email(email) {
        return Err("Please include a valid email".into());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    EMAIL_RE
        .as_ref()
        .map_or_else(|| email.contains('@'), |re| re.is_match(email))
}
