use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use super::theme::Theme;
use super::util::clamp_cursor;
use crate::analytics::{self, Summary};
use crate::models::{Category, Expense, FormError, NewExpense};
use crate::report;
use crate::session::{AuthOutcome, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Signup,
    Login,
    Dashboard,
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signup => write!(f, "Sign Up"),
            Self::Login => write!(f, "Login"),
            Self::Dashboard => write!(f, "Dashboard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteExpense { id: String, label: String },
}

/// Work queued by a key press and run after the next frame, so the
/// screen can show a busy label while the blocking request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pending {
    Signup,
    Login,
    FetchExpenses,
}

// ── Forms ────────────────────────────────────────────────────

/// Field focus cycling shared by the forms.
pub(crate) trait FormField: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SignupField {
    #[default]
    Name,
    Email,
    Password,
}

impl FormField for SignupField {
    const ALL: &'static [Self] = &[Self::Name, Self::Email, Self::Password];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LoginField {
    #[default]
    Email,
    Password,
}

impl FormField for LoginField {
    const ALL: &'static [Self] = &[Self::Email, Self::Password];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ExpenseField {
    #[default]
    Amount,
    Category,
    Description,
    Date,
}

impl FormField for ExpenseField {
    const ALL: &'static [Self] = &[
        Self::Amount,
        Self::Category,
        Self::Description,
        Self::Date,
    ];
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SignupForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) focus: SignupField,
    pub(crate) error: Option<String>,
    pub(crate) submitting: bool,
}

impl SignupForm {
    pub(crate) fn active_text(&mut self) -> &mut String {
        match self.focus {
            SignupField::Name => &mut self.name,
            SignupField::Email => &mut self.email,
            SignupField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LoginForm {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) focus: LoginField,
    pub(crate) error: Option<String>,
    pub(crate) submitting: bool,
}

impl LoginForm {
    pub(crate) fn active_text(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ExpenseForm {
    pub(crate) amount: String,
    pub(crate) category: Category,
    pub(crate) description: String,
    pub(crate) date: String,
    pub(crate) focus: ExpenseField,
    pub(crate) error: Option<String>,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self {
            amount: String::new(),
            category: Category::default(),
            description: String::new(),
            date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            focus: ExpenseField::default(),
            error: None,
        }
    }
}

impl ExpenseForm {
    /// The text buffer under the cursor. The category field is a select.
    pub(crate) fn active_text(&mut self) -> Option<&mut String> {
        match self.focus {
            ExpenseField::Amount => Some(&mut self.amount),
            ExpenseField::Category => None,
            ExpenseField::Description => Some(&mut self.description),
            ExpenseField::Date => Some(&mut self.date),
        }
    }

    pub(crate) fn to_new_expense(&self) -> Result<NewExpense, FormError> {
        NewExpense::from_form(
            &self.amount,
            self.category.as_str(),
            &self.description,
            &self.date,
        )
    }

    /// Clear amount and description after a successful submit.
    /// Category and date carry over to the next entry.
    pub(crate) fn reset_after_submit(&mut self) {
        self.amount.clear();
        self.description.clear();
        self.focus = ExpenseField::Amount;
        self.error = None;
    }
}

// ── App state ────────────────────────────────────────────────

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) theme: Theme,
    pub(crate) currency: String,
    pub(crate) user_name: Option<String>,
    pub(crate) pending: Option<Pending>,

    // Auth
    pub(crate) signup: SignupForm,
    pub(crate) login: LoginForm,

    // Dashboard
    pub(crate) expense_form: ExpenseForm,
    pub(crate) expenses: Vec<Expense>,
    pub(crate) summary: Summary,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(theme: Theme, currency: impl Into<String>) -> Self {
        Self {
            running: true,
            screen: Screen::Signup,
            input_mode: InputMode::Editing,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            theme,
            currency: currency.into(),
            user_name: None,
            pending: None,

            signup: SignupForm::default(),
            login: LoginForm::default(),

            expense_form: ExpenseForm::default(),
            expenses: Vec::new(),
            summary: Summary::default(),
            expense_index: 0,
            expense_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Apply the auth redirects: signed-in users land on the dashboard,
    /// the dashboard bounces everyone else to the login form.
    pub(crate) fn route(&mut self, session: &Session) {
        if session.is_loading() {
            return;
        }
        self.user_name = session.user().map(|u| u.name.clone());

        if session.is_authenticated() {
            if self.screen != Screen::Dashboard {
                self.enter_dashboard();
            }
        } else if self.screen == Screen::Dashboard {
            self.leave_dashboard();
            self.go_to(Screen::Login);
        }
    }

    /// Switch between the two auth forms.
    pub(crate) fn go_to(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = match screen {
            Screen::Signup | Screen::Login => InputMode::Editing,
            Screen::Dashboard => InputMode::Normal,
        };
    }

    fn enter_dashboard(&mut self) {
        self.signup = SignupForm::default();
        self.login = LoginForm::default();
        self.go_to(Screen::Dashboard);
        self.pending = Some(Pending::FetchExpenses);
    }

    fn leave_dashboard(&mut self) {
        self.expenses.clear();
        self.summary = Summary::default();
        self.expense_form = ExpenseForm::default();
        self.expense_index = 0;
        self.expense_scroll = 0;
        self.pending_action = None;
        self.confirm_message.clear();
        self.user_name = None;
    }

    pub(crate) fn is_loading_expenses(&self) -> bool {
        self.pending == Some(Pending::FetchExpenses)
    }

    /// Run whatever the last key press queued. Returns `false` when idle.
    pub(crate) fn run_pending(&mut self, session: &mut Session) -> Result<bool> {
        let Some(work) = self.pending.take() else {
            return Ok(false);
        };
        match work {
            Pending::Signup => self.submit_signup(session)?,
            Pending::Login => self.submit_login(session)?,
            Pending::FetchExpenses => {
                self.refresh_expenses(session);
            }
        }
        Ok(true)
    }

    // ── Auth ─────────────────────────────────────────────────

    pub(crate) fn queue_signup(&mut self) {
        self.signup.submitting = true;
        self.signup.error = None;
        self.pending = Some(Pending::Signup);
    }

    pub(crate) fn queue_login(&mut self) {
        self.login.submitting = true;
        self.login.error = None;
        self.pending = Some(Pending::Login);
    }

    pub(crate) fn submit_signup(&mut self, session: &mut Session) -> Result<()> {
        self.signup.submitting = false;
        let outcome = session.register(
            &self.signup.name,
            &self.signup.email,
            &self.signup.password,
        )?;
        match outcome {
            AuthOutcome::Success => self.route(session),
            AuthOutcome::Failed(message) => self.signup.error = Some(message),
        }
        Ok(())
    }

    pub(crate) fn submit_login(&mut self, session: &mut Session) -> Result<()> {
        self.login.submitting = false;
        let outcome = session.login(&self.login.email, &self.login.password)?;
        match outcome {
            AuthOutcome::Success => self.route(session),
            AuthOutcome::Failed(message) => {
                self.login.password.clear();
                self.login.error = Some(message);
            }
        }
        Ok(())
    }

    pub(crate) fn logout(&mut self, session: &mut Session) -> Result<()> {
        session.logout()?;
        self.route(session);
        self.set_status("Signed out");
        Ok(())
    }

    pub(crate) fn toggle_theme(&mut self, session: &Session) -> Result<()> {
        self.theme = self.theme.toggled();
        session.storage().set_theme(self.theme)?;
        self.set_status(format!("Theme: {}", self.theme));
        Ok(())
    }

    // ── Expenses ─────────────────────────────────────────────

    /// Replace the list with the server's copy. On failure the list is kept.
    pub(crate) fn refresh_expenses(&mut self, session: &Session) -> bool {
        match session.fetch_expenses() {
            Ok(expenses) => {
                self.expenses = expenses;
                self.recompute();
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch expenses");
                self.set_status(format!(
                    "Could not load expenses: {}",
                    e.user_message("request failed")
                ));
                false
            }
        }
    }

    pub(crate) fn submit_expense(&mut self, session: &Session) {
        let new = match self.expense_form.to_new_expense() {
            Ok(new) => new,
            Err(e) => {
                self.expense_form.error = Some(e.to_string());
                return;
            }
        };

        match session.add_expense(&new) {
            Ok(created) => {
                let msg = format!(
                    "Added {} {}",
                    created.category,
                    super::util::format_amount(created.amount, &self.currency)
                );
                self.set_status(msg);
                self.expenses.insert(0, created);
                self.expense_index = 0;
                self.expense_scroll = 0;
                self.recompute();
                self.expense_form.reset_after_submit();
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to add expense");
                self.expense_form.error = Some(e.user_message("Failed to add expense"));
            }
        }
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.expenses.get(self.expense_index)
    }

    pub(crate) fn request_delete(&mut self) {
        let Some(expense) = self.selected_expense() else {
            self.set_status("No expenses to delete");
            return;
        };
        let id = expense.id.clone();
        let label = format!(
            "{} {}",
            expense.category,
            super::util::format_amount(expense.amount, &self.currency)
        );
        self.confirm_message = format!("Delete '{label}'?");
        self.pending_action = Some(PendingAction::DeleteExpense { id, label });
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn confirm_pending(&mut self, session: &Session) {
        if let Some(action) = self.pending_action.take() {
            match action {
                PendingAction::DeleteExpense { id, label } => {
                    match session.delete_expense(&id) {
                        Ok(()) => {
                            self.expenses.retain(|e| e.id != id);
                            self.recompute();
                            self.set_status(format!("Deleted: {label}"));
                        }
                        Err(e) => {
                            tracing::error!(id = %id, error = %e, "failed to delete expense");
                            self.set_status(e.user_message("Failed to delete expense"));
                        }
                    }
                }
            }
        }
        self.input_mode = InputMode::Normal;
        self.confirm_message.clear();
    }

    pub(crate) fn cancel_pending(&mut self) {
        self.pending_action = None;
        self.input_mode = InputMode::Normal;
        self.confirm_message.clear();
        self.set_status("Cancelled");
    }

    // ── Export ───────────────────────────────────────────────

    pub(crate) fn export_pdf(&mut self, path: &Path) {
        if self.expenses.is_empty() {
            self.set_status(report::NOTHING_TO_EXPORT);
            return;
        }
        match report::write_pdf(&self.expenses, path) {
            Ok(()) => self.set_status(format!(
                "Exported {} expenses to {}",
                self.expenses.len(),
                path.display()
            )),
            Err(e) => self.set_status(format!("Export failed: {e:#}")),
        }
    }

    pub(crate) fn export_csv(&mut self, path: &Path) {
        if self.expenses.is_empty() {
            self.set_status(report::NOTHING_TO_EXPORT);
            return;
        }
        match report::write_csv(&self.expenses, path) {
            Ok(count) => self.set_status(format!(
                "Exported {count} expenses to {}",
                path.display()
            )),
            Err(e) => self.set_status(format!("Export failed: {e:#}")),
        }
    }

    fn recompute(&mut self) {
        self.summary = analytics::summarize(&self.expenses);
        clamp_cursor(
            &mut self.expense_index,
            &mut self.expense_scroll,
            self.expenses.len(),
        );
    }

    pub(crate) fn expenses_page(&self) -> usize {
        self.visible_rows.saturating_sub(2).max(1)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
