#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::api::mock_server::MockApiServer;
use crate::api::HttpBackend;
use crate::config::Config;
use crate::storage::LocalStorage;

fn session_for(server: &MockApiServer, token: Option<&str>) -> Session {
    let mut config = Config::default();
    config.set_api_url(&server.base_url());
    let storage = LocalStorage::open_in_memory().unwrap();
    if let Some(token) = token {
        storage.set_token(token).unwrap();
    }
    let backend = HttpBackend::new(&config).unwrap();
    let mut session = Session::new(storage, Box::new(backend)).unwrap();
    session.load_user().unwrap();
    session
}

/// Signed-in app sitting on the dashboard with its first fetch done.
fn dashboard(server: &MockApiServer) -> (App, Session) {
    let token = server.seed_user("Asha", "asha@example.com", "secret1");
    server.seed_expense(&token, 250.0, "Food", "Groceries", "2024-01-15");
    server.seed_expense(&token, 40.5, "Transport", "", "2024-01-16");
    let mut session = session_for(server, Some(&token));
    let mut app = App::new(Theme::Dark, "₹");
    app.route(&session);
    assert!(app.run_pending(&mut session).unwrap());
    (app, session)
}

// ── Forms ────────────────────────────────────────────────────

#[test]
fn test_form_fields_cycle_both_ways() {
    assert_eq!(SignupField::Password.next(), SignupField::Name);
    assert_eq!(SignupField::Name.prev(), SignupField::Password);
    assert_eq!(ExpenseField::Amount.next(), ExpenseField::Category);
    assert_eq!(LoginField::Email.prev(), LoginField::Password);
}

#[test]
fn test_expense_form_defaults() {
    let form = ExpenseForm::default();
    assert_eq!(form.category, Category::Food);
    assert_eq!(
        form.date,
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    );
    assert!(form.amount.is_empty());
}

#[test]
fn test_expense_form_category_has_no_text_buffer() {
    let mut form = ExpenseForm {
        focus: ExpenseField::Category,
        ..Default::default()
    };
    assert!(form.active_text().is_none());
    form.focus = ExpenseField::Description;
    form.active_text().unwrap().push_str("Tea");
    assert_eq!(form.description, "Tea");
}

#[test]
fn test_reset_after_submit_keeps_category_and_date() {
    let mut form = ExpenseForm {
        amount: "12".into(),
        category: Category::Shopping,
        description: "Socks".into(),
        date: "2024-02-02".into(),
        focus: ExpenseField::Date,
        error: Some("x".into()),
    };
    form.reset_after_submit();
    assert!(form.amount.is_empty());
    assert!(form.description.is_empty());
    assert_eq!(form.category, Category::Shopping);
    assert_eq!(form.date, "2024-02-02");
    assert_eq!(form.focus, ExpenseField::Amount);
    assert!(form.error.is_none());
}

// ── Routing ──────────────────────────────────────────────────

#[test]
fn test_starts_on_signup_form() {
    let app = App::new(Theme::Dark, "₹");
    assert_eq!(app.screen, Screen::Signup);
    assert_eq!(app.input_mode, InputMode::Editing);
}

#[test]
fn test_signed_in_user_redirected_to_dashboard() {
    let server = MockApiServer::start();
    let token = server.seed_user("Asha", "asha@example.com", "secret1");
    let session = session_for(&server, Some(&token));

    let mut app = App::new(Theme::Dark, "₹");
    app.route(&session);
    assert_eq!(app.screen, Screen::Dashboard);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.user_name.as_deref(), Some("Asha"));
    assert!(app.is_loading_expenses());
}

#[test]
fn test_dashboard_requires_login() {
    let server = MockApiServer::start();
    let session = session_for(&server, None);
    let mut app = App::new(Theme::Dark, "₹");
    app.screen = Screen::Dashboard;
    app.route(&session);
    assert_eq!(app.screen, Screen::Login);
}

#[test]
fn test_signup_flow_lands_on_dashboard() {
    let server = MockApiServer::start();
    let mut session = session_for(&server, None);
    let mut app = App::new(Theme::Dark, "₹");

    app.signup.name = "Ravi".into();
    app.signup.email = "ravi@example.com".into();
    app.signup.password = "hunter22".into();
    app.queue_signup();
    assert!(app.signup.submitting);

    app.run_pending(&mut session).unwrap();
    assert_eq!(app.screen, Screen::Dashboard);
    assert!(app.signup.name.is_empty());
    assert!(session.is_authenticated());
}

#[test]
fn test_signup_error_stays_on_form() {
    let server = MockApiServer::start();
    let mut session = session_for(&server, None);
    let mut app = App::new(Theme::Dark, "₹");

    app.signup.name = "Ravi".into();
    app.signup.email = "ravi@example.com".into();
    app.signup.password = "short".into();
    app.queue_signup();
    app.run_pending(&mut session).unwrap();

    assert_eq!(app.screen, Screen::Signup);
    assert!(!app.signup.submitting);
    assert_eq!(
        app.signup.error.as_deref(),
        Some("Password must be at least 6 characters")
    );
}

#[test]
fn test_login_failure_shows_server_message() {
    let server = MockApiServer::start();
    server.seed_user("Asha", "asha@example.com", "secret1");
    let mut session = session_for(&server, None);
    let mut app = App::new(Theme::Dark, "₹");
    app.go_to(Screen::Login);

    app.login.email = "asha@example.com".into();
    app.login.password = "wrong-one".into();
    app.queue_login();
    app.run_pending(&mut session).unwrap();

    assert_eq!(app.screen, Screen::Login);
    assert_eq!(app.login.error.as_deref(), Some("Invalid Credentials"));
    assert!(app.login.password.is_empty());
}

#[test]
fn test_logout_returns_to_login_and_clears_data() {
    let server = MockApiServer::start();
    let (mut app, mut session) = dashboard(&server);
    assert_eq!(app.expenses.len(), 2);

    app.logout(&mut session).unwrap();
    assert_eq!(app.screen, Screen::Login);
    assert!(app.expenses.is_empty());
    assert!(app.user_name.is_none());
    assert!(session.storage().token().unwrap().is_none());
}

// ── Dashboard data flow ──────────────────────────────────────

#[test]
fn test_entering_dashboard_fetches_once() {
    let server = MockApiServer::start();
    let (mut app, mut session) = dashboard(&server);

    assert_eq!(app.expenses.len(), 2);
    assert_eq!(app.summary.total, dec!(290.5));
    assert!(!app.is_loading_expenses());
    assert!(!app.run_pending(&mut session).unwrap());
}

#[test]
fn test_add_expense_is_prepended() {
    let server = MockApiServer::start();
    let (mut app, session) = dashboard(&server);

    app.expense_index = 1;
    app.expense_form.amount = "99.99".into();
    app.expense_form.category = Category::Utilities;
    app.expense_form.description = "Internet".into();
    app.expense_form.date = "2024-01-20".into();
    app.submit_expense(&session);

    assert_eq!(app.expenses.len(), 3);
    assert_eq!(app.expenses[0].description, "Internet");
    assert_eq!(app.expense_index, 0);
    assert_eq!(app.summary.total, dec!(390.49));
    assert!(app.expense_form.amount.is_empty());
    assert_eq!(app.expense_form.category, Category::Utilities);
    assert_eq!(server.expense_count(), 3);
}

#[test]
fn test_add_expense_missing_fields() {
    let server = MockApiServer::start();
    let (mut app, session) = dashboard(&server);

    app.expense_form.amount.clear();
    app.submit_expense(&session);
    assert_eq!(
        app.expense_form.error.as_deref(),
        Some("Please fill all required fields")
    );
    assert_eq!(app.expenses.len(), 2);
    assert_eq!(server.expense_count(), 2);
}

#[test]
fn test_delete_requires_confirmation() {
    let server = MockApiServer::start();
    let (mut app, session) = dashboard(&server);
    let doomed = app.expenses[0].id.clone();

    app.request_delete();
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert!(app.confirm_message.starts_with("Delete '"));

    app.confirm_pending(&session);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.expenses.iter().all(|e| e.id != doomed));
    assert_eq!(app.expenses.len(), 1);
    assert_eq!(server.expense_count(), 1);
}

#[test]
fn test_cancel_delete_keeps_expense() {
    let server = MockApiServer::start();
    let (mut app, _session) = dashboard(&server);

    app.request_delete();
    app.cancel_pending();
    assert!(app.pending_action.is_none());
    assert_eq!(app.expenses.len(), 2);
    assert_eq!(app.status_message, "Cancelled");
}

#[test]
fn test_delete_last_row_clamps_cursor() {
    let server = MockApiServer::start();
    let (mut app, session) = dashboard(&server);

    app.expense_index = 1;
    app.request_delete();
    app.confirm_pending(&session);
    assert_eq!(app.expense_index, 0);
}

#[test]
fn test_failed_fetch_keeps_list() {
    let server = MockApiServer::start();
    let (mut app, session) = dashboard(&server);

    server.set_fail_all(true);
    app.refresh_expenses(&session);
    assert_eq!(app.expenses.len(), 2);
    assert!(app.status_message.starts_with("Could not load expenses"));
}

#[test]
fn test_failed_delete_keeps_row() {
    let server = MockApiServer::start();
    let (mut app, session) = dashboard(&server);

    server.set_fail_all(true);
    app.request_delete();
    app.confirm_pending(&session);
    assert_eq!(app.expenses.len(), 2);
}

// ── Theme & export ───────────────────────────────────────────

#[test]
fn test_toggle_theme_persists() {
    let server = MockApiServer::start();
    let (mut app, session) = dashboard(&server);

    app.toggle_theme(&session).unwrap();
    assert_eq!(app.theme, Theme::Light);
    assert_eq!(session.storage().theme().unwrap(), Theme::Light);
}

#[test]
fn test_export_with_nothing_to_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");
    let mut app = App::new(Theme::Dark, "₹");
    app.export_pdf(&path);
    assert_eq!(app.status_message, crate::report::NOTHING_TO_EXPORT);
    assert!(!path.exists());
}

#[test]
fn test_export_writes_both_formats() {
    let server = MockApiServer::start();
    let (mut app, _session) = dashboard(&server);
    let dir = tempfile::tempdir().unwrap();

    let pdf = dir.path().join("report.pdf");
    app.export_pdf(&pdf);
    assert!(pdf.exists());
    assert!(app.status_message.starts_with("Exported 2 expenses"));

    let csv = dir.path().join("report.csv");
    app.export_csv(&csv);
    assert!(csv.exists());
}
