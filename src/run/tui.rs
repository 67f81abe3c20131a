use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Config;
use crate::session::Session;
use crate::ui::app::{App, FormField, InputMode, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(session: &mut Session, config: &Config) -> Result<()> {
    let mut app = App::new(session.storage().theme()?, config.currency_symbol.as_str());
    app.route(session);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, session);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "tui exited with error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut Session,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // navbar + status + command bars, form, list borders and header
            let content_height = f.area().height.saturating_sub(15) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        // Blocking requests run after the frame that shows their busy label.
        if app.run_pending(session)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if is_quit(&key) {
                app.running = false;
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.screen {
                Screen::Signup | Screen::Login => handle_auth_input(key, app),
                Screen::Dashboard => match app.input_mode {
                    InputMode::Normal => handle_normal_input(key, app, session)?,
                    InputMode::Command => handle_command_input(key, app, session)?,
                    InputMode::Editing => handle_form_input(key, app, session),
                    InputMode::Confirm => handle_confirm_input(key, app, session),
                },
            }
        }
    }
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
}

// ── Input handlers ───────────────────────────────────────────

fn handle_auth_input(key: KeyEvent, app: &mut App) {
    if app.pending.is_some() {
        return;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match (app.screen, key.code) {
        (Screen::Signup, KeyCode::Char('l')) if ctrl => {
            app.login.error = None;
            app.go_to(Screen::Login);
        }
        (Screen::Login, KeyCode::Char('n')) if ctrl => {
            app.signup.error = None;
            app.go_to(Screen::Signup);
        }
        (_, KeyCode::Char(_)) if ctrl => {}
        (Screen::Signup, code) => match code {
            KeyCode::Tab | KeyCode::Down => app.signup.focus = app.signup.focus.next(),
            KeyCode::BackTab | KeyCode::Up => app.signup.focus = app.signup.focus.prev(),
            KeyCode::Enter => app.queue_signup(),
            KeyCode::Esc => app.signup.error = None,
            KeyCode::Backspace => {
                app.signup.active_text().pop();
            }
            KeyCode::Char(c) => app.signup.active_text().push(c),
            _ => {}
        },
        (Screen::Login, code) => match code {
            KeyCode::Tab | KeyCode::Down => app.login.focus = app.login.focus.next(),
            KeyCode::BackTab | KeyCode::Up => app.login.focus = app.login.focus.prev(),
            KeyCode::Enter => app.queue_login(),
            KeyCode::Esc => app.login.error = None,
            KeyCode::Backspace => {
                app.login.active_text().pop();
            }
            KeyCode::Char(c) => app.login.active_text().push(c),
            _ => {}
        },
        (Screen::Dashboard, _) => {}
    }
}

fn handle_normal_input(key: KeyEvent, app: &mut App, session: &mut Session) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => {
            let page = app.expenses_page();
            scroll_down(
                &mut app.expense_index,
                &mut app.expense_scroll,
                app.expenses.len(),
                page,
            );
        }
        KeyCode::Char('k') | KeyCode::Up => {
            scroll_up(&mut app.expense_index, &mut app.expense_scroll);
        }
        KeyCode::Char('g') | KeyCode::Home => {
            scroll_to_top(&mut app.expense_index, &mut app.expense_scroll);
        }
        KeyCode::Char('G') | KeyCode::End => {
            let page = app.expenses_page();
            scroll_to_bottom(
                &mut app.expense_index,
                &mut app.expense_scroll,
                app.expenses.len(),
                page,
            );
        }
        KeyCode::Char('a') | KeyCode::Char('i') => {
            app.expense_form.error = None;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('r') => commands::handle_command("refresh", app, session)?,
        KeyCode::Char('t') => commands::handle_command("theme", app, session)?,
        KeyCode::Char('e') => commands::handle_command("export", app, session)?,
        KeyCode::Char('E') => commands::handle_command("export-csv", app, session)?,
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: KeyEvent, app: &mut App, session: &mut Session) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, session)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_form_input(key: KeyEvent, app: &mut App, session: &Session) {
    let form = &mut app.expense_form;
    match key.code {
        KeyCode::Esc => {
            form.error = None;
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
        KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
        KeyCode::Enter => app.submit_expense(session),
        KeyCode::Left if form.active_text().is_none() => form.category = form.category.prev(),
        KeyCode::Right | KeyCode::Char(' ') if form.active_text().is_none() => {
            form.category = form.category.next();
        }
        KeyCode::Backspace => {
            if let Some(text) = form.active_text() {
                text.pop();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(text) = form.active_text() {
                text.push(c);
            }
        }
        _ => {}
    }
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, session: &Session) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_pending(session),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_pending(),
        _ => {}
    }
}
