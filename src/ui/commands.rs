use std::collections::HashMap;
use std::sync::LazyLock;

use super::app::{App, InputMode};
use crate::report;
use crate::session::Session;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Session) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit Fin-Track", cmd_quit, r);
    register_command!("quit", "Quit Fin-Track", cmd_quit, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!(
        "add",
        "Add expense (e.g. :add 120.50 Food Lunch, or :add to open the form)",
        cmd_add,
        r
    );
    register_command!("a", "Add expense", cmd_add, r);
    register_command!("delete", "Delete selected expense", cmd_delete, r);
    register_command!("refresh", "Reload expenses from the server", cmd_refresh, r);
    register_command!("r", "Reload expenses from the server", cmd_refresh, r);
    register_command!("theme", "Toggle light/dark theme", cmd_theme, r);
    register_command!("logout", "Sign out", cmd_logout, r);
    register_command!(
        "export",
        "Export PDF report (e.g. :export ~/report.pdf)",
        cmd_export,
        r
    );
    register_command!(
        "export-csv",
        "Export expenses to CSV (e.g. :export-csv ~/expenses.csv)",
        cmd_export_csv,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        tracing::debug!(command = cmd_name, "running command");
        (cmd.run)(args, app, session)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1)
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

/// `:add` alone focuses the form. `:add <amount> [category] [description...]`
/// fills it in and submits with today's date.
fn cmd_add(args: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    if args.is_empty() {
        app.input_mode = InputMode::Editing;
        app.set_status("Fill in the form, Enter to save, Esc to cancel");
        return Ok(());
    }

    let mut parts = args.splitn(3, ' ');
    let amount = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("");

    let form = &mut app.expense_form;
    form.amount = amount.to_string();
    match crate::models::Category::parse(rest) {
        Some(category) => {
            form.category = category;
            form.description = parts.next().unwrap_or("").trim().to_string();
        }
        // Not a known category: the rest is all description.
        None => {
            let tail = parts.next().unwrap_or("");
            form.description = format!("{rest} {tail}").trim().to_string();
        }
    }

    app.submit_expense(session);
    if let Some(err) = app.expense_form.error.clone() {
        app.set_status(err);
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    app.request_delete();
    Ok(())
}

fn cmd_refresh(_args: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    if app.refresh_expenses(session) {
        let count = app.expenses.len();
        app.set_status(format!("Loaded {count} expenses"));
    }
    Ok(())
}

fn cmd_theme(_args: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    app.toggle_theme(session)
}

fn cmd_logout(_args: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    app.logout(session)
}

fn cmd_export(args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    let path = report::export_path(args, report::DEFAULT_PDF_NAME);
    app.export_pdf(&path);
    Ok(())
}

fn cmd_export_csv(args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    let path = report::export_path(args, report::DEFAULT_CSV_NAME);
    app.export_csv(&path);
    Ok(())
}
