use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{Input, Password};
use std::path::PathBuf;

use crate::analytics;
use crate::api::ApiError;
use crate::config::Config;
use crate::models::{Category, NewExpense};
use crate::report;
use crate::session::{AuthOutcome, Session};
use crate::ui::util::{format_amount, truncate};

const PASSWORD_ENV: &str = "FINTRACK_PASSWORD";

/// Fin-Track: personal expense tracking in your terminal
#[derive(Parser)]
#[command(name = "fintrack", version, about, long_about = None)]
pub(crate) struct Cli {
    /// Backend base URL, e.g. http://localhost:5000/api
    #[arg(long, global = true)]
    pub(crate) api_url: Option<String>,

    /// Launches the interactive TUI when omitted
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Falls back to FINTRACK_PASSWORD, then a prompt
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in with an existing account
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Falls back to FINTRACK_PASSWORD, then a prompt
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List expenses, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record an expense
    Add {
        /// Amount, e.g. 120.50
        amount: String,
        /// Food, Transport, Shopping, Utilities, Entertainment or Other
        #[arg(short, long, default_value = "Food")]
        category: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// YYYY-MM-DD, defaults to today (UTC)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an expense by id
    Delete { id: String },

    /// Print totals, daily average and category breakdown
    Summary,

    /// Write the expense report
    Export {
        /// Output file (default: expense-report.pdf in Downloads)
        path: Option<String>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Pdf)]
        format: ExportFormat,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    Pdf,
    Csv,
}

pub(crate) fn as_cli(command: Commands, session: &mut Session, config: &Config) -> Result<()> {
    match command {
        Commands::Signup {
            name,
            email,
            password,
        } => cli_signup(session, name, email, password),
        Commands::Login { email, password } => cli_login(session, email, password),
        Commands::Logout => {
            session.logout()?;
            println!("Signed out");
            Ok(())
        }
        Commands::Whoami => cli_whoami(session, config),
        Commands::List { json } => cli_list(session, config, json),
        Commands::Add {
            amount,
            category,
            description,
            date,
        } => cli_add(session, config, &amount, &category, &description, date),
        Commands::Delete { id } => {
            require_login(session)?;
            api(session.delete_expense(&id))?;
            println!("Deleted {id}");
            Ok(())
        }
        Commands::Summary => cli_summary(session, config),
        Commands::Export { path, format } => cli_export(session, path, format),
    }
}

// ── Auth ─────────────────────────────────────────────────────

fn cli_signup(
    session: &mut Session,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let name = value_or_prompt(name, "Name")?;
    let email = value_or_prompt(email, "Email")?;
    let password = match password.or_else(|| std::env::var(PASSWORD_ENV).ok()) {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    finish_auth(session.register(&name, &email, &password)?, session)
}

fn cli_login(
    session: &mut Session,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let email = value_or_prompt(email, "Email")?;
    let password = password_or_prompt(password)?;
    finish_auth(session.login(&email, &password)?, session)
}

fn finish_auth(outcome: AuthOutcome, session: &Session) -> Result<()> {
    match outcome {
        AuthOutcome::Success => {
            let name = session.user().map(|u| u.name.as_str()).unwrap_or_default();
            println!("Hello, {name}");
            Ok(())
        }
        AuthOutcome::Failed(message) => anyhow::bail!(message),
    }
}

fn cli_whoami(session: &Session, config: &Config) -> Result<()> {
    match session.user() {
        Some(user) => {
            println!("{} <{}>", user.name, user.email);
            println!("Server: {}", config.api_url);
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

/// Get password from --password flag, FINTRACK_PASSWORD env var, or prompt
fn password_or_prompt(flag: Option<String>) -> Result<String> {
    if let Some(p) = flag {
        return Ok(p);
    }
    if let Ok(p) = std::env::var(PASSWORD_ENV) {
        return Ok(p);
    }
    Ok(Password::new().with_prompt("Password").interact()?)
}

fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

fn require_login(session: &Session) -> Result<()> {
    if !session.is_authenticated() {
        anyhow::bail!("Not signed in. Run `fintrack login` first");
    }
    Ok(())
}

fn api<T>(result: Result<T, ApiError>) -> Result<T> {
    result.map_err(|e| {
        if e.is_unauthorized() {
            anyhow::anyhow!("Session expired. Run `fintrack login` again")
        } else {
            e.into()
        }
    })
}

// ── Expenses ─────────────────────────────────────────────────

fn cli_list(session: &Session, config: &Config, json: bool) -> Result<()> {
    require_login(session)?;
    let expenses = api(session.fetch_expenses())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
        return Ok(());
    }
    if expenses.is_empty() {
        println!("No expenses yet. Add one with `fintrack add <amount>`");
        return Ok(());
    }

    println!(
        "{:<26} {:<11} {:<14} {:<28} {:>12}",
        "ID", "Date", "Category", "Description", "Amount"
    );
    println!("{}", "─".repeat(95));
    for e in &expenses {
        println!(
            "{:<26} {:<11} {:<14} {:<28} {:>12}",
            e.id,
            report::report_date(e),
            truncate(&e.category, 14),
            truncate(e.description_or("-"), 28),
            format!("-{}", format_amount(e.amount, &config.currency_symbol)),
        );
    }
    Ok(())
}

fn cli_add(
    session: &Session,
    config: &Config,
    amount: &str,
    category: &str,
    description: &str,
    date: Option<String>,
) -> Result<()> {
    require_login(session)?;

    let Some(category) = Category::parse(category) else {
        let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        anyhow::bail!("Unknown category '{category}'. Use one of: {}", names.join(", "));
    };
    let date = date
        .unwrap_or_else(|| chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string());

    let new = NewExpense::from_form(amount, category.as_str(), description, &date)?;
    let created = api(session.add_expense(&new))?;
    println!(
        "Added {} {} on {} ({})",
        created.category,
        format_amount(created.amount, &config.currency_symbol),
        report::report_date(&created),
        created.id
    );
    Ok(())
}

fn cli_summary(session: &Session, config: &Config) -> Result<()> {
    require_login(session)?;
    let expenses = api(session.fetch_expenses())?;
    let summary = analytics::summarize(&expenses);
    let symbol = &config.currency_symbol;

    let name = session.user().map(|u| u.name.as_str()).unwrap_or_default();
    println!("Fin-Track | {name}");
    println!("{}", "─".repeat(40));
    if summary.is_empty() {
        println!("No expense data yet. Add an expense to see your analytics!");
        return Ok(());
    }

    println!("  Total Spent:       {}", format_amount(summary.total, symbol));
    println!(
        "  Avg. Daily Spend:  {}",
        format_amount(summary.average_per_day, symbol)
    );
    println!("  Expenses:          {}", summary.count);

    println!();
    println!("By Category:");
    for cat in &summary.by_category {
        println!(
            "  {:<16} {:>14}  {:>3}%",
            cat.name,
            format_amount(cat.amount, symbol),
            crate::ui::util::percent_of(cat.amount, summary.total)
        );
    }

    println!();
    println!("Daily:");
    for day in &summary.daily {
        println!(
            "  {:<8} {:>14}",
            day.label(),
            format_amount(day.amount, symbol)
        );
    }
    Ok(())
}

fn cli_export(session: &Session, path: Option<String>, format: ExportFormat) -> Result<()> {
    require_login(session)?;
    let expenses = api(session.fetch_expenses())?;

    let default_name = match format {
        ExportFormat::Pdf => report::DEFAULT_PDF_NAME,
        ExportFormat::Csv => report::DEFAULT_CSV_NAME,
    };
    let path: PathBuf = report::export_path(path.as_deref().unwrap_or(""), default_name);

    match format {
        ExportFormat::Pdf => report::write_pdf(&expenses, &path)?,
        ExportFormat::Csv => {
            report::write_csv(&expenses, &path)?;
        }
    }
    println!(
        "Exported {} expenses to {}",
        expenses.len(),
        path.display()
    );
    Ok(())
}
