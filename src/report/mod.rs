mod csv_export;
mod pdf;

use std::path::{Path, PathBuf};

pub(crate) use csv_export::{render_csv, write_csv};
pub(crate) use pdf::{render_pdf, write_pdf};

pub(crate) const DEFAULT_PDF_NAME: &str = "expense-report.pdf";
pub(crate) const DEFAULT_CSV_NAME: &str = "expense-report.csv";
pub(crate) const NOTHING_TO_EXPORT: &str = "No expenses to export!";

/// Where an export lands. A blank argument means the default file name in
/// the user's downloads folder (home, then the working directory, as fallbacks).
pub(crate) fn export_path(arg: &str, default_name: &str) -> PathBuf {
    let arg = arg.trim();
    if !arg.is_empty() {
        return expand_home(arg);
    }
    let dir = directories::UserDirs::new()
        .map(|d| {
            d.download_dir()
                .map_or_else(|| d.home_dir().to_path_buf(), Path::to_path_buf)
        })
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(default_name)
}

/// Expand a leading `~/`.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => directories::UserDirs::new()
            .map(|d| d.home_dir().join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Date as printed in reports: `M/D/YYYY`, UTC.
pub(crate) fn report_date(expense: &crate::models::Expense) -> String {
    expense.day().format("%-m/%-d/%Y").to_string()
}

/// Amount with exactly two decimals, no currency symbol.
pub(crate) fn report_amount(amount: rust_decimal::Decimal) -> String {
    format!("{:.2}", crate::ui::util::round_cents(amount))
}

#[cfg(test)]
mod tests;
