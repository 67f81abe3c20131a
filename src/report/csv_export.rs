use anyhow::{Context, Result};
use std::path::Path;

use super::{report_amount, report_date, NOTHING_TO_EXPORT};
use crate::models::Expense;

pub(crate) fn render_csv(expenses: &[Expense]) -> Result<Vec<u8>> {
    if expenses.is_empty() {
        anyhow::bail!(NOTHING_TO_EXPORT);
    }

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Id", "Date", "Category", "Description", "Amount"])?;
    for e in expenses {
        wtr.write_record([
            e.id.as_str(),
            report_date(e).as_str(),
            e.category.as_str(),
            e.description.as_str(),
            report_amount(e.amount).as_str(),
        ])?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV: {e}"))
}

/// Write the CSV export and return the number of rows written.
pub(crate) fn write_csv(expenses: &[Expense], path: &Path) -> Result<usize> {
    let bytes = render_csv(expenses)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write CSV: {}", path.display()))?;
    Ok(expenses.len())
}
