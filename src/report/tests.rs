#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{parse_date, Expense};

fn make_expense(id: &str, amount: Decimal, category: &str, description: &str, date: &str) -> Expense {
    Expense {
        id: id.into(),
        amount,
        category: category.into(),
        description: description.into(),
        date: parse_date(date).unwrap(),
    }
}

fn sample() -> Vec<Expense> {
    vec![
        make_expense("e1", dec!(250), "Food", "Groceries", "2024-01-15T09:00:00Z"),
        make_expense("e2", dec!(40.5), "Transport", "", "2024-01-14"),
    ]
}

fn many(n: usize) -> Vec<Expense> {
    (0..n)
        .map(|i| make_expense(&format!("e{i}"), dec!(10), "Other", "x", "2024-01-01"))
        .collect()
}

// ── Formatting helpers ────────────────────────────────────────

#[test]
fn test_report_date_is_us_style_without_padding() {
    let e = make_expense("e", dec!(1), "Food", "", "2024-01-05T10:00:00Z");
    assert_eq!(report_date(&e), "1/5/2024");
}

#[test]
fn test_report_amount_two_decimals() {
    assert_eq!(report_amount(dec!(40.5)), "40.50");
    assert_eq!(report_amount(dec!(12)), "12.00");
    assert_eq!(report_amount(dec!(0.129)), "0.13");
}

#[test]
fn test_report_amount_rounds_halves_up() {
    assert_eq!(report_amount(dec!(50.125)), "50.13");
    assert_eq!(report_amount(dec!(0.005)), "0.01");
}

#[test]
fn test_average_tie_rounds_up_in_report() {
    // 100.25 over two days
    let expenses = vec![
        make_expense("a", dec!(100), "Food", "", "2024-03-01T10:00:00Z"),
        make_expense("b", dec!(0.25), "Food", "", "2024-03-02T10:00:00Z"),
    ];
    let avg = crate::analytics::average_per_day(&expenses);
    assert_eq!(report_amount(avg), "50.13");
}

// ── PDF ───────────────────────────────────────────────────────

#[test]
fn test_pdf_refuses_empty_export() {
    let err = render_pdf(&[]).unwrap_err();
    assert_eq!(err.to_string(), NOTHING_TO_EXPORT);
}

#[test]
fn test_pdf_contains_summary_and_rows() {
    let bytes = render_pdf(&sample()).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.5"));

    let raw = String::from_utf8_lossy(&bytes);
    assert!(raw.contains("(Expense Report)"));
    assert!(raw.contains("(Total Expenses: 290.50)"));
    // 290.50 over two distinct days
    assert!(raw.contains("(Average Daily Expense: 145.25)"));
    assert!(raw.contains("(Groceries)"));
    assert!(raw.contains("(1/14/2024)"));
    assert!(raw.contains("(40.50)"));
}

#[test]
fn test_pdf_blank_description_prints_dash() {
    let bytes = render_pdf(&sample()).unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("(-)"));
}

#[test]
fn test_pdf_single_page_for_small_reports() {
    let bytes = render_pdf(&sample()).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_pdf_paginates_long_reports() {
    let bytes = render_pdf(&many(120)).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert!(doc.get_pages().len() >= 3);
}

#[test]
fn test_write_pdf_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_PDF_NAME);
    write_pdf(&sample(), &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

// ── CSV ───────────────────────────────────────────────────────

#[test]
fn test_csv_export() {
    let bytes = render_csv(&sample()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Id,Date,Category,Description,Amount");
    assert_eq!(lines[1], "e1,1/15/2024,Food,Groceries,250.00");
    assert_eq!(lines[2], "e2,1/14/2024,Transport,,40.50");
}

#[test]
fn test_csv_quotes_commas() {
    let expenses = vec![make_expense("e1", dec!(5), "Food", "Tea, biscuits", "2024-01-01")];
    let text = String::from_utf8(render_csv(&expenses).unwrap()).unwrap();
    assert!(text.contains("\"Tea, biscuits\""));
}

#[test]
fn test_csv_refuses_empty_export() {
    assert!(render_csv(&[]).is_err());
}

#[test]
fn test_write_csv_counts_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CSV_NAME);
    assert_eq!(write_csv(&sample(), &path).unwrap(), 2);
    assert!(path.exists());
}

// ── Paths ─────────────────────────────────────────────────────

#[test]
fn test_export_path_uses_argument() {
    assert_eq!(
        export_path(" /tmp/out.pdf ", DEFAULT_PDF_NAME),
        std::path::PathBuf::from("/tmp/out.pdf")
    );
}

#[test]
fn test_export_path_default_name() {
    let path = export_path("", DEFAULT_CSV_NAME);
    assert!(path.ends_with(DEFAULT_CSV_NAME));
}

#[test]
fn test_expand_home_leaves_plain_paths() {
    assert_eq!(
        expand_home("reports/x.pdf"),
        std::path::PathBuf::from("reports/x.pdf")
    );
}
