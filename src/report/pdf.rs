use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

use super::{report_amount, report_date, NOTHING_TO_EXPORT};
use crate::analytics;
use crate::models::Expense;

// A4 portrait, in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_X: f32 = 40.0;
const BOTTOM_MARGIN: f32 = 50.0;
const ROW_HEIGHT: f32 = 18.0;
const TABLE_WIDTH: f32 = 515.0;
const FIRST_TABLE_TOP: f32 = 720.0;
const NEXT_TABLE_TOP: f32 = 800.0;

const HEAD: [&str; 4] = ["Date", "Category", "Description", "Amount"];
/// Column x offsets relative to the left margin.
const COLUMNS: [f32; 4] = [6.0, 86.0, 196.0, 440.0];
/// Max characters per column before truncation.
const COLUMN_CHARS: [usize; 4] = [12, 18, 42, 14];

const HEAD_FILL: (f32, f32, f32) = (30.0 / 255.0, 130.0 / 255.0, 76.0 / 255.0);
const STRIPE_FILL: (f32, f32, f32) = (0.96, 0.96, 0.96);

/// Render the expense report as PDF bytes.
pub(crate) fn render_pdf(expenses: &[Expense]) -> Result<Vec<u8>> {
    if expenses.is_empty() {
        anyhow::bail!(NOTHING_TO_EXPORT);
    }

    let summary = analytics::summarize(expenses);
    let rows: Vec<[String; 4]> = expenses
        .iter()
        .map(|e| {
            [
                report_date(e),
                e.category.clone(),
                e.description_or("-").to_string(),
                report_amount(e.amount),
            ]
        })
        .collect();

    let mut pages: Vec<Vec<Operation>> = Vec::new();
    let mut ops: Vec<Operation> = Vec::new();

    text(&mut ops, "F2", 20.0, MARGIN_X, 800.0, "Expense Report");
    text(
        &mut ops,
        "F1",
        12.0,
        MARGIN_X,
        770.0,
        &format!("Total Expenses: {}", report_amount(summary.total)),
    );
    text(
        &mut ops,
        "F1",
        12.0,
        MARGIN_X,
        752.0,
        &format!(
            "Average Daily Expense: {}",
            report_amount(summary.average_per_day)
        ),
    );

    let mut y = FIRST_TABLE_TOP;
    head_row(&mut ops, y);
    y -= ROW_HEIGHT;

    for (i, row) in rows.iter().enumerate() {
        if y < BOTTOM_MARGIN {
            pages.push(std::mem::take(&mut ops));
            y = NEXT_TABLE_TOP;
            head_row(&mut ops, y);
            y -= ROW_HEIGHT;
        }
        body_row(&mut ops, y, row, i % 2 == 1);
        y -= ROW_HEIGHT;
    }
    pages.push(ops);

    build_document(pages)
}

/// Render the report and write it to `path`.
pub(crate) fn write_pdf(expenses: &[Expense], path: &Path) -> Result<()> {
    let bytes = render_pdf(expenses)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write PDF: {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = expenses.len(), "pdf report written");
    Ok(())
}

fn build_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().context("Failed to encode PDF page")?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).context("Failed to serialise PDF")?;
    Ok(buf)
}

fn head_row(ops: &mut Vec<Operation>, y: f32) {
    fill_rect(ops, HEAD_FILL, y);
    ops.push(Operation::new("rg", vec![real(1.0), real(1.0), real(1.0)]));
    for (label, x) in HEAD.iter().zip(COLUMNS) {
        text(ops, "F2", 10.0, MARGIN_X + x, y + 5.0, label);
    }
    ops.push(Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]));
}

fn body_row(ops: &mut Vec<Operation>, y: f32, cells: &[String; 4], striped: bool) {
    if striped {
        fill_rect(ops, STRIPE_FILL, y);
        ops.push(Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]));
    }
    for ((cell, x), max) in cells.iter().zip(COLUMNS).zip(COLUMN_CHARS) {
        text(ops, "F1", 10.0, MARGIN_X + x, y + 5.0, &clip(cell, max));
    }
}

fn fill_rect(ops: &mut Vec<Operation>, (r, g, b): (f32, f32, f32), y: f32) {
    ops.push(Operation::new("rg", vec![real(r), real(g), real(b)]));
    ops.push(Operation::new(
        "re",
        vec![real(MARGIN_X), real(y), real(TABLE_WIDTH), real(ROW_HEIGHT)],
    ));
    ops.push(Operation::new("f", vec![]));
}

fn text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, s: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), real(size)]));
    ops.push(Operation::new("Td", vec![real(x), real(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(s))]));
    ops.push(Operation::new("ET", vec![]));
}

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// The standard Type1 fonts only cover Latin-1; anything else prints as `?`.
fn win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
