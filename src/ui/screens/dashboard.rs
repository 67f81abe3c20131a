use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::report::report_date;
use crate::ui::app::{App, ExpenseField, InputMode};
use crate::ui::theme::Palette;
use crate::ui::util::{format_amount, truncate};

const FORM_LABEL_WIDTH: usize = 13;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.is_loading_expenses() {
        render_loading(f, area, app);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Expense form
            Constraint::Min(5),    // Expense list
        ])
        .split(columns[0]);

    render_form(f, left[0], app);
    render_list(f, left[1], app);
    super::analytics::render(f, columns[1], app);
}

fn render_loading(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.theme.palette();
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Loading expenses...", palette.dim_style())),
    ];
    f.render_widget(Paragraph::new(text).centered(), area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.theme.palette();
    let form = &app.expense_form;
    let editing = app.input_mode == InputMode::Editing;

    let rows = [
        (ExpenseField::Amount, "Amount", format!("{} {}", app.currency, form.amount)),
        (
            ExpenseField::Category,
            "Category",
            format!("◂ {} ▸", form.category),
        ),
        (
            ExpenseField::Description,
            "Description",
            form.description.clone(),
        ),
        (ExpenseField::Date, "Date", form.date.clone()),
    ];

    let mut lines: Vec<Line> = rows
        .iter()
        .map(|(field, label, value)| {
            let focused = editing && form.focus == *field;
            form_line(label, value, focused, palette)
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(match &form.error {
        Some(err) => Line::from(Span::styled(err.clone(), palette.error_style())),
        None if editing => Line::from(Span::styled(
            "Enter to add expense, Esc to go back",
            palette.dim_style(),
        )),
        None => Line::from(Span::styled("Press a to add an expense", palette.dim_style())),
    });

    let border = if editing {
        Style::default().fg(palette.accent)
    } else {
        palette.border_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(" Add Expense ", palette.title_style()));
    f.render_widget(Paragraph::new(lines).block(block), area);

    if editing {
        let (row, chars) = match form.focus {
            ExpenseField::Amount => (
                0,
                app.currency.chars().count() + 1 + form.amount.chars().count(),
            ),
            ExpenseField::Category => return,
            ExpenseField::Description => (2, form.description.chars().count()),
            ExpenseField::Date => (3, form.date.chars().count()),
        };
        let x = area.x + 1 + (FORM_LABEL_WIDTH + 1 + chars) as u16;
        let y = area.y + 1 + row;
        if x < area.right() && y < area.bottom() {
            f.set_cursor_position((x, y));
        }
    }
}

fn form_line<'a>(label: &'a str, value: &'a str, focused: bool, palette: &Palette) -> Line<'a> {
    let label_style = if focused {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        palette.dim_style()
    };
    Line::from(vec![
        Span::styled(format!("{label:<FORM_LABEL_WIDTH$} "), label_style),
        Span::styled(value, palette.normal_style()),
    ])
}

fn render_list(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.theme.palette();
    let title = format!(" Recent Expenses ({}) ", app.expenses.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border_style())
        .title(Span::styled(title, palette.title_style()));

    if app.expenses.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No expenses yet. Add one to get started!",
                palette.dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(text).centered().block(block), area);
        return;
    }

    let header = Row::new(
        ["Category", "Description", "Amount"]
            .iter()
            .map(|h| Cell::from(*h).style(palette.header_style())),
    )
    .height(1);

    let desc_width = (area.width as usize).saturating_sub(32).max(8);
    let rows: Vec<Row> = app
        .expenses
        .iter()
        .enumerate()
        .skip(app.expense_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, expense)| {
            let date = report_date(expense);
            let description = truncate(expense.description_or(&date), desc_width);
            let amount = format!("-{}", format_amount(expense.amount, &app.currency));

            let style = if i == app.expense_index && app.input_mode != InputMode::Editing {
                palette.selected_style()
            } else if i % 2 == 1 {
                palette.alt_row_style()
            } else {
                palette.normal_style()
            };

            Row::new(vec![
                Cell::from(truncate(&expense.category, 13)),
                Cell::from(description),
                Cell::from(Span::styled(amount, palette.expense_style())),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Min(8),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::app::{Pending, Screen};
    use crate::ui::theme::Theme;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render(f, f.area(), app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn dashboard_app() -> App {
        let mut app = App::new(Theme::Dark, "₹");
        app.go_to(Screen::Dashboard);
        app
    }

    #[test]
    fn test_loading_hides_form_and_analytics() {
        let mut app = dashboard_app();
        app.pending = Some(Pending::FetchExpenses);

        let text = screen_text(&app);
        assert!(text.contains("Loading expenses..."));
        assert!(!text.contains("Add Expense"));
        assert!(!text.contains("Recent Expenses"));
    }

    #[test]
    fn test_loaded_dashboard_shows_panels() {
        let app = dashboard_app();

        let text = screen_text(&app);
        assert!(!text.contains("Loading expenses..."));
        assert!(text.contains("Add Expense"));
        assert!(text.contains("No expenses yet. Add one to get started!"));
    }
}
