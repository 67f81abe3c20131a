use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::ui::app::App;
use crate::ui::theme::{category_color, Palette};
use crate::ui::util::{format_amount, percent_of, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.theme.palette();

    if app.summary.is_empty() {
        let block = panel(" Analytics ", palette);
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No expense data yet. Add an expense to see your analytics!",
                palette.dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "[e] Export to PDF (nothing to export)",
                palette.dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(text).centered().block(block), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary cards
            Constraint::Min(8),    // Daily bar chart
            Constraint::Length((app.summary.by_category.len() as u16 + 2).min(10)),
        ])
        .split(area);

    render_cards(f, chunks[0], app, palette);
    render_daily_chart(f, chunks[1], app, palette);
    render_categories(f, chunks[2], app, palette);
}

fn panel<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border_style())
        .title(Span::styled(title, palette.title_style()))
}

fn render_cards(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(40),
            Constraint::Percentage(20),
        ])
        .split(area);

    render_card(
        f,
        cards[0],
        "Total Spent",
        format_amount(app.summary.total, &app.currency),
        palette.red,
        palette,
    );
    render_card(
        f,
        cards[1],
        "Avg. Daily Spend",
        format_amount(app.summary.average_per_day, &app.currency),
        palette.yellow,
        palette,
    );

    let export = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "[e] PDF",
            Style::default()
                .fg(palette.green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("[E] CSV", palette.dim_style())),
    ])
    .centered()
    .block(panel(" Export ", palette));
    f.render_widget(export, cards[2]);
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    display: String,
    color: Color,
    palette: &Palette,
) {
    let title = format!(" {title} ");
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            display,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .centered()
    .block(panel(&title, palette));

    f.render_widget(text, area);
}

fn render_daily_chart(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let bar_width: u16 = 7;
    // Most recent days that fit the panel.
    let fits = (area.width.saturating_sub(2) / (bar_width + 1)).max(1) as usize;
    let daily = &app.summary.daily;
    let shown = &daily[daily.len().saturating_sub(fits)..];

    let bars: Vec<Bar> = shown
        .iter()
        .map(|d| {
            Bar::default()
                .value(whole_units(d.amount))
                .text_value(whole_units(d.amount).to_string())
                .label(Line::from(d.label()))
                .style(Style::default().fg(palette.bar))
                .value_style(
                    Style::default()
                        .fg(palette.header_bg)
                        .bg(palette.bar)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(panel(" Daily Spending ", palette))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(palette.bar));

    f.render_widget(chart, area);
}

fn render_categories(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let total = app.summary.total;
    let bar_room = (area.width as usize).saturating_sub(44).max(4);

    let lines: Vec<Line> = app
        .summary
        .by_category
        .iter()
        .enumerate()
        .map(|(i, cat)| {
            let color = category_color(i);
            let pct = percent_of(cat.amount, total);
            let filled = bar_room * usize::from(pct) / 100;
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::styled(
                    format!("{:<14}", truncate(&cat.name, 14)),
                    palette.normal_style(),
                ),
                Span::styled(
                    format!("{:>14} ", format_amount(cat.amount, &app.currency)),
                    palette.normal_style(),
                ),
                Span::styled(format!("{pct:>3}% "), palette.dim_style()),
                Span::styled("█".repeat(filled), Style::default().fg(color)),
            ])
        })
        .collect();

    f.render_widget(
        Paragraph::new(lines).block(panel(" By Category ", palette)),
        area,
    );
}

fn whole_units(amount: Decimal) -> u64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(0)
}
