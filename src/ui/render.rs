use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme::Palette;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let palette = app.theme.palette();
    f.render_widget(
        Block::default().style(Style::default().bg(palette.header_bg)),
        f.area(),
    );

    match app.screen {
        Screen::Signup | Screen::Login => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(1)])
                .split(f.area());
            super::screens::auth::render(f, chunks[0], app);
            render_command_bar(f, chunks[1], app, palette);
        }
        Screen::Dashboard => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1), // Navbar
                    Constraint::Min(5),    // Main content
                    Constraint::Length(1), // Status bar
                    Constraint::Length(1), // Command bar
                ])
                .split(f.area());

            render_navbar(f, chunks[0], app, palette);
            super::screens::dashboard::render(f, chunks[1], app);
            render_status_bar(f, chunks[2], app, palette);
            render_command_bar(f, chunks[3], app, palette);
        }
    }

    if app.show_help {
        render_help_overlay(f, f.area(), palette);
    }
}

fn render_navbar(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let greeting = app
        .user_name
        .as_deref()
        .map(|name| format!("Hello, {name}"))
        .unwrap_or_default();
    let toggle = format!(" [t] {} mode ", app.theme.toggled());
    let logout = " [:logout] ";

    let brand = " Fin-Track ";
    let used = brand.chars().count()
        + greeting.chars().count()
        + toggle.chars().count()
        + logout.chars().count();
    let pad = (area.width as usize).saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(
            brand,
            Style::default()
                .fg(palette.green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(pad)),
        Span::styled(greeting, palette.normal_style()),
        Span::styled(toggle, palette.dim_style()),
        Span::styled(logout, Style::default().fg(palette.red)),
    ]))
    .style(Style::default().bg(palette.surface));
    f.render_widget(bar, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_bg = match app.input_mode {
        InputMode::Normal => palette.accent,
        InputMode::Command | InputMode::Editing => palette.green,
        InputMode::Confirm => palette.red,
    };
    let mode_style = Style::default()
        .fg(palette.header_bg)
        .bg(mode_bg)
        .add_modifier(Modifier::BOLD);

    let info = format!(" {} | {} expenses", app.screen, app.expenses.len());

    let right = match app.input_mode {
        InputMode::Editing => " Tab next field | ←/→ category | Enter save | Esc back ",
        _ => " a add | d delete | e export | r refresh | ? help ",
    };

    let available = area.width as usize;
    let used = mode_label.len() + info.len() + right.chars().count();
    let pad = available.saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(&mode_label, mode_style),
        Span::styled(&info, palette.status_bar_style()),
        Span::styled(" ".repeat(pad), palette.status_bar_style()),
        Span::styled(right, palette.status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Command => (
            Line::from(vec![
                Span::styled(":", Style::default().fg(palette.accent)),
                Span::styled(&app.command_input, palette.command_bar_style()),
            ]),
            Some(1 + app.command_input.chars().count() as u16),
        ),
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(&app.confirm_message, Style::default().fg(palette.yellow)),
                Span::styled(" [y/N] ", Style::default().fg(palette.red)),
            ]),
            None,
        ),
        InputMode::Normal | InputMode::Editing => (
            if app.status_message.is_empty() {
                let hint = match app.screen {
                    Screen::Signup => " Tab next field | Enter sign up | Ctrl-l login | Ctrl-c quit",
                    Screen::Login => " Tab next field | Enter login | Ctrl-n sign up | Ctrl-c quit",
                    Screen::Dashboard => " Press : for commands, ? for help",
                };
                Line::from(Span::styled(hint, palette.dim_style()))
            } else {
                Line::from(Span::styled(
                    &app.status_message,
                    palette.command_bar_style(),
                ))
            },
            None,
        ),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(palette.command_bg));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

fn render_help_overlay(f: &mut Frame, area: Rect, palette: &Palette) {
    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(palette.yellow)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let row = |text: &'static str| Line::from(Span::styled(text, palette.normal_style()));

    let mut help_text = vec![
        Line::from(Span::styled(
            " Fin-Track Help ",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading(" Expenses"),
        row("  j/k or Up/Down   Move cursor           g/G        Top/Bottom"),
        row("  a or i           Focus the form        d or Del   Delete expense"),
        row("  r                Reload from server    e / E      Export PDF / CSV"),
        row("  t                Toggle theme          Ctrl-q     Quit"),
        Line::from(""),
        heading(" Form"),
        row("  Tab/Shift-Tab    Next/previous field   Left/Right Change category"),
        row("  Enter            Save expense          Esc        Back to list"),
        Line::from(""),
        heading(" Commands"),
    ];

    let mut seen = std::collections::HashSet::new();
    let mut cmd_lines: Vec<(&str, &str)> = Vec::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        if name.len() <= 1 {
            continue;
        }
        if seen.insert(cmd.description) {
            cmd_lines.push((name, cmd.description));
        }
    }
    cmd_lines.sort_by_key(|(name, _)| *name);
    for (name, desc) in &cmd_lines {
        help_text.push(Line::from(Span::styled(
            format!("  :{name:<12} {desc}"),
            palette.normal_style(),
        )));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        " Press any key to close ",
        palette.dim_style(),
    )));

    let popup_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 84.min(area.width.saturating_sub(4));
    let popup_area = centered(area, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .style(Style::default().bg(palette.header_bg)),
    );
    f.render_widget(help, popup_area);
}

/// A `width` x `height` rect centred in `area`, clamped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
