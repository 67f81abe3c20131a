use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::app::{App, LoginField, Screen, SignupField};
use crate::ui::render::centered;
use crate::ui::theme::Palette;
use crate::ui::util::mask;

const LABEL_WIDTH: usize = 10;

struct Field {
    label: &'static str,
    value: String,
    focused: bool,
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.theme.palette();

    let (title, fields, error, button, switch_hint) = match app.screen {
        Screen::Login => {
            let form = &app.login;
            (
                " Login ",
                vec![
                    field("Email", &form.email, false, form.focus == LoginField::Email),
                    field(
                        "Password",
                        &form.password,
                        true,
                        form.focus == LoginField::Password,
                    ),
                ],
                form.error.as_deref(),
                if form.submitting { "Logging in..." } else { "Login" },
                "Don't have an account? Ctrl-n to sign up",
            )
        }
        _ => {
            let form = &app.signup;
            (
                " Create Account ",
                vec![
                    field("Name", &form.name, false, form.focus == SignupField::Name),
                    field("Email", &form.email, false, form.focus == SignupField::Email),
                    field(
                        "Password",
                        &form.password,
                        true,
                        form.focus == SignupField::Password,
                    ),
                ],
                form.error.as_deref(),
                if form.submitting {
                    "Creating Account..."
                } else {
                    "Sign Up"
                },
                "Already have an account? Ctrl-l to log in",
            )
        }
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Fin-Track",
            Style::default()
                .fg(palette.green)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from(""),
    ];

    if let Some(error) = error {
        lines.push(Line::from(Span::styled(error.to_string(), palette.error_style())));
        lines.push(Line::from(""));
    }

    let first_field_row = lines.len();
    let mut cursor = None;
    for (i, fld) in fields.iter().enumerate() {
        lines.push(field_line(fld, palette));
        if fld.focused {
            cursor = Some((i, fld.value.chars().count()));
        }
    }

    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            format!("[ {button} ]"),
            Style::default()
                .fg(palette.header_bg)
                .bg(palette.green)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(switch_hint, palette.dim_style())).centered());

    let height = lines.len() as u16 + 2;
    let popup = centered(area, 56, height);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border_style())
        .title(Span::styled(title, palette.title_style()));
    f.render_widget(Paragraph::new(lines).block(block), popup);

    if let Some((row, chars)) = cursor {
        let x = popup.x + 1 + (LABEL_WIDTH + 1 + chars) as u16;
        let y = popup.y + 1 + (first_field_row + row) as u16;
        if x < popup.right() && y < popup.bottom() {
            f.set_cursor_position((x, y));
        }
    }
}

fn field(label: &'static str, raw: &str, secret: bool, focused: bool) -> Field {
    Field {
        label,
        value: if secret { mask(raw) } else { raw.to_string() },
        focused,
    }
}

fn field_line(fld: &Field, palette: &Palette) -> Line<'static> {
    let label_style = if fld.focused {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        palette.dim_style()
    };
    Line::from(vec![
        Span::styled(format!("{:<LABEL_WIDTH$} ", fld.label), label_style),
        Span::styled(fld.value.clone(), palette.normal_style()),
    ])
}
