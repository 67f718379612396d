use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::app::{App, LoginField};
use crate::ui::render::centered;
use crate::ui::theme;

const LABEL_WIDTH: usize = 10;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.login;
    let title = if form.registering {
        " SpendWise: Create Account "
    } else {
        " SpendWise: Log In "
    };

    let mut fields: Vec<(LoginField, &str, String)> = Vec::new();
    if form.registering {
        fields.push((LoginField::Name, "Name", form.name.clone()));
    }
    fields.push((LoginField::Email, "Email", form.email.clone()));
    fields.push((
        LoginField::Password,
        "Password",
        "•".repeat(form.password.chars().count()),
    ));

    let mut lines = vec![Line::from("")];
    let mut cursor = None;
    for (field, label, value) in &fields {
        let active = *field == form.field;
        let label_style = if active {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::dim_style()
        };
        if active {
            cursor = Some((lines.len(), value.chars().count()));
        }
        lines.push(Line::from(vec![
            Span::styled(format!("  {label:<LABEL_WIDTH$}"), label_style),
            Span::styled(value.clone(), theme::normal_style()),
        ]));
        lines.push(Line::from(""));
    }

    match &form.error {
        Some(err) => lines.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(theme::RED),
        ))),
        None if !app.status_message.is_empty() => lines.push(Line::from(Span::styled(
            format!("  {}", app.status_message),
            Style::default().fg(theme::GREEN),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(""));
    let toggle_hint = if form.registering {
        "Ctrl-r back to login"
    } else {
        "Ctrl-r create account"
    };
    lines.push(Line::from(Span::styled(
        format!("  Enter next/submit | Tab switch | {toggle_hint} | Esc quit"),
        theme::dim_style(),
    )));

    let popup = centered(area, 64, lines.len() as u16 + 2);
    f.render_widget(Clear, popup);
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(widget, popup);

    if let Some((row, col)) = cursor {
        let x = popup.x + 1 + (2 + LABEL_WIDTH + col) as u16;
        let y = popup.y + 1 + row as u16;
        if x < popup.x + popup.width && y < popup.y + popup.height {
            f.set_cursor_position((x, y));
        }
    }
}
