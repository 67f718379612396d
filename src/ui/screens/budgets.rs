use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::models::money::format_amount;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{progress_bar, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let statuses = app.report.budget_status();
    if statuses.is_empty() {
        render_empty(f, area, app);
        return;
    }

    let currency = app.currency.as_str();
    let items: Vec<ListItem> = statuses
        .iter()
        .enumerate()
        .skip(app.budget_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, status)| {
            let ratio = status.usage();
            let color = theme::usage_color(ratio);

            let style = if i == app.budget_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let remaining = status.remaining();
            let tail = if remaining < Decimal::ZERO {
                format!(" over by {}", format_amount(status.overrun(), currency))
            } else {
                format!(" {} left", format_amount(remaining, currency))
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", truncate(&status.category, 17)), style),
                Span::styled(
                    format!(
                        "{}/{} ",
                        format_amount(status.spent, currency),
                        format_amount(status.limit, currency)
                    ),
                    Style::default().fg(color),
                ),
                Span::styled(progress_bar(ratio, 20), Style::default().fg(color)),
                Span::styled(
                    format!(" {:.0}%", ratio * 100.0),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(tail, theme::dim_style()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(
                    " Budgets for {} (total {}) ",
                    app.month,
                    format_amount(app.report.total_budgeted(), currency)
                ),
                theme::title_style(),
            )),
    );
    f.render_widget(list, area);
}

fn render_empty(f: &mut Frame, area: Rect, app: &App) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("No budgets set for {}", app.month),
            theme::dim_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Use :budget <category> <amount> to set a spending limit",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Budgets ", theme::title_style())),
    );
    f.render_widget(msg, area);
}
