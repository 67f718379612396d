use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::money::format_amount;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

fn title(app: &App) -> String {
    match &app.category_filter {
        Some(cat) => format!(
            " Expenses {} ({}) filter: {cat} ",
            app.month,
            app.expenses.len()
        ),
        None => format!(" Expenses {} ({}) ", app.month, app.expenses.len()),
    }
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title(app),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    if app.expenses.is_empty() {
        let hint = if app.category_filter.is_some() {
            "Press Esc or run :filter to clear the category filter"
        } else {
            "Add one with :add <date|today> <category> <amount>"
        };
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No expenses for this month",
                theme::dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(hint, theme::dim_style())),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["Date", "Category", "Description", "Payment", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .expenses
        .iter()
        .enumerate()
        .skip(app.expense_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, e)| {
            let style = if i == app.expense_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let amount_style = if i == app.expense_index {
                style
            } else {
                theme::amount_style()
            };

            Row::new(vec![
                Cell::from(e.date.format("%Y-%m-%d").to_string()),
                Cell::from(truncate(&e.category, 16)),
                Cell::from(truncate(&e.description, 40)),
                Cell::from(e.payment.clone()),
                Cell::from(Span::styled(
                    format_amount(e.amount, &app.currency),
                    amount_style,
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(17),
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
