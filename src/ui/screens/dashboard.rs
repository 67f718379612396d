use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::money::format_amount;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Summary cards
            Constraint::Min(8),    // Charts
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);

    if app.report.is_empty() {
        render_empty(f, chunks[1], app);
        return;
    }

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_category_chart(f, charts[0], app);
    render_daily_chart(f, charts[1], app);
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()))
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let summary = &app.report.summary;
    let currency = app.currency.as_str();

    render_card(
        f,
        cards[0],
        "Total Spent",
        format_amount(summary.total_spent, currency),
        theme::PEACH,
        format!("budgeted {}", format_amount(app.report.total_budgeted(), currency)),
    );

    let (top_name, top_sub) = match &summary.top_category {
        Some(top) => (top.category.clone(), format_amount(top.total_amount, currency)),
        None => ("-".to_string(), String::new()),
    };
    render_card(f, cards[1], "Top Category", top_name, theme::ACCENT, top_sub);

    let over = summary.over_budget_total;
    render_card(
        f,
        cards[2],
        "Over Budget",
        format_amount(over, currency),
        if over > Decimal::ZERO {
            theme::RED
        } else {
            theme::GREEN
        },
        String::new(),
    );

    render_card(
        f,
        cards[3],
        "Expenses",
        app.report.expense_count().to_string(),
        theme::TEXT,
        format!("{} days with spending", app.report.daily.len()),
    );
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color, subtitle: String) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(titled_block(title));

    f.render_widget(text, area);
}

fn render_empty(f: &mut Frame, area: Rect, app: &App) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("No expenses recorded for {}", app.month),
            theme::dim_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Add one with :add or import a CSV with :import",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(titled_block("Spending"));
    f.render_widget(msg, area);
}

fn render_category_chart(f: &mut Frame, area: Rect, app: &App) {
    let bars: Vec<Bar> = app
        .report
        .summary
        .category_totals
        .iter()
        .map(|ct| {
            Bar::default()
                .value(ct.total_amount.round().to_u64().unwrap_or(0))
                .label(Line::from(truncate(&ct.category, 12)))
                .text_value(format_amount(ct.total_amount, &app.currency))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(titled_block("Spending by Category"))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::ACCENT))
        .label_style(theme::normal_style());

    f.render_widget(chart, area);
}

fn render_daily_chart(f: &mut Frame, area: Rect, app: &App) {
    let points: Vec<(f64, f64)> = app
        .report
        .daily
        .iter()
        .map(|d| {
            (
                f64::from(chrono::Datelike::day(&d.date)),
                d.total_amount.to_f64().unwrap_or(0.0),
            )
        })
        .collect();

    let days = f64::from(app.month.days_in_month());
    let max = points.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max);
    let y_top = if max > 0.0 { max * 1.1 } else { 1.0 };

    let dataset = Dataset::default()
        .name("per day")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme::YELLOW))
        .data(&points);

    let axis_style = theme::dim_style();
    let chart = Chart::new(vec![dataset])
        .block(titled_block("Daily Spending"))
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([1.0, days])
                .labels(vec![
                    "1".to_string(),
                    format!("{}", (days / 2.0).round()),
                    format!("{days}"),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, y_top])
                .labels(vec![
                    "0".to_string(),
                    format!("{:.0}", y_top / 2.0),
                    format!("{y_top:.0}"),
                ]),
        );

    f.render_widget(chart, area);
}
