use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{anyhow, bail};
use tracing::warn;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::auth::Session;
use crate::config::expand_home;
use crate::models::money::parse_non_negative;
use crate::models::{canonical_payment, category, parse_date, Budget, Expense, MonthKey};
use crate::store::Store;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut dyn Store) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit SpendWise", cmd_quit, r);
    register_command!("quit", "Quit SpendWise", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("e", "Go to Expenses", cmd_expenses, r);
    register_command!("expenses", "Go to Expenses", cmd_expenses, r);
    register_command!("b", "Go to Budgets", cmd_budgets, r);
    register_command!("budgets", "Go to Budgets", cmd_budgets, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "add",
        "Add expense (e.g. :add today Food 250 UPI Lunch)",
        cmd_add,
        r
    );
    register_command!("delete", "Delete selected expense", cmd_delete, r);
    register_command!(
        "budget",
        "Set monthly budget (e.g. :budget Food 5000)",
        cmd_budget,
        r
    );
    register_command!(
        "delete-budget",
        "Delete selected (or named) budget",
        cmd_delete_budget,
        r
    );
    register_command!(
        "category",
        "Create category (e.g. :category Travel)",
        cmd_category,
        r
    );
    register_command!(
        "filter",
        "Filter expenses by category (no argument clears)",
        cmd_filter,
        r
    );
    register_command!("month", "Set month (e.g. :month 2024-03)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 03)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "import",
        "Import expenses from CSV (e.g. :import ~/expenses.csv)",
        cmd_import,
        r
    );
    register_command!(
        "export",
        "Export this month to CSV (e.g. :export ~/march.csv)",
        cmd_export,
        r
    );
    register_command!("logout", "Log out", cmd_logout, r);

    r
});

/// Run one `:` command. Failures end up in the status bar, never abort the UI.
pub(crate) fn handle_command(input: &str, app: &mut App, store: &mut dyn Store) {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if cmd_name.is_empty() {
        return;
    }

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, store) {
            warn!(command = cmd_name, error = %e, "command failed");
            app.set_status(format!("Error: {e}"));
        }
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn session(app: &App) -> anyhow::Result<Session> {
    app.session.clone().ok_or_else(|| anyhow!("Not logged in"))
}

/// Match a typed category against the owner's list, keeping the stored spelling.
fn resolve_category(app: &App, name: &str) -> anyhow::Result<String> {
    category::find_by_name(&app.categories, name)
        .cloned()
        .ok_or_else(|| unknown_category(name))
}

fn unknown_category(name: &str) -> anyhow::Error {
    anyhow!("Unknown category '{name}'. Create it with :category {name}")
}

/// Longest run of leading words that names a category, e.g. `Eating Out 250`.
/// Returns the stored name and how many words it took.
fn match_category_prefix(app: &App, words: &[&str]) -> Option<(String, usize)> {
    (1..=words.len()).rev().find_map(|n| {
        category::find_by_name(&app.categories, &words[..n].join(" "))
            .map(|name| (name.clone(), n))
    })
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _store: &mut dyn Store) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_all(store)
}

fn cmd_expenses(_args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    app.refresh_all(store)
}

fn cmd_budgets(_args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    app.screen = Screen::Budgets;
    app.refresh_all(store)
}

fn cmd_help(_args: &str, app: &mut App, _store: &mut dyn Store) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    if tokens.len() < 3 {
        app.set_status(
            "Usage: :add <date|today> <category> <amount> [payment] [description]. Example: :add today Food 250 UPI Lunch",
        );
        return Ok(());
    }

    let session = session(app)?;
    let date = if tokens[0].eq_ignore_ascii_case("today") {
        chrono::Local::now().date_naive()
    } else {
        parse_date(tokens[0])?
    };
    // Category names may span several words; the amount follows them
    let (category, used) = match_category_prefix(app, &tokens[1..tokens.len() - 1])
        .ok_or_else(|| unknown_category(tokens[1]))?;
    let amount = parse_non_negative(tokens[1 + used])?;

    let mut rest = &tokens[2 + used..];
    let payment = match rest.first().and_then(|p| canonical_payment(p)) {
        Some(p) => {
            rest = &rest[1..];
            p
        }
        None => "",
    };
    let description = rest.join(" ");

    let expense = Expense::new(session.owner().clone(), date, &category, amount)?
        .with_description(&description)
        .with_payment(payment);
    store.insert_expense(&expense)?;
    app.refresh_all(store)?;

    let mut msg = format!("Added {category} {amount} on {date}");
    if MonthKey::of(date) != app.month {
        msg.push_str(&format!(" (outside {})", app.month));
    }
    app.set_status(msg);
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _store: &mut dyn Store) -> anyhow::Result<()> {
    if app.screen != Screen::Expenses || app.expenses.is_empty() {
        app.set_status("Navigate to Expenses and select one first");
        return Ok(());
    }

    if let Some(expense) = app.selected_expense() {
        if let Some(id) = expense.id.clone() {
            let label = format!("{} {} {}", expense.date, expense.category, expense.amount);
            app.confirm_message = format!("Delete expense '{label}'?");
            app.pending_action = Some(PendingAction::DeleteExpense { id, label });
            app.input_mode = InputMode::Confirm;
        }
    }

    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    // Last token is the amount, everything before is the category name
    let parts: Vec<&str> = args.rsplitn(2, ' ').collect();
    if args.is_empty() || parts.len() < 2 {
        app.set_status("Usage: :budget <category> <amount>. Example: :budget Food 5000");
        return Ok(());
    }

    let session = session(app)?;
    let amount = parse_non_negative(parts[0])?;
    let category = resolve_category(app, parts[1].trim())?;
    let budget = Budget::new(session.owner().clone(), app.month, &category, amount)?;
    store.upsert_budget(&budget)?;

    app.screen = Screen::Budgets;
    app.refresh_all(store)?;
    app.set_status(format!("Budget set: {category} = {amount} for {}", app.month));
    Ok(())
}

fn cmd_delete_budget(args: &str, app: &mut App, _store: &mut dyn Store) -> anyhow::Result<()> {
    let category = if args.is_empty() {
        match app.report.budgets.get(app.budget_index) {
            Some(budget) => budget.category.clone(),
            None => {
                app.set_status("No budgets to delete");
                return Ok(());
            }
        }
    } else {
        let budgeted: Vec<String> = app.report.budgets.iter().map(|b| b.category.clone()).collect();
        match category::find_by_name(&budgeted, args) {
            Some(name) => name.clone(),
            None => bail!("No budget for '{args}' in {}", app.month),
        }
    };

    app.confirm_message = format!("Delete budget for '{category}' in {}?", app.month);
    app.pending_action = Some(PendingAction::DeleteBudget { category });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :category <name>");
        return Ok(());
    }

    let session = session(app)?;
    if store.add_category(session.owner(), args)? {
        app.refresh_all(store)?;
        app.set_status(format!("Created category: {args}"));
    } else {
        app.set_status(format!("Category '{args}' already exists"));
    }
    Ok(())
}

fn cmd_filter(args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    app.expense_index = 0;
    app.expense_scroll = 0;

    if args.is_empty() {
        app.category_filter = None;
        app.refresh_all(store)?;
        app.set_status("Category filter cleared");
        return Ok(());
    }

    let category = resolve_category(app, args)?;
    app.category_filter = Some(category.clone());
    app.refresh_all(store)?;
    app.set_status(format!("Filtering by category: {category}"));
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    if args.is_empty() {
        return app.set_month(MonthKey::current(), store);
    }

    // Accept "2024-03", "2024-3", "03" and "3"
    let month = if args.len() <= 2 {
        let number: u32 = args
            .parse()
            .map_err(|_| anyhow!("Invalid month format. Use YYYY-MM (e.g. 2024-03)"))?;
        MonthKey::new(app.month.year(), number)?
    } else {
        MonthKey::parse(args)?
    };
    app.set_month(month, store)
}

fn cmd_next_month(_args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    step_month(app, store, app.month.next())
}

fn cmd_prev_month(_args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    step_month(app, store, app.month.prev())
}

/// Stepping stays inside the picker range once the view is in it.
fn step_month(app: &mut App, store: &mut dyn Store, target: MonthKey) -> anyhow::Result<()> {
    let range = MonthKey::picker_range();
    if range.contains(&app.month) && !range.contains(&target) {
        app.set_status(format!(
            "Months run from {} to {}",
            MonthKey::earliest(),
            MonthKey::current()
        ));
        return Ok(());
    }
    app.set_month(target, store)
}

fn cmd_import(args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <file.csv>");
        return Ok(());
    }

    let session = session(app)?;
    let path = expand_home(&PathBuf::from(args));
    let summary = crate::import::import_file(store, &session, &path)?;
    app.refresh_all(store)?;

    let mut msg = format!("Imported {} expenses from {}", summary.imported, path.display());
    if !summary.new_categories.is_empty() {
        msg.push_str(&format!(
            " (new categories: {})",
            summary.new_categories.join(", ")
        ));
    }
    app.set_status(msg);
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, store: &mut dyn Store) -> anyhow::Result<()> {
    let session = session(app)?;
    let path = if args.is_empty() {
        let home = directories::UserDirs::new()
            .map(|d| d.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        home.join(format!("spendwise-export-{}.csv", app.month))
    } else {
        expand_home(&PathBuf::from(args))
    };

    let count = crate::import::export_file(store, &session, &path, Some(app.month))?;
    if count == 0 {
        app.set_status(format!("No expenses in {}; wrote header only to {}", app.month, path.display()));
    } else {
        app.set_status(format!("Exported {count} expenses to {}", path.display()));
    }
    Ok(())
}

fn cmd_logout(_args: &str, app: &mut App, _store: &mut dyn Store) -> anyhow::Result<()> {
    app.logout();
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
