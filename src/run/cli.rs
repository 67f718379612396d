use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::auth::{self, Session};
use crate::config::{Backend, Overrides, Settings};
use crate::models::money::{format_amount, parse_non_negative};
use crate::models::{
    canonical_payment, category, parse_date, Budget, Expense, ExpenseId, MonthKey,
    PAYMENT_METHODS,
};
use crate::report::MonthlyReport;
use crate::store::{ExpenseFilter, Store};

#[derive(Debug, Parser)]
#[command(
    name = "spendwise",
    version,
    about = "Personal expense tracker with monthly budgets",
    long_about = "SpendWise records daily expenses, tracks monthly category budgets \
                  and shows where the money went. Run without a command to open \
                  the interactive dashboard."
)]
pub(crate) struct Cli {
    /// Config file (default: <config dir>/spendwise/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true, value_enum)]
    backend: Option<Backend>,

    /// Directory holding the database and log file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Account email for CLI commands
    #[arg(long, global = true)]
    email: Option<String>,

    #[arg(
        long,
        global = true,
        env = "SPENDWISE_PASSWORD",
        hide = true,
        hide_env_values = true
    )]
    pub(crate) password: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

impl Cli {
    pub(crate) fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            backend: self.backend,
            data_dir: self.data_dir.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Create an account for --email
    Register {
        /// Display name
        #[arg(long)]
        name: String,
    },

    #[command(flatten)]
    Account(AccountCommand),
}

/// Commands that run as a logged-in user.
#[derive(Debug, Subcommand)]
pub(crate) enum AccountCommand {
    /// Record an expense
    Add {
        /// Date (YYYY-MM-DD) or "today"
        date: String,
        /// Category name
        category: String,
        /// Amount (e.g. "250" or "1,299.50")
        amount: String,
        /// Payment method (Card, Cash, UPI, Other)
        #[arg(short, long)]
        payment: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List expenses for a month
    List {
        /// Month (YYYY-MM), default current
        #[arg(short, long)]
        month: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete an expense by id
    Delete { id: String },

    /// Monthly category budgets
    #[command(subcommand)]
    Budget(BudgetCommand),

    /// Totals, top category, budget overrun and daily trend
    Summary {
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List categories
    Categories,

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Import expenses from a CSV file
    Import { file: PathBuf },

    /// Export expenses to CSV
    Export {
        /// Output file (default: spendwise-export-<month>.csv in the home directory)
        path: Option<PathBuf>,
        /// Only this month (YYYY-MM); all expenses when omitted
        #[arg(short, long)]
        month: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum BudgetCommand {
    /// Set or replace a category budget
    Set {
        category: String,
        amount: String,
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show budgets with spend so far
    List {
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Remove a category budget
    Delete {
        category: String,
        #[arg(short, long)]
        month: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum CategoryCommand {
    /// Add a category
    Add { name: String },
}

pub(crate) fn as_cli(
    command: Command,
    password: Option<String>,
    settings: &Settings,
    store: &mut dyn Store,
    out: &mut dyn Write,
) -> Result<()> {
    let email = settings
        .email
        .as_deref()
        .ok_or_else(|| anyhow!("No account selected. Pass --email or set `email` in config.toml"))?;
    let password = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let command = match command {
        Command::Register { name } => {
            let id = auth::register(store, &name, email, &password)?;
            writeln!(out, "Registered {email} (user {id})")?;
            return Ok(());
        }
        Command::Account(command) => command,
    };

    let session = auth::login(store, email, &password)?;
    let currency = settings.currency.as_str();

    match command {
        AccountCommand::Add {
            date,
            category,
            amount,
            payment,
            description,
        } => cli_add(store, &session, &date, &category, &amount, payment, description, out),
        AccountCommand::List { month, category } => {
            cli_list(store, &session, month.as_deref(), category, currency, out)
        }
        AccountCommand::Delete { id } => {
            store.delete_expense(session.owner(), &ExpenseId::new(id.as_str()))?;
            writeln!(out, "Deleted expense {id}")?;
            Ok(())
        }
        AccountCommand::Budget(cmd) => cli_budget(store, &session, cmd, currency, out),
        AccountCommand::Summary { month } => {
            cli_summary(store, &session, month.as_deref(), currency, out)
        }
        AccountCommand::Categories => {
            for name in store.list_categories(session.owner())? {
                writeln!(out, "{name}")?;
            }
            Ok(())
        }
        AccountCommand::Category(CategoryCommand::Add { name }) => {
            if store.add_category(session.owner(), &name)? {
                writeln!(out, "Added category {name}")?;
            } else {
                writeln!(out, "Category {name} already exists")?;
            }
            Ok(())
        }
        AccountCommand::Import { file } => {
            let summary = crate::import::import_file(store, &session, &file)?;
            writeln!(out, "Imported {} expenses", summary.imported)?;
            if !summary.new_categories.is_empty() {
                writeln!(out, "New categories: {}", summary.new_categories.join(", "))?;
            }
            Ok(())
        }
        AccountCommand::Export { path, month } => {
            let month = month.as_deref().map(MonthKey::parse).transpose()?;
            let path = path.unwrap_or_else(|| default_export_path(month));
            let count = crate::import::export_file(store, &session, &path, month)?;
            writeln!(out, "Exported {count} expenses to {}", path.display())?;
            Ok(())
        }
    }
}

fn month_or_current(month: Option<&str>) -> Result<MonthKey> {
    Ok(match month {
        Some(m) => MonthKey::parse(m)?,
        None => MonthKey::current(),
    })
}

fn default_export_path(month: Option<MonthKey>) -> PathBuf {
    let home = directories::UserDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let suffix = month.map_or_else(|| "all".to_string(), |m| m.to_string());
    home.join(format!("spendwise-export-{suffix}.csv"))
}

fn resolve_category(store: &dyn Store, session: &Session, name: &str) -> Result<String> {
    let categories = store.list_categories(session.owner())?;
    category::find_by_name(&categories, name)
        .cloned()
        .ok_or_else(|| {
            anyhow!("Unknown category '{name}'. Add it with: spendwise category add \"{name}\"")
        })
}

#[allow(clippy::too_many_arguments)]
fn cli_add(
    store: &mut dyn Store,
    session: &Session,
    date: &str,
    category: &str,
    amount: &str,
    payment: Option<String>,
    description: Option<String>,
    out: &mut dyn Write,
) -> Result<()> {
    let date = if date.eq_ignore_ascii_case("today") {
        chrono::Local::now().date_naive()
    } else {
        parse_date(date)?
    };
    let category = resolve_category(store, session, category)?;
    let amount = parse_non_negative(amount)?;
    let payment = match payment.as_deref() {
        Some(p) => canonical_payment(p).ok_or_else(|| {
            anyhow!(
                "Unknown payment method '{p}'. Use one of: {}",
                PAYMENT_METHODS.join(", ")
            )
        })?,
        None => "",
    };

    let expense = Expense::new(session.owner().clone(), date, &category, amount)?
        .with_description(description.as_deref().unwrap_or_default())
        .with_payment(payment);
    let id = store.insert_expense(&expense)?;
    writeln!(out, "Added expense {id}: {date} {category} {amount}")?;
    Ok(())
}

fn cli_list(
    store: &dyn Store,
    session: &Session,
    month: Option<&str>,
    category: Option<String>,
    currency: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let month = month_or_current(month)?;
    let category = category
        .map(|c| resolve_category(store, session, &c))
        .transpose()?;
    let filter = ExpenseFilter::month(month).with_category(category);
    let expenses = store.load_expenses(session.owner(), &filter)?;

    if expenses.is_empty() {
        writeln!(out, "No expenses for {month}")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<38} {:<10} {:<14} {:<24} {:<7} {:>12}",
        "ID", "Date", "Category", "Description", "Payment", "Amount"
    )?;
    writeln!(out, "{}", "─".repeat(110))?;
    for e in &expenses {
        let id = e.id.as_ref().map(|id| id.as_str()).unwrap_or_default();
        writeln!(
            out,
            "{:<38} {:<10} {:<14} {:<24} {:<7} {:>12}",
            id,
            e.date.format("%Y-%m-%d"),
            e.category,
            e.description,
            e.payment,
            format_amount(e.amount, currency)
        )?;
    }
    let total: rust_decimal::Decimal = expenses.iter().map(|e| e.amount).sum();
    writeln!(out, "{} expenses, total {}", expenses.len(), format_amount(total, currency))?;
    Ok(())
}

fn cli_budget(
    store: &mut dyn Store,
    session: &Session,
    cmd: BudgetCommand,
    currency: &str,
    out: &mut dyn Write,
) -> Result<()> {
    match cmd {
        BudgetCommand::Set {
            category,
            amount,
            month,
        } => {
            let month = month_or_current(month.as_deref())?;
            let category = resolve_category(store, session, &category)?;
            let amount = parse_non_negative(&amount)?;
            let budget = Budget::new(session.owner().clone(), month, &category, amount)?;
            store.upsert_budget(&budget)?;
            writeln!(
                out,
                "Budget for {category} in {month} set to {}",
                format_amount(amount, currency)
            )?;
        }
        BudgetCommand::List { month } => {
            let month = month_or_current(month.as_deref())?;
            let report = MonthlyReport::load(store, session, month)?;
            let statuses = report.budget_status();
            if statuses.is_empty() {
                writeln!(out, "No budgets for {month}")?;
                return Ok(());
            }
            writeln!(
                out,
                "{:<18} {:>12} {:>12} {:>12} {:>6}",
                "Category", "Limit", "Spent", "Remaining", "Used"
            )?;
            writeln!(out, "{}", "─".repeat(64))?;
            for s in &statuses {
                writeln!(
                    out,
                    "{:<18} {:>12} {:>12} {:>12} {:>5.0}%",
                    s.category,
                    format_amount(s.limit, currency),
                    format_amount(s.spent, currency),
                    format_amount(s.remaining(), currency),
                    s.usage() * 100.0
                )?;
            }
        }
        BudgetCommand::Delete { category, month } => {
            let month = month_or_current(month.as_deref())?;
            let category = resolve_category(store, session, &category)?;
            store.delete_budget(session.owner(), month, &category)?;
            writeln!(out, "Deleted budget for {category} in {month}")?;
        }
    }
    Ok(())
}

fn cli_summary(
    store: &dyn Store,
    session: &Session,
    month: Option<&str>,
    currency: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let month = month_or_current(month)?;
    let report = MonthlyReport::load(store, session, month)?;
    let summary = &report.summary;

    writeln!(out, "SpendWise: {month}")?;
    writeln!(out, "{}", "─".repeat(40))?;
    writeln!(out, "  Total spent:   {}", format_amount(summary.total_spent, currency))?;
    match &summary.top_category {
        Some(top) => writeln!(
            out,
            "  Top category:  {} ({})",
            top.category,
            format_amount(top.total_amount, currency)
        )?,
        None => writeln!(out, "  Top category:  -")?,
    }
    writeln!(out, "  Over budget:   {}", format_amount(summary.over_budget_total, currency))?;
    writeln!(out, "  Expenses:      {}", report.expense_count())?;

    if report.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "By category:")?;
    for ct in &summary.category_totals {
        writeln!(out, "  {:<18} {:>12}", ct.category, format_amount(ct.total_amount, currency))?;
    }

    writeln!(out)?;
    writeln!(out, "Daily:")?;
    for d in &report.daily {
        writeln!(
            out,
            "  {}  {:>12}",
            d.date.format("%Y-%m-%d"),
            format_amount(d.total_amount, currency)
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
