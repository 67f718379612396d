use anyhow::Result;

use crate::auth::Session;
use crate::config::Settings;
use crate::models::{Expense, ExpenseId, MonthKey};
use crate::report::MonthlyReport;
use crate::store::{ExpenseFilter, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Expenses,
    Budgets,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Expenses, Self::Budgets]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Expenses => write!(f, "Expenses"),
            Self::Budgets => write!(f, "Budgets"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteExpense { id: ExpenseId, label: String },
    DeleteBudget { category: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoginField {
    Name,
    Email,
    Password,
}

/// Login / registration form shown until a session exists.
#[derive(Debug, Clone)]
pub(crate) struct LoginForm {
    pub(crate) registering: bool,
    pub(crate) field: LoginField,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) error: Option<String>,
}

impl LoginForm {
    fn new(email: Option<&str>) -> Self {
        let email = email.unwrap_or_default().to_string();
        let field = if email.is_empty() {
            LoginField::Email
        } else {
            LoginField::Password
        };
        Self {
            registering: false,
            field,
            name: String::new(),
            email,
            password: String::new(),
            error: None,
        }
    }

    fn fields(&self) -> &'static [LoginField] {
        if self.registering {
            &[LoginField::Name, LoginField::Email, LoginField::Password]
        } else {
            &[LoginField::Email, LoginField::Password]
        }
    }

    pub(crate) fn next_field(&mut self) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(pos + 1) % fields.len()];
    }

    pub(crate) fn prev_field(&mut self) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(pos + fields.len() - 1) % fields.len()];
    }

    pub(crate) fn input_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Name => &mut self.name,
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    /// Switch between login and register.
    pub(crate) fn toggle(&mut self) {
        self.registering = !self.registering;
        self.error = None;
        self.field = if self.registering {
            LoginField::Name
        } else {
            LoginField::Email
        };
    }

    /// Whether the cursor is on the last field, where Enter submits.
    pub(crate) fn on_last_field(&self) -> bool {
        self.fields().last() == Some(&self.field)
    }
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    pub(crate) session: Option<Session>,
    pub(crate) login: LoginForm,
    pub(crate) currency: String,
    pub(crate) month: MonthKey,

    // Dashboard + Budgets
    pub(crate) report: MonthlyReport,

    // Expenses
    pub(crate) expenses: Vec<Expense>,
    pub(crate) category_filter: Option<String>,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    pub(crate) categories: Vec<String>,

    // Budgets
    pub(crate) budget_index: usize,
    pub(crate) budget_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            session: None,
            login: LoginForm::new(settings.email.as_deref()),
            currency: settings.currency.clone(),
            month: MonthKey::current(),

            report: MonthlyReport::default(),

            expenses: Vec::new(),
            category_filter: None,
            expense_index: 0,
            expense_scroll: 0,

            categories: Vec::new(),

            budget_index: 0,
            budget_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Re-read everything the screens show. Without a session this only clears.
    pub(crate) fn refresh_all(&mut self, store: &dyn Store) -> Result<()> {
        let Some(session) = &self.session else {
            self.report = MonthlyReport::default();
            self.expenses.clear();
            self.categories.clear();
            return Ok(());
        };

        self.report = MonthlyReport::load(store, session, self.month)?;
        self.categories = store.list_categories(session.owner())?;
        let filter = ExpenseFilter::month(self.month).with_category(self.category_filter.clone());
        self.expenses = store.load_expenses(session.owner(), &filter)?;

        clamp_cursor(&mut self.expense_index, &mut self.expense_scroll, self.expenses.len());
        clamp_cursor(
            &mut self.budget_index,
            &mut self.budget_scroll,
            self.report.budgets.len(),
        );
        Ok(())
    }

    pub(crate) fn start_session(&mut self, session: Session, store: &dyn Store) -> Result<()> {
        let name = session.user.name.clone();
        self.session = Some(session);
        self.login = LoginForm::new(None);
        self.screen = Screen::Dashboard;
        self.month = MonthKey::current();
        self.category_filter = None;
        self.refresh_all(store)?;
        self.set_status(format!("Welcome, {name}"));
        Ok(())
    }

    pub(crate) fn logout(&mut self) {
        let email = self.session.take().map(|s| s.user.email);
        self.login = LoginForm::new(email.as_deref());
        self.report = MonthlyReport::default();
        self.expenses.clear();
        self.categories.clear();
        self.pending_action = None;
        self.input_mode = InputMode::Normal;
        self.set_status("Logged out");
    }

    pub(crate) fn set_month(&mut self, month: MonthKey, store: &dyn Store) -> Result<()> {
        self.month = month;
        self.expense_index = 0;
        self.expense_scroll = 0;
        self.budget_index = 0;
        self.budget_scroll = 0;
        self.refresh_all(store)?;
        self.set_status(format!("Month: {month}"));
        Ok(())
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.expenses.get(self.expense_index)
    }

    pub(crate) fn page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

fn clamp_cursor(index: &mut usize, scroll: &mut usize, len: usize) {
    if *index >= len {
        *index = len.saturating_sub(1);
    }
    if *scroll > *index {
        *scroll = *index;
    }
}
