use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{info, warn};

use crate::auth;
use crate::config::Settings;
use crate::store::Store;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(store: &mut dyn Store, settings: &Settings) -> Result<()> {
    let mut app = App::new(settings);
    info!(backend = store.backend_name(), "starting TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &mut dyn Store,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // Tab, status and command bars
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.session.is_none() {
                handle_login_input(key, app, store)?;
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, store)?,
                InputMode::Command => handle_command_input(key, app, store),
                InputMode::Confirm => handle_confirm_input(key, app, store)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_login_input(key: KeyEvent, app: &mut App, store: &mut dyn Store) -> Result<()> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.running = false,
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => app.running = false,
        KeyCode::Char('r') if ctrl => app.login.toggle(),
        KeyCode::Tab | KeyCode::Down => app.login.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.login.prev_field(),
        KeyCode::Enter => {
            if app.login.on_last_field() {
                submit_login(app, store)?;
            } else {
                app.login.next_field();
            }
        }
        KeyCode::Backspace => {
            app.login.input_mut().pop();
        }
        KeyCode::Char('u') if ctrl => app.login.input_mut().clear(),
        KeyCode::Char(c) if !ctrl => app.login.input_mut().push(c),
        _ => {}
    }
    Ok(())
}

fn submit_login(app: &mut App, store: &mut dyn Store) -> Result<()> {
    let form = app.login.clone();
    if form.registering {
        if let Err(e) = auth::register(store, &form.name, &form.email, &form.password) {
            app.login.error = Some(e.to_string());
            app.login.password.clear();
            return Ok(());
        }
    }

    match auth::login(store, &form.email, &form.password) {
        Ok(session) => app.start_session(session, store)?,
        Err(e) => {
            app.login.error = Some(e.to_string());
            app.login.password.clear();
        }
    }
    Ok(())
}

fn handle_normal_input(key: KeyEvent, app: &mut App, store: &mut dyn Store) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') | KeyCode::Home => handle_goto_top(app),
        KeyCode::Char('G') | KeyCode::End => handle_goto_bottom(app),
        KeyCode::Char('1') => switch_screen(app, store, Screen::Dashboard)?,
        KeyCode::Char('2') => switch_screen(app, store, Screen::Expenses)?,
        KeyCode::Char('3') => switch_screen(app, store, Screen::Budgets)?,
        KeyCode::Tab => cycle_screen(app, store, 1)?,
        KeyCode::BackTab => cycle_screen(app, store, -1)?,
        KeyCode::Char('H') => commands::handle_command("prev-month", app, store),
        KeyCode::Char('L') => commands::handle_command("next-month", app, store),
        KeyCode::Char('D') | KeyCode::Delete => match app.screen {
            Screen::Expenses => commands::handle_command("delete", app, store),
            Screen::Budgets => commands::handle_command("delete-budget", app, store),
            Screen::Dashboard => {}
        },
        KeyCode::Esc => {
            if app.screen == Screen::Expenses && app.category_filter.is_some() {
                commands::handle_command("filter", app, store);
            } else {
                app.set_status("");
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: KeyEvent, app: &mut App, store: &mut dyn Store) {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, store);
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, store: &mut dyn Store) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match apply_pending(action, app, store) {
                    Ok(msg) => app.set_status(msg),
                    Err(e) => {
                        warn!(error = %e, "delete failed");
                        app.set_status(format!("Error: {e}"));
                    }
                }
                app.refresh_all(store)?;
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Ok(())
}

fn apply_pending(action: PendingAction, app: &App, store: &mut dyn Store) -> Result<String> {
    let Some(session) = &app.session else {
        anyhow::bail!("Not logged in");
    };
    match action {
        PendingAction::DeleteExpense { id, label } => {
            store.delete_expense(session.owner(), &id)?;
            Ok(format!("Deleted: {label}"))
        }
        PendingAction::DeleteBudget { category } => {
            store.delete_budget(session.owner(), app.month, &category)?;
            Ok(format!("Deleted budget: {category}"))
        }
    }
}

fn switch_screen(app: &mut App, store: &mut dyn Store, screen: Screen) -> Result<()> {
    app.screen = screen;
    app.refresh_all(store)?;
    app.set_status(format!("{screen}"));
    Ok(())
}

fn cycle_screen(app: &mut App, store: &mut dyn Store, delta: isize) -> Result<()> {
    let screens = Screen::all();
    let pos = screens.iter().position(|s| *s == app.screen).unwrap_or(0) as isize;
    let next = (pos + delta).rem_euclid(screens.len() as isize) as usize;
    switch_screen(app, store, screens[next])
}

fn handle_move_down(app: &mut App) {
    let page = app.page();
    match app.screen {
        Screen::Expenses => scroll_down(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            page,
        ),
        Screen::Budgets => scroll_down(
            &mut app.budget_index,
            &mut app.budget_scroll,
            app.report.budgets.len(),
            page,
        ),
        Screen::Dashboard => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_up(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Budgets => scroll_up(&mut app.budget_index, &mut app.budget_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_to_top(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Budgets => scroll_to_top(&mut app.budget_index, &mut app.budget_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.page();
    match app.screen {
        Screen::Expenses => scroll_to_bottom(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            page,
        ),
        Screen::Budgets => scroll_to_bottom(
            &mut app.budget_index,
            &mut app.budget_scroll,
            app.report.budgets.len(),
            page,
        ),
        Screen::Dashboard => {}
    }
}
