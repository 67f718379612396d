#![allow(clippy::unwrap_used)]

use super::*;
use crate::store::SqliteStore;

fn settings() -> Settings {
    Settings {
        email: Some("asha@example.com".into()),
        currency: "₹".into(),
        ..Settings::default()
    }
}

fn parse(args: &[&str]) -> Command {
    let mut argv = vec!["spendwise"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command.unwrap()
}

/// Run a command line against `store` and return what it printed.
fn run(store: &mut SqliteStore, args: &[&str]) -> Result<String> {
    let mut out = Vec::new();
    as_cli(parse(args), Some("pw".into()), &settings(), store, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn registered() -> SqliteStore {
    let mut store = SqliteStore::open_in_memory().unwrap();
    run(&mut store, &["register", "--name", "Asha"]).unwrap();
    store
}

// ── argument parsing ──────────────────────────────────────────

#[test]
fn test_no_command_means_tui() {
    let cli = Cli::try_parse_from(["spendwise"]).unwrap();
    assert!(cli.command.is_none());
}

#[test]
fn test_global_flags_become_overrides() {
    let cli = Cli::try_parse_from([
        "spendwise",
        "list",
        "--backend",
        "document",
        "--data-dir",
        "/tmp/sw",
        "--email",
        "a@b.io",
    ])
    .unwrap();
    let overrides = cli.overrides();
    assert_eq!(overrides.backend, Some(Backend::Document));
    assert_eq!(overrides.data_dir, Some(PathBuf::from("/tmp/sw")));
    assert_eq!(overrides.email.as_deref(), Some("a@b.io"));
    assert!(overrides.config_file.is_none());
}

#[test]
fn test_password_accepted_after_subcommand() {
    let cli = Cli::try_parse_from(["spendwise", "categories", "--password", "pw"]).unwrap();
    assert_eq!(cli.password.as_deref(), Some("pw"));
    assert!(matches!(
        cli.command,
        Some(Command::Account(AccountCommand::Categories))
    ));

    let cli = Cli::try_parse_from(["spendwise", "--password", "pw", "register", "--name", "A"])
        .unwrap();
    assert_eq!(cli.password.as_deref(), Some("pw"));
    assert!(matches!(cli.command, Some(Command::Register { .. })));
}

#[test]
fn test_unknown_backend_rejected() {
    assert!(Cli::try_parse_from(["spendwise", "--backend", "mongo"]).is_err());
}

// ── commands ──────────────────────────────────────────────────

#[test]
fn test_register_and_duplicate() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let out = run(&mut store, &["register", "--name", "Asha"]).unwrap();
    assert!(out.starts_with("Registered asha@example.com"), "{out}");
    let err = run(&mut store, &["register", "--name", "Asha"]).unwrap_err();
    assert!(err.to_string().contains("already exists"), "{err}");
}

#[test]
fn test_requires_email() {
    let mut store = registered();
    let mut out = Vec::new();
    let no_email = Settings {
        email: None,
        ..Settings::default()
    };
    let err = as_cli(parse(&["categories"]), Some("pw".into()), &no_email, &mut store, &mut out)
        .unwrap_err();
    assert!(err.to_string().starts_with("No account selected"));
}

#[test]
fn test_wrong_password() {
    let mut store = registered();
    let mut out = Vec::new();
    let err = as_cli(
        parse(&["categories"]),
        Some("wrong".into()),
        &settings(),
        &mut store,
        &mut out,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "invalid email or password");
}

#[test]
fn test_add_and_list() {
    let mut store = registered();
    let out = run(
        &mut store,
        &["add", "2024-03-05", "food", "1,250.50", "-p", "upi", "-d", "Groceries"],
    )
    .unwrap();
    assert!(out.starts_with("Added expense "), "{out}");
    assert!(out.contains("2024-03-05 Food 1250.50"), "{out}");
    run(&mut store, &["add", "2024-03-07", "Transport", "40"]).unwrap();

    let out = run(&mut store, &["list", "--month", "2024-03"]).unwrap();
    assert!(out.contains("Groceries"), "{out}");
    assert!(out.contains("UPI"), "{out}");
    assert!(out.contains("₹1,250.50"), "{out}");
    assert!(out.contains("2 expenses, total ₹1,290.50"), "{out}");

    let out = run(&mut store, &["list", "-m", "2024-03", "-c", "transport"]).unwrap();
    assert!(out.contains("1 expenses, total ₹40.00"), "{out}");

    let out = run(&mut store, &["list", "-m", "2024-04"]).unwrap();
    assert_eq!(out, "No expenses for 2024-04\n");
}

#[test]
fn test_add_rejects_bad_input() {
    let mut store = registered();
    let err = run(&mut store, &["add", "2024-03-05", "Yachts", "10"]).unwrap_err();
    assert!(err.to_string().starts_with("Unknown category 'Yachts'"));
    let err = run(&mut store, &["add", "2024-03-05", "Food", "10", "-p", "Cheque"]).unwrap_err();
    assert!(err.to_string().contains("Card, Cash, UPI, Other"), "{err}");
    assert!(run(&mut store, &["add", "2024-03-05", "Food", "--", "-5"]).is_err());
    assert!(run(&mut store, &["add", "March 5", "Food", "5"]).is_err());
}

#[test]
fn test_delete() {
    let mut store = registered();
    let out = run(&mut store, &["add", "2024-03-05", "Food", "10"]).unwrap();
    let id = out
        .trim_start_matches("Added expense ")
        .split(':')
        .next()
        .unwrap()
        .to_string();

    let out = run(&mut store, &["delete", &id]).unwrap();
    assert_eq!(out, format!("Deleted expense {id}\n"));
    let err = run(&mut store, &["delete", &id]).unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}

#[test]
fn test_budget_set_list_delete() {
    let mut store = registered();
    run(&mut store, &["add", "2024-03-05", "Food", "300"]).unwrap();
    let out = run(&mut store, &["budget", "set", "food", "200", "-m", "2024-03"]).unwrap();
    assert_eq!(out, "Budget for Food in 2024-03 set to ₹200.00\n");

    let out = run(&mut store, &["budget", "list", "-m", "2024-03"]).unwrap();
    let line = out.lines().find(|l| l.starts_with("Food")).unwrap();
    assert!(line.contains("₹200.00"), "{line}");
    assert!(line.contains("₹300.00"), "{line}");
    assert!(line.contains("-₹100.00"), "{line}");
    assert!(line.ends_with("150%"), "{line}");

    run(&mut store, &["budget", "delete", "Food", "-m", "2024-03"]).unwrap();
    let out = run(&mut store, &["budget", "list", "-m", "2024-03"]).unwrap();
    assert_eq!(out, "No budgets for 2024-03\n");
    assert!(run(&mut store, &["budget", "delete", "Food", "-m", "2024-03"]).is_err());
}

#[test]
fn test_summary() {
    let mut store = registered();
    run(&mut store, &["add", "2024-03-02", "Food", "300"]).unwrap();
    run(&mut store, &["add", "2024-03-02", "Transport", "500"]).unwrap();
    run(&mut store, &["add", "2024-03-09", "Food", "50"]).unwrap();
    run(&mut store, &["budget", "set", "Food", "200", "-m", "2024-03"]).unwrap();

    let out = run(&mut store, &["summary", "-m", "2024-03"]).unwrap();
    assert!(out.starts_with("SpendWise: 2024-03\n"), "{out}");
    assert!(out.contains("Total spent:   ₹850.00"), "{out}");
    assert!(out.contains("Top category:  Transport (₹500.00)"), "{out}");
    assert!(out.contains("Over budget:   ₹150.00"), "{out}");
    assert!(out.contains("Expenses:      3"), "{out}");
    assert!(out.contains("2024-03-02"), "{out}");
    assert!(out.contains("2024-03-09"), "{out}");
}

#[test]
fn test_summary_of_empty_month() {
    let mut store = registered();
    let out = run(&mut store, &["summary", "-m", "2024-03"]).unwrap();
    assert!(out.contains("Total spent:   ₹0.00"), "{out}");
    assert!(out.contains("Top category:  -"), "{out}");
    assert!(!out.contains("By category"), "{out}");
}

#[test]
fn test_categories() {
    let mut store = registered();
    let out = run(&mut store, &["category", "add", "Travel"]).unwrap();
    assert_eq!(out, "Added category Travel\n");
    let out = run(&mut store, &["category", "add", "Travel"]).unwrap();
    assert_eq!(out, "Category Travel already exists\n");
    let out = run(&mut store, &["categories"]).unwrap();
    assert!(out.lines().any(|l| l == "Food"));
    assert_eq!(out.lines().last(), Some("Travel"));
}

#[test]
fn test_export_then_import() {
    let mut store = registered();
    run(&mut store, &["add", "2024-03-05", "Food", "10"]).unwrap();
    run(&mut store, &["add", "2024-04-05", "Bills", "20"]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all.csv");
    let path_str = path.to_str().unwrap();
    let out = run(&mut store, &["export", path_str]).unwrap();
    assert!(out.starts_with("Exported 2 expenses"), "{out}");

    let march = dir.path().join("march.csv");
    let out = run(&mut store, &["export", march.to_str().unwrap(), "-m", "2024-03"]).unwrap();
    assert!(out.starts_with("Exported 1 expenses"), "{out}");

    let mut fresh = registered();
    let out = run(&mut fresh, &["import", path_str]).unwrap();
    assert_eq!(out, "Imported 2 expenses\n");
    let out = run(&mut fresh, &["list", "-m", "2024-04"]).unwrap();
    assert!(out.contains("Bills"), "{out}");
}
