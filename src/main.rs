mod aggregate;
mod auth;
mod config;
mod error;
mod import;
mod logging;
mod models;
mod report;
mod run;
mod store;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

fn main() -> Result<()> {
    let cli = run::Cli::parse();
    let settings = config::load(&cli.overrides())?;
    logging::init(&settings)?;
    debug!(?settings, "settings loaded");

    let mut store = store::open_store(&settings)?;

    match cli.command {
        None => run::as_tui(store.as_mut(), &settings),
        Some(command) => {
            let mut stdout = std::io::stdout().lock();
            run::as_cli(command, cli.password, &settings, store.as_mut(), &mut stdout)
        }
    }
}
