//! Layered settings: built-in defaults, then `config.toml`, then
//! `SPENDWISE_*` environment variables, then command-line flags.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Backend {
    #[default]
    Sqlite,
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) backend: Backend,
    pub(crate) data_dir: PathBuf,
    /// Pre-fills the login form and is used by CLI commands.
    pub(crate) email: Option<String>,
    /// Symbol shown in front of amounts.
    pub(crate) currency: String,
    pub(crate) log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: default_data_dir(),
            email: None,
            currency: "₹".into(),
            log_level: "info".into(),
        }
    }
}

impl Settings {
    pub(crate) fn store_path(&self) -> PathBuf {
        match self.backend {
            Backend::Sqlite => self.data_dir.join("spendwise.db"),
            Backend::Document => self.data_dir.join("spendwise.json"),
        }
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join("spendwise.log")
    }
}

/// Values given on the command line. They win over every other layer.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) config_file: Option<PathBuf>,
    pub(crate) backend: Option<Backend>,
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) email: Option<String>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "spendwise", "SpendWise")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".spendwise"))
}

fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Expand a leading `~` to the home directory.
pub(crate) fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}

pub(crate) fn load(overrides: &Overrides) -> Result<Settings> {
    let mut builder = Config::builder();
    if let Some(path) = overrides.config_file.clone().or_else(default_config_file) {
        builder = builder.add_source(
            File::from(path.as_path())
                .format(FileFormat::Toml)
                .required(overrides.config_file.is_some()),
        );
    }
    builder = builder.add_source(Environment::with_prefix("SPENDWISE"));
    let mut settings: Settings = builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    if let Some(backend) = overrides.backend {
        settings.backend = backend;
    }
    if let Some(data_dir) = &overrides.data_dir {
        settings.data_dir = data_dir.clone();
    }
    if let Some(email) = &overrides.email {
        settings.email = Some(email.clone());
    }
    settings.data_dir = expand_home(&settings.data_dir);

    Ok(settings)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
