use std::env;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_RECORDS_PATH: &str = "beltworks-results.json";
pub const DEFAULT_MAX_SAVED_RESULTS: usize = 200;

/// Name written into the results lock file while a save is in progress.
pub const LOCK_OWNER: &str = "calc_web";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSettings {
    pub bind: String,
    pub records_path: PathBuf,
    pub max_saved_results: usize,
}

impl WebSettings {
    pub fn from_env() -> Result<Self> {
        // Load .env if present, but do not fail if file does not exist.
        let _ = dotenvy::dotenv();

        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("BELTWORKS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_owned());
        ensure!(!bind.trim().is_empty(), "BELTWORKS_BIND cannot be empty");

        let records_path =
            lookup("BELTWORKS_RECORDS_PATH").unwrap_or_else(|| DEFAULT_RECORDS_PATH.to_owned());
        ensure!(
            !records_path.trim().is_empty(),
            "BELTWORKS_RECORDS_PATH cannot be empty"
        );

        let max_saved_results = parse_usize_var(
            "BELTWORKS_MAX_SAVED_RESULTS",
            lookup("BELTWORKS_MAX_SAVED_RESULTS"),
            DEFAULT_MAX_SAVED_RESULTS,
        )?;
        ensure!(
            max_saved_results > 0,
            "BELTWORKS_MAX_SAVED_RESULTS must be greater than 0"
        );

        Ok(Self {
            bind: bind.trim().to_owned(),
            records_path: PathBuf::from(records_path.trim()),
            max_saved_results,
        })
    }

    /// Same settings with a different bind address (command-line override).
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }
}

fn parse_usize_var(name: &str, raw: Option<String>, default: usize) -> Result<usize> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("failed to parse {name} as an unsigned integer")),
        None => Ok(default),
    }
}
