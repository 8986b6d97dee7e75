//! gui/state.rs
//! App state + messages.

use std::path::PathBuf;

use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::orchestrator::{AutoFill, FormController, FormField};

#[derive(Debug, Clone)]
pub enum Message {
    FieldChanged(FormField, String),
    Submit,
    FetchFinished(Result<AutoFill, String>),
    Confirm(bool),
    TagFinished(Result<PathBuf, String>),
}

/// App state: the form controller plus the fetcher its submissions run on
pub struct FormApp {
    pub(crate) form: FormController,
    pub(crate) fetcher: Fetcher,
}

impl FormApp {
    pub fn new() -> Self {
        let config = Config::load(None).unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {:#}", e);
            Config::default()
        });
        Self::with_config(&config)
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            form: FormController::new(&config.fetch),
            fetcher: Fetcher::new(&config.fetch),
        }
    }
}

impl Default for FormApp {
    fn default() -> Self {
        Self::new()
    }
}
