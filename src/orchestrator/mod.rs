//! Entry-point flows that sequence the fetcher and the tag writer.

use std::fmt;

pub mod terminal;
pub mod form;
pub mod interactive;

pub use terminal::ConsolePrompter;
pub use form::{AutoFill, FormController, FormField, Phase};
pub use interactive::{InteractiveFlow, InteractiveOptions, RunOutcome, Stage};

use crate::Result;

/// A user-facing message: console line or dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Info(String),
    Success(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Error(m) | Notice::Info(m) | Notice::Success(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Blocking question/answer surface used by the text flow
pub trait Prompter {
    /// Ask for one line of free text
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Ask a yes/no question
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Show a message
    fn notify(&mut self, notice: &Notice);
}
