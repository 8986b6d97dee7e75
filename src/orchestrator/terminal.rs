use console::{style, Term};
use std::io::BufRead;

use super::{Notice, Prompter};
use crate::Result;

/// Prompts on the terminal, reading answers from standard input
pub struct ConsolePrompter {
    out: Term,
    err: Term,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
        }
    }

    /// One line from the terminal, or from piped standard input
    fn read_answer(&self) -> Result<String> {
        if self.out.is_term() {
            return Ok(self.out.read_line()?);
        }

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

/// `y`/`yes` and `n`/`no`, case-insensitive
fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

impl Prompter for ConsolePrompter {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.out.write_str(&format!("{} ", style(question).bold()))?;
        let line = self.read_answer()?;
        Ok(line.trim().to_string())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            let answer = self.ask(&format!("{} [y/n]", question))?;
            // End of input counts as "no"
            if answer.is_empty() {
                return Ok(false);
            }
            match parse_yes_no(&answer) {
                Some(yes) => return Ok(yes),
                None => self.out.write_line("Please answer y or n.")?,
            }
        }
    }

    fn notify(&mut self, notice: &Notice) {
        let result = match notice {
            Notice::Error(m) => self.err.write_line(&format!("{} {}", style("✗").red(), m)),
            Notice::Info(m) => self.out.write_line(m),
            Notice::Success(m) => self
                .out
                .write_line(&format!("{} {}", style("✓").green(), m)),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}
