//! Styled terminal output.

use std::fmt::Display;

use console::{Term, style};

/// Writes to stdout. Write failures (closed pipe) are ignored.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn line(&self, line: &str) {
        drop(self.term.write_line(line));
    }

    pub fn success(&self, message: impl Display) {
        self.line(&format!("{} {}", style("✓").green().bold(), message));
    }

    pub fn error(&self, message: impl Display) {
        self.line(&format!("{} {}", style("✗").red().bold(), message));
    }

    pub fn warning(&self, message: impl Display) {
        self.line(&format!("{} {}", style("⚠").yellow().bold(), message));
    }

    pub fn print(&self, message: impl Display) {
        self.line(&message.to_string());
    }

    pub fn newline(&self) {
        self.line("");
    }

    pub fn header(&self, message: impl Display) {
        self.line(&style(message).bold().cyan().to_string());
    }

    pub fn dim(&self, message: impl Display) {
        self.line(&style(message).dim().to_string());
    }

    /// One validation message under its field path.
    pub fn field_error(&self, field: impl Display, message: impl Display) {
        self.line(&format!(
            "  {} {}: {}",
            style("✗").red(),
            style(field).bold(),
            message
        ));
    }

    pub fn total(&self, label: impl Display, count: usize) {
        self.line(&format!(
            "\n{}: {}",
            style(label).bold(),
            style(format!("{count} user(s)")).cyan()
        ));
    }
}
