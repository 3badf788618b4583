//! Operator-facing output.
//!
//! Color-coded one-line messages on stdout, separate from `tracing`
//! diagnostics: cyan for notices, green for copies, red for removals and
//! failures. Colors are dropped when stdout is not a terminal or `NO_COLOR`
//! is set.

use std::fmt::Display;
use std::path::Path;

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Prints sync progress for the operator.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
}

impl Console {
    /// Console with color detection based on the environment.
    pub fn detect() -> Self {
        Self {
            color: !Self::should_disable_colors(),
        }
    }

    /// Console that never emits ANSI escapes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Whether colored output should be disabled.
    pub fn should_disable_colors() -> bool {
        std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal()
    }

    pub fn notice(&self, message: impl Display) {
        self.print(Tone::Notice, message.to_string());
    }

    pub fn skipped(&self, path: &Path) {
        self.print(Tone::Notice, format!("Skipping: {}", path.display()));
    }

    pub fn copied(&self, rel: &Path, container: &str, target: &str) {
        self.print(
            Tone::Success,
            format!("Copied: {} to {container}:{target}", rel.display()),
        );
    }

    pub fn removed(&self, target: &str) {
        self.print(Tone::Removal, format!("Removed: {target}"));
    }

    /// Report a failed action for `rel`, naming the cause.
    pub fn failure(&self, rel: &Path, what: &str, cause: impl Display) {
        self.print(
            Tone::Failure,
            format!("{}: {what}: {cause}", rel.display()),
        );
    }

    pub fn error(&self, message: impl Display) {
        self.print(Tone::Failure, format!("error: {message}"));
    }

    /// Render `message` as a fatal error line without printing it.
    pub fn fatal_line(&self, message: impl Display) -> String {
        self.paint(Tone::Failure, message.to_string())
    }

    fn print(&self, tone: Tone, line: String) {
        println!("{}", self.paint(tone, line));
    }

    fn paint(&self, tone: Tone, line: String) -> String {
        if !self.color {
            return line;
        }
        match tone {
            Tone::Notice => line.cyan().to_string(),
            Tone::Success => line.green().to_string(),
            Tone::Removal | Tone::Failure => line.red().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Notice,
    Success,
    Removal,
    Failure,
}
