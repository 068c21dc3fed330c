//! Terminal styling helpers
//!
//! Colors are applied only when the stream supports them; `anstream` strips
//! anything left over when output is redirected.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream, Style};
use std::fmt::Display;

/// Success marker
pub const CHECK: &str = "✓";

/// Failure marker
pub const CROSS: &str = "✗";

/// Semantic colors for CLI output
pub trait Stylize: Display {
    /// De-emphasised text (hints, dry-run commands)
    fn muted(&self) -> String;
    /// Headings and key nouns
    fn emphasis(&self) -> String;
    /// Branch names, counts, identifiers
    fn accent(&self) -> String;
    /// Completed steps
    fn success(&self) -> String;
    /// Non-fatal problems
    fn warn(&self) -> String;
    /// Fatal problems
    fn error(&self) -> String;
}

fn paint<T: Display + ?Sized>(value: &T, style: Style) -> String {
    let text = value.to_string();
    text.if_supports_color(Stream::Stdout, |t| t.style(style))
        .to_string()
}

impl<T: Display + ?Sized> Stylize for T {
    fn muted(&self) -> String {
        paint(self, Style::new().dimmed())
    }

    fn emphasis(&self) -> String {
        paint(self, Style::new().bold())
    }

    fn accent(&self) -> String {
        paint(self, Style::new().cyan())
    }

    fn success(&self) -> String {
        paint(self, Style::new().green())
    }

    fn warn(&self) -> String {
        paint(self, Style::new().yellow())
    }

    fn error(&self) -> String {
        paint(self, Style::new().red().bold())
    }
}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Red cross
pub fn cross() -> String {
    CROSS.error()
}

/// Arrow used for list items
pub fn arrow() -> String {
    "→".muted()
}

/// Style for the fetch and push spinners
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}

/// URL rendered as a clickable link where the terminal supports it
pub fn hyperlink(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}
