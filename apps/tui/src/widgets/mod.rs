//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Bottom status bar. Error messages are highlighted in red.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    let bg = if msg.starts_with("Error:") {
        Color::Red
    } else {
        Color::DarkGray
    };
    Paragraph::new(format!(" {msg}")).style(Style::default().bg(bg).fg(Color::White))
}
