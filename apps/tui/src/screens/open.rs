//! "Open" screen: path input and load action.

use std::path::Path;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::Action;

pub(crate) struct OpenScreen {
    path: String,
    editing: bool,
    /// Last load failure, shown in the alert panel.
    error: Option<String>,
}

impl OpenScreen {
    pub(crate) fn new() -> Self {
        Self {
            path: String::new(),
            editing: true,
            error: None,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    /// Load the XML file at `path`.
    ///
    /// On failure the error is kept for the alert panel and returned as a
    /// status message.
    pub(crate) fn load(&mut self, path: &str) -> Action {
        self.path = path.to_string();
        let trimmed = path.trim();
        if trimmed.is_empty() {
            self.error = None;
            return Action::Status("Enter the path of a CFDI payroll XML file.".to_string());
        }

        match nomina_extractor::load_document(Path::new(trimmed)) {
            Ok(doc) => {
                self.error = None;
                self.editing = false;
                Action::Loaded(doc)
            }
            Err(e) => {
                let msg = e.to_string();
                self.error = Some(msg.clone());
                Action::Status(format!("Error: {msg}"))
            }
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Path
                Constraint::Length(3), // Action hint
                Constraint::Min(1),    // Alert
            ])
            .split(area);

        let path_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let path_block = Block::default()
            .borders(Borders::ALL)
            .title(" CFDI payroll XML file ")
            .border_style(path_style);
        let path_text = Paragraph::new(self.path.as_str()).block(path_block);
        f.render_widget(path_text, chunks[0]);

        let hint = if self.editing {
            "Type a path · Enter to load · Esc to stop editing"
        } else {
            "Enter to edit the path"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[1]);

        if let Some(err) = &self.error {
            let alert = Paragraph::new(err.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Error ")
                        .border_style(Style::default().fg(Color::Red)),
                );
            f.render_widget(alert, chunks[2]);
        } else {
            let info = Paragraph::new(
                "Only .xml files are accepted: a CFDI 4.0 receipt with the \
                 nómina 1.2 complement and its fiscal stamp.",
            )
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Status "));
            f.render_widget(info, chunks[2]);
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        if self.editing {
            match code {
                KeyCode::Esc => self.editing = false,
                KeyCode::Enter => return Action::Load(self.path.clone()),
                KeyCode::Backspace => {
                    self.path.pop();
                }
                KeyCode::Char(c) => self.path.push(c),
                _ => {}
            }
        } else if code == KeyCode::Enter {
            self.editing = true;
        }
        Action::None
    }

    /// Forget the last path and error, ready for a new file.
    pub(crate) fn reset(&mut self) {
        self.path.clear();
        self.error = None;
        self.editing = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures/xml")
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn type_path(screen: &mut OpenScreen, path: &str) {
        for c in path.chars() {
            screen.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn enter_requests_load_of_typed_path() {
        let mut screen = OpenScreen::new();
        let path = fixture("nomina-basic.xml");
        type_path(&mut screen, &path);

        match screen.handle_key(KeyCode::Enter, KeyModifiers::NONE) {
            Action::Load(requested) => assert_eq!(requested, path),
            other => panic!("expected Load, got {other:?}"),
        }
    }

    #[test]
    fn load_parses_fixture() {
        let mut screen = OpenScreen::new();
        match screen.load(&fixture("nomina-basic.xml")) {
            Action::Loaded(doc) => assert_eq!(doc.rows.len(), 2),
            other => panic!("expected Loaded, got {other:?}"),
        }
        assert!(!screen.is_editing());
        assert!(screen.error.is_none());
    }

    #[test]
    fn non_xml_path_shows_error() {
        let mut screen = OpenScreen::new();
        let action = screen.load("/tmp/recibo.pdf");

        assert!(matches!(action, Action::Status(ref msg) if msg.starts_with("Error:")));
        assert!(screen.error.as_deref().unwrap().contains("not an XML file"));
        assert!(screen.is_editing());
    }

    #[test]
    fn backspace_and_escape() {
        let mut screen = OpenScreen::new();
        type_path(&mut screen, "ab");
        screen.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(screen.path, "a");

        screen.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert!(!screen.is_editing());
        screen.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert!(screen.is_editing());
    }

    #[test]
    fn reset_clears_error() {
        let mut screen = OpenScreen::new();
        screen.load("/tmp/recibo.pdf");
        screen.reset();
        assert!(screen.error.is_none());
        assert!(screen.path.is_empty());
    }
}
