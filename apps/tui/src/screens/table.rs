//! "Table" screen: scrollable view of the extracted rows, with export keys.

use crossterm::event::{KeyCode, KeyModifiers};
use nomina_extractor::LoadedDocument;
use nomina_shared::{ExportFormat, ExportSettings, LineKind, NominaRow, format_mxn, load_config};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use super::Action;

/// Rows skipped by PageUp/PageDown.
const PAGE: usize = 10;

const COLUMNS: [(&str, u16); 16] = [
    ("Versión", 8),
    ("Folio Fiscal", 36),
    ("Serie", 6),
    ("Folio", 8),
    ("Periodo", 23),
    ("Días", 5),
    ("Fecha pago", 10),
    ("Tipo", 10),
    ("Clave SAT", 9),
    ("Clave int.", 10),
    ("Concepto", 32),
    ("Gravado", 14),
    ("Exento", 14),
    ("Emisión", 19),
    ("Timbrado", 19),
    ("Estatus", 8),
];

pub(crate) struct TableScreen {
    doc: Option<LoadedDocument>,
    selected: usize,
}

impl TableScreen {
    pub(crate) fn new() -> Self {
        Self {
            doc: None,
            selected: 0,
        }
    }

    /// Replace the current rows with a freshly loaded document.
    pub(crate) fn set_document(&mut self, doc: LoadedDocument) {
        self.doc = Some(doc);
        self.selected = 0;
    }

    pub(crate) fn clear(&mut self) {
        self.doc = None;
        self.selected = 0;
    }

    pub(crate) fn has_document(&self) -> bool {
        self.doc.is_some()
    }

    fn row_count(&self) -> usize {
        self.doc.as_ref().map_or(0, |d| d.rows.len())
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let Some(doc) = &self.doc else {
            let empty = Paragraph::new(
                "No document loaded.\n\nUse the 'Open' tab to load a CFDI payroll XML file.",
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Rows "));
            f.render_widget(empty, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Table
                Constraint::Length(1), // Key hint
            ])
            .split(area);

        let header = Row::new(COLUMNS.iter().map(|(label, _)| Cell::from(*label)))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(1);
        let rows = doc.rows.iter().map(|row| Row::new(table_cells(row)));
        let widths = COLUMNS.iter().map(|(_, w)| Constraint::Length(*w));

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(
                        " {}: {} registro(s) encontrado(s). ",
                        doc.file_name,
                        doc.rows.len()
                    )),
            )
            .row_highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .highlight_symbol("▸ ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(table, chunks[0], &mut state);

        let hint = Paragraph::new("↑/↓ scroll · c export CSV · x export XLSX · d clear")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[1]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        let last = self.row_count().saturating_sub(1);
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = (self.selected + 1).min(last),
            KeyCode::PageUp => self.selected = self.selected.saturating_sub(PAGE),
            KeyCode::PageDown => self.selected = (self.selected + PAGE).min(last),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = last,
            KeyCode::Char('c') => return self.export(ExportFormat::Csv),
            KeyCode::Char('x') => return self.export(ExportFormat::Xlsx),
            KeyCode::Char('d') if self.doc.is_some() => return Action::Clear,
            _ => {}
        }
        Action::None
    }

    fn export(&self, format: ExportFormat) -> Action {
        match load_config() {
            Ok(config) => {
                let mut settings = ExportSettings::from(&config);
                settings.format = format;
                self.export_with(&settings)
            }
            Err(e) => Action::Status(format!("Error: {e}")),
        }
    }

    fn export_with(&self, settings: &ExportSettings) -> Action {
        let Some(doc) = &self.doc else {
            return Action::Status("Nothing to export: load a file first.".to_string());
        };

        match nomina_export::export_rows(&doc.rows, &doc.base_name, settings) {
            Ok(paths) => {
                let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                Action::Status(format!("Exported {}", names.join(", ")))
            }
            Err(e) => Action::Status(format!("Error: {e}")),
        }
    }
}

/// Badge style for the kind column.
fn kind_style(kind: LineKind) -> Style {
    match kind {
        LineKind::Perception => Style::default().fg(Color::Green),
        LineKind::Deduction => Style::default().fg(Color::LightRed),
    }
}

fn table_cells(row: &NominaRow) -> Vec<Cell<'_>> {
    let d = &row.document;
    vec![
        Cell::from(d.version.as_str()),
        Cell::from(d.fiscal_uuid.as_str()),
        Cell::from(d.series.as_str()),
        Cell::from(d.folio.as_str()),
        Cell::from(format!("{} a {}", d.period_start, d.period_end)),
        Cell::from(d.days_paid.as_str()),
        Cell::from(d.payment_date.as_str()),
        Cell::from(row.kind.label()).style(kind_style(row.kind)),
        Cell::from(row.sat_code.as_str()),
        Cell::from(row.internal_code.as_str()),
        Cell::from(row.concept.as_str()),
        Cell::from(Text::from(format_mxn(row.taxed_amount)).alignment(Alignment::Right)),
        Cell::from(Text::from(format_mxn(row.exempt_amount)).alignment(Alignment::Right)),
        Cell::from(d.issued_at.as_str()),
        Cell::from(d.stamped_at.as_str()),
        Cell::from(d.status.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn loaded() -> TableScreen {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/xml/nomina-extended.xml");
        let mut screen = TableScreen::new();
        screen.set_document(nomina_extractor::load_document(&path).unwrap());
        screen
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut screen = loaded();
        screen.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(screen.selected, 0);

        screen.handle_key(KeyCode::PageDown, KeyModifiers::NONE);
        assert_eq!(screen.selected, 4);

        screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(screen.selected, 4);

        screen.handle_key(KeyCode::Home, KeyModifiers::NONE);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn clear_key_requests_clear() {
        let mut screen = loaded();
        assert!(matches!(
            screen.handle_key(KeyCode::Char('d'), KeyModifiers::NONE),
            Action::Clear
        ));

        screen.clear();
        assert!(matches!(
            screen.handle_key(KeyCode::Char('d'), KeyModifiers::NONE),
            Action::None
        ));
    }

    #[test]
    fn export_writes_into_output_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let screen = loaded();
        let settings = ExportSettings {
            output_dir: dir.path().to_path_buf(),
            sheet_name: "Datos CFDI".into(),
            format: ExportFormat::Csv,
        };

        let action = screen.export_with(&settings);
        assert!(matches!(action, Action::Status(ref msg) if msg.starts_with("Exported")));
        assert!(dir.path().join("nomina-extended.csv").exists());
    }

    #[test]
    fn export_without_document_is_a_status() {
        let screen = TableScreen::new();
        let settings = ExportSettings {
            output_dir: std::env::temp_dir(),
            sheet_name: "Datos CFDI".into(),
            format: ExportFormat::Csv,
        };
        assert!(matches!(
            screen.export_with(&settings),
            Action::Status(ref msg) if msg.starts_with("Nothing to export")
        ));
    }

    #[test]
    fn kinds_render_in_distinct_styles() {
        assert_ne!(kind_style(LineKind::Perception), kind_style(LineKind::Deduction));

        // Select the last row so the others keep their own styles.
        let mut screen = loaded();
        screen.handle_key(KeyCode::End, KeyModifiers::NONE);
        let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(260, 12)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                screen.draw(f, area);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let colors_of = |label: &str| {
            let mut colors = Vec::new();
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    let matches = label.chars().enumerate().all(|(k, ch)| {
                        let cx = x + k as u16;
                        cx < area.right() && buffer[(cx, y)].symbol() == ch.to_string()
                    });
                    if matches {
                        colors.push(buffer[(x, y)].fg);
                    }
                }
            }
            colors
        };
        assert!(colors_of("Percepción").contains(&Color::Green));
        assert!(colors_of("Deducción").contains(&Color::LightRed));
    }

    #[test]
    fn cells_match_column_layout() {
        let screen = loaded();
        let doc = screen.doc.as_ref().unwrap();
        assert_eq!(table_cells(&doc.rows[0]).len(), COLUMNS.len());
    }
}
