//! Core TUI application state and event loop.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use crate::screens::{Action, OpenScreen, ScreenId, TableScreen};
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Available screens.
    pub screens: Vec<ScreenId>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    pub open: OpenScreen,
    pub table: TableScreen,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            active_tab: 0,
            screens: vec![ScreenId::Open, ScreenId::Table],
            should_quit: false,
            status: "Ready, press ? for help".to_string(),
            show_help: false,
            open: OpenScreen::new(),
            table: TableScreen::new(),
        }
    }

    fn current(&self) -> ScreenId {
        self.screens[self.active_tab]
    }

    fn is_editing(&self) -> bool {
        self.current() == ScreenId::Open && self.open.is_editing()
    }

    fn select(&mut self, id: ScreenId) {
        if let Some(idx) = self.screens.iter().position(|s| *s == id) {
            self.active_tab = idx;
        }
    }

    /// Load a file, dropping whatever the table showed before.
    pub(crate) fn open_path(&mut self, path: &str) {
        self.table.clear();
        let action = self.open.load(path);
        self.apply(action);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Status(msg) => self.status = msg,
            Action::Load(path) => self.open_path(&path),
            Action::Loaded(doc) => {
                self.status = format!(
                    "{}: {} registro(s) encontrado(s).",
                    doc.file_name,
                    doc.rows.len()
                );
                self.table.set_document(doc);
                self.select(ScreenId::Table);
            }
            Action::Clear => {
                self.table.clear();
                self.open.reset();
                self.select(ScreenId::Open);
                self.status = "Cleared".to_string();
            }
        }
    }
}

/// Entry point: sets up terminal, runs event loop, restores terminal.
pub(crate) fn run(initial: Option<PathBuf>) -> Result<()> {
    let mut app = App::new();
    if let Some(path) = initial {
        app.open_path(&path.to_string_lossy());
    }

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if !app.is_editing() => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        KeyCode::Char(c @ '1'..='2') if !app.is_editing() => {
            let idx = (c as usize) - ('1' as usize);
            if idx < app.screens.len() {
                app.active_tab = idx;
                app.status = format!("{}", app.screens[idx]);
            }
            return;
        }
        KeyCode::Tab if !app.is_editing() => {
            app.active_tab = (app.active_tab + 1) % app.screens.len();
            app.status = format!("{}", app.screens[app.active_tab]);
            return;
        }
        KeyCode::BackTab if !app.is_editing() => {
            app.active_tab = if app.active_tab == 0 {
                app.screens.len() - 1
            } else {
                app.active_tab - 1
            };
            app.status = format!("{}", app.screens[app.active_tab]);
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    let action = match app.current() {
        ScreenId::Open => app.open.handle_key(code, modifiers),
        ScreenId::Table => app.table.handle_key(code, modifiers),
    };
    app.apply(action);
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let tab_titles: Vec<Line> = app
        .screens
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" CFDI Nómina "))
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    match app.current() {
        ScreenId::Open => app.open.draw(f, chunks[1]),
        ScreenId::Table => app.table.draw(f, chunks[1]),
    }

    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-2          Switch to screen"),
        Line::from("  Tab/S-Tab    Next/previous screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Open:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Enter        Load the file / edit the path"),
        Line::from("  Esc          Stop editing"),
        Line::from(""),
        Line::from("Table:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓ PgUp/PgDn Scroll rows"),
        Line::from("  c            Export CSV"),
        Line::from("  x            Export XLSX"),
        Line::from("  d            Clear and open another file"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (press any key to close) ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
