//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI and encapsulates its
//! own state and rendering logic. Screens report cross-screen effects
//! back to the app as an [`Action`].

mod open;
mod table;

use std::fmt;

use nomina_extractor::LoadedDocument;

pub(crate) use open::OpenScreen;
pub(crate) use table::TableScreen;

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Open,
    Table,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Table => write!(f, "Table"),
        }
    }
}

/// What a key press asks the app to do.
#[derive(Debug)]
pub(crate) enum Action {
    None,
    /// Show a message in the status bar.
    Status(String),
    /// Parse the file at this path, replacing any rows on display.
    Load(String),
    /// A document was parsed; show it in the table.
    Loaded(LoadedDocument),
    /// Drop the current rows and go back to the Open screen.
    Clear,
}
