//! Error types for the CFDI payroll explorer.
//!
//! Library crates use [`NominaError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all extraction, intake and export operations.
#[derive(Debug, thiserror::Error)]
pub enum NominaError {
    /// The document is not well-formed XML.
    #[error("invalid XML: {message}")]
    InvalidXml { message: String },

    /// One of the required CFDI elements is absent.
    #[error("invalid CFDI: required element '{0}' not found")]
    MissingElement(&'static str),

    /// The payroll complement has neither perceptions nor deductions.
    #[error("no perceptions or deductions found in the CFDI document")]
    NoLineItems,

    /// The source file could not be loaded or decoded.
    #[error("could not read {path:?}: {message}")]
    UnreadableInput { path: PathBuf, message: String },

    /// File intake rejected a path that is not an XML document.
    #[error("not an XML file: {path:?}")]
    InvalidFile { path: PathBuf },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// CSV/XLSX serialization error.
    #[error("export error: {0}")]
    Export(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NominaError>;

impl NominaError {
    /// Create an invalid-XML error from any displayable message.
    pub fn invalid_xml(msg: impl Into<String>) -> Self {
        Self::InvalidXml {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an unreadable-input error for the given path.
    pub fn unreadable(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::UnreadableInput {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = NominaError::MissingElement("TimbreFiscalDigital");
        assert_eq!(
            err.to_string(),
            "invalid CFDI: required element 'TimbreFiscalDigital' not found"
        );

        let err = NominaError::invalid_xml("unexpected end of input");
        assert!(err.to_string().contains("unexpected end of input"));

        let err = NominaError::unreadable("/tmp/nomina.xml", "stream did not contain valid UTF-8");
        assert!(err.to_string().contains("nomina.xml"));
    }
}
