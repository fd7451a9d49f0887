//! Shared types, error model, and configuration for the CFDI payroll explorer.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`NominaError`], the unified error type
//! - Domain types ([`NominaRow`], [`DocumentFields`], [`LineKind`])
//! - Configuration ([`AppConfig`], [`ExportSettings`], config loading)
//! - [`format_mxn`] for table renderers

pub mod config;
pub mod currency;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DisplayConfig, ExportConfig, ExportFormat, ExportSettings, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_sheet_name,
};
pub use currency::format_mxn;
pub use error::{NominaError, Result};
pub use types::{DocumentFields, LineKind, NominaRow, STATUS_CURRENT};
