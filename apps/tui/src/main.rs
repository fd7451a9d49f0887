//! nomina-tui: interactive viewer for CFDI payroll receipts.
//!
//! Open a payroll XML, browse its perception and deduction rows, and
//! export them to CSV/XLSX, built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Interactive viewer for CFDI payroll receipts.
#[derive(Parser)]
#[command(name = "nomina-tui", version, long_about = None)]
struct Args {
    /// CFDI payroll XML file to load at startup.
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    app::run(args.file)
}
