//! nomina CLI: inspect and export CFDI payroll receipts.
//!
//! Reads a CFDI 4.0 XML with the payroll complement, flattens its
//! perceptions and deductions into rows, and prints or exports them as
//! CSV/XLSX.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
