//! CLI command definitions, routing, and tracing setup.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use nomina_extractor::LoadedDocument;
use nomina_shared::{
    AppConfig, ExportFormat, ExportSettings, LineKind, NominaRow, format_mxn, init_config,
    load_config,
};
use rust_decimal::Decimal;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// nomina: flatten CFDI payroll receipts into tables.
#[derive(Parser)]
#[command(
    name = "nomina",
    version,
    about = "Inspect CFDI 4.0 payroll receipts and export them to CSV/XLSX.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the perception and deduction rows of a receipt.
    Show {
        /// CFDI payroll XML file.
        file: PathBuf,

        /// Print rows as a JSON array instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Export the rows of a receipt to CSV and/or XLSX.
    Export {
        /// CFDI payroll XML file.
        file: PathBuf,

        /// Output format: csv, xlsx, or both (defaults to config).
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Output directory (defaults to config).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Base file name (defaults to the XML file name without `.xml`).
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "nomina=info",
        1 => "nomina=debug",
        _ => "nomina=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Show { file, json } => cmd_show(file, json).await,
        Command::Export {
            file,
            format,
            out,
            name,
        } => cmd_export(file, format, out, name).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Read and extract a file off the async runtime.
async fn load(file: PathBuf) -> Result<LoadedDocument> {
    let doc = tokio::task::spawn_blocking(move || nomina_extractor::load_document(&file)).await??;
    Ok(doc)
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_show(file: PathBuf, json: bool) -> Result<()> {
    let config = load_config()?;
    let doc = load(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc.rows)?);
    } else {
        print!("{}", render_table(&doc, config.display.concept_width));
    }
    Ok(())
}

async fn cmd_export(
    file: PathBuf,
    format: Option<ExportFormat>,
    out: Option<PathBuf>,
    name: Option<String>,
) -> Result<()> {
    let config = load_config()?;
    let settings = resolve_settings(&config, format, out);
    let doc = load(file).await?;

    let base_name = match name {
        Some(name) if !name.trim().is_empty() => name,
        Some(_) => return Err(eyre!("--name must not be empty")),
        None => doc.base_name.clone(),
    };

    let rows = doc.rows;
    let written = tokio::task::spawn_blocking(move || {
        nomina_export::export_rows(&rows, &base_name, &settings)
    })
    .await??;

    info!(files = written.len(), "export finished");
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Merge CLI overrides onto the configured export settings.
fn resolve_settings(
    config: &AppConfig,
    format: Option<ExportFormat>,
    out: Option<PathBuf>,
) -> ExportSettings {
    let mut settings = ExportSettings::from(config);
    if let Some(format) = format {
        settings.format = format;
    }
    if let Some(out) = out {
        settings.output_dir = out;
    }
    settings
}

/// Status line shown under every table.
fn record_count(count: usize) -> String {
    format!("{count} registro(s) encontrado(s).")
}

/// Shorten `text` to at most `width` characters, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn totals(rows: &[NominaRow]) -> (Decimal, Decimal) {
    rows.iter().fold((Decimal::ZERO, Decimal::ZERO), |(p, d), row| match row.kind {
        LineKind::Perception => (p + row.taxed_amount + row.exempt_amount, d),
        LineKind::Deduction => (p, d + row.taxed_amount),
    })
}

/// Render a document as a plain-text table.
fn render_table(doc: &LoadedDocument, concept_width: usize) -> String {
    const HEADERS: [&str; 6] = ["Tipo", "Clave SAT", "Clave interna", "Concepto", "Gravado", "Exento"];

    let mut out = String::new();

    if let Some(first) = doc.rows.first() {
        let d = &first.document;
        let _ = writeln!(out, "Archivo:   {}", doc.file_name);
        let _ = writeln!(out, "UUID:      {}", d.fiscal_uuid);
        if !d.employee_name.is_empty() {
            let _ = writeln!(out, "Empleado:  {} ({})", d.employee_name, d.rfc);
        }
        let _ = writeln!(
            out,
            "Periodo:   {} a {} ({} días), pago {}",
            d.period_start, d.period_end, d.days_paid, d.payment_date
        );
        let _ = writeln!(out);
    }

    let body: Vec<[String; 6]> = doc
        .rows
        .iter()
        .map(|row| {
            [
                row.kind.label().to_string(),
                row.sat_code.clone(),
                row.internal_code.clone(),
                truncate(&row.concept, concept_width),
                format_mxn(row.taxed_amount),
                format_mxn(row.exempt_amount),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| {
        let mut s = String::new();
        for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
            if i > 0 {
                s.push_str("  ");
            }
            // Amounts are right-aligned.
            let pad = width - cell.chars().count();
            if i >= 4 {
                s.push_str(&" ".repeat(pad));
                s.push_str(cell);
            } else {
                s.push_str(cell);
                s.push_str(&" ".repeat(pad));
            }
        }
        s.trim_end().to_string()
    };

    let _ = writeln!(out, "{}", line(&HEADERS));
    let _ = writeln!(out, "{}", line(&widths.map(|w| "-".repeat(w)).each_ref().map(String::as_str)));
    for cells in &body {
        let _ = writeln!(out, "{}", line(&cells.each_ref().map(String::as_str)));
    }

    let (perceptions, deductions) = totals(&doc.rows);
    let _ = writeln!(out);
    let _ = writeln!(out, "Total percepciones: {}", format_mxn(perceptions));
    let _ = writeln!(out, "Total deducciones:  {}", format_mxn(deductions));
    let _ = writeln!(out, "{}", record_count(doc.rows.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    fn fixture(name: &str) -> LoadedDocument {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures/xml")
            .join(name);
        nomina_extractor::load_document(&path).expect("fixture loads")
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_export_flags() {
        let cli = Cli::try_parse_from([
            "nomina", "-vv", "export", "recibo.xml", "--format", "xlsx", "--out", "salida",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Export {
                file, format, out, name,
            } => {
                assert_eq!(file, PathBuf::from("recibo.xml"));
                assert_eq!(format, Some(ExportFormat::Xlsx));
                assert_eq!(out, Some(PathBuf::from("salida")));
                assert!(name.is_none());
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["nomina", "export", "r.xml", "--format", "pdf"]).is_err());
    }

    #[test]
    fn overrides_apply_on_top_of_config() {
        let config = AppConfig::default();
        let settings = resolve_settings(&config, None, None);
        assert_eq!(settings.format, ExportFormat::Both);
        assert_eq!(settings.sheet_name, "Datos CFDI");

        let settings = resolve_settings(&config, Some(ExportFormat::Csv), Some("out".into()));
        assert_eq!(settings.format, ExportFormat::Csv);
        assert_eq!(settings.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn truncates_long_concepts() {
        assert_eq!(truncate("ISR", 10), "ISR");
        assert_eq!(truncate("Sueldos, Salarios", 8), "Sueldos…");
        assert_eq!(truncate("Días", 4), "Días");
    }

    #[test]
    fn record_count_wording() {
        assert_eq!(record_count(1), "1 registro(s) encontrado(s).");
        assert_eq!(record_count(5), "5 registro(s) encontrado(s).");
    }

    #[test]
    fn table_lists_rows_and_totals() {
        let doc = fixture("nomina-basic.xml");
        let table = render_table(&doc, 32);

        assert!(table.contains("0A1B2C3D-0000-4000-8000-00000000BA51"));
        assert!(table.contains("Percepción"));
        assert!(table.contains("$1,500.00"));
        assert!(table.contains("$300.50"));
        assert!(table.contains("Total percepciones: $1,500.00"));
        assert!(table.contains("Total deducciones:  $300.50"));
        assert!(table.trim_end().ends_with("2 registro(s) encontrado(s)."));
    }

    #[tokio::test]
    async fn export_command_writes_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/xml/nomina-basic.xml");
        let config = AppConfig::default();
        let settings = resolve_settings(&config, Some(ExportFormat::Csv), Some(dir.path().into()));

        let doc = load(file).await.unwrap();
        let written = nomina_export::export_rows(&doc.rows, &doc.base_name, &settings).unwrap();
        assert_eq!(written, vec![dir.path().join("nomina-basic.csv")]);
    }
}
