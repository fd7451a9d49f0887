//! CSV and XLSX export of extracted payroll rows.
//!
//! Both formats share the column layout in [`columns`]. [`export_rows`]
//! writes `<base>.csv` and/or `<base>.xlsx` into the configured output
//! directory and returns the paths it created.

pub mod columns;
pub mod csv;
pub mod xlsx;

use std::path::PathBuf;

use nomina_shared::{ExportSettings, NominaError, NominaRow, Result, validate_sheet_name};
use tracing::{info, instrument};

pub use columns::{COLUMN_COUNT, Cell, HEADERS, cells, column_index};
pub use csv::{to_csv_bytes, to_csv_string, write_csv};
pub use xlsx::{column_widths, to_xlsx_bytes, write_xlsx};

/// Write `rows` in the formats selected by `settings`.
///
/// Fails with [`NominaError::Export`] when there is nothing to export.
#[instrument(skip(rows, settings), fields(rows = rows.len(), format = ?settings.format))]
pub fn export_rows(
    rows: &[NominaRow],
    base_name: &str,
    settings: &ExportSettings,
) -> Result<Vec<PathBuf>> {
    if rows.is_empty() {
        return Err(NominaError::Export("no rows to export".into()));
    }
    if settings.format.includes_xlsx() {
        validate_sheet_name(&settings.sheet_name)?;
    }

    std::fs::create_dir_all(&settings.output_dir)
        .map_err(|e| NominaError::io(&settings.output_dir, e))?;

    let mut written = Vec::new();

    if settings.format.includes_csv() {
        let path = settings.output_dir.join(format!("{base_name}.csv"));
        write_csv(rows, &path)?;
        written.push(path);
    }

    if settings.format.includes_xlsx() {
        let path = settings.output_dir.join(format!("{base_name}.xlsx"));
        write_xlsx(rows, &settings.sheet_name, &path)?;
        written.push(path);
    }

    info!(files = written.len(), "export complete");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomina_shared::ExportFormat;
    use std::path::Path;

    fn fixture_rows() -> Vec<NominaRow> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/xml/nomina-basic.xml");
        nomina_extractor::load_document(&path).unwrap().rows
    }

    fn settings(dir: &Path, format: ExportFormat) -> ExportSettings {
        ExportSettings {
            output_dir: dir.to_path_buf(),
            sheet_name: "Datos CFDI".into(),
            format,
        }
    }

    #[test]
    fn exports_both_formats() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rows = fixture_rows();

        let written = export_rows(&rows, "nomina-basic", &settings(dir.path(), ExportFormat::Both))
            .unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("nomina-basic.csv"),
                dir.path().join("nomina-basic.xlsx"),
            ]
        );
        let csv = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(csv.lines().count(), rows.len() + 1);
        assert!(std::fs::metadata(&written[1]).unwrap().len() > 0);
    }

    #[test]
    fn exports_single_format_into_new_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("salida/enero");

        let written = export_rows(&fixture_rows(), "recibo", &settings(&out, ExportFormat::Xlsx))
            .unwrap();

        assert_eq!(written, vec![out.join("recibo.xlsx")]);
        assert!(!out.join("recibo.csv").exists());
    }

    #[test]
    fn empty_rows_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = export_rows(&[], "vacio", &settings(dir.path(), ExportFormat::Csv)).unwrap_err();
        assert!(matches!(err, NominaError::Export(_)));
        assert!(!dir.path().join("vacio.csv").exists());
    }

    #[test]
    fn invalid_sheet_name_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut bad = settings(dir.path(), ExportFormat::Both);
        bad.sheet_name = "a/b".into();

        let err = export_rows(&fixture_rows(), "recibo", &bad).unwrap_err();
        assert!(matches!(err, NominaError::Config { .. }));
        assert!(!dir.path().join("recibo.csv").exists());
    }
}
