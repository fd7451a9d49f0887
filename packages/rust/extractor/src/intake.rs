//! File intake: load an XML file from disk and extract its rows.

use std::path::Path;

use nomina_shared::{NominaError, NominaRow, Result};
use tracing::{info, instrument};

use crate::extract_rows;

/// Base name used for exports when the source has no usable file name.
const FALLBACK_BASE_NAME: &str = "cfdi-nomina";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A successfully loaded document and its rows.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Source file name, e.g. `recibo-enero.xml`.
    pub file_name: String,
    /// File name without `.xml`, used for `<base>.csv` / `<base>.xlsx`.
    pub base_name: String,
    pub rows: Vec<NominaRow>,
}

/// Read an `.xml` file as UTF-8 text.
///
/// Paths without an `.xml` extension are rejected with
/// [`NominaError::InvalidFile`]. I/O failures and non-UTF-8 content are
/// [`NominaError::UnreadableInput`]. A leading byte-order mark is dropped.
pub fn read_xml_file(path: &Path) -> Result<String> {
    let is_xml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    if !is_xml {
        return Err(NominaError::InvalidFile {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| NominaError::unreadable(path, e.to_string()))?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes).to_vec();

    String::from_utf8(bytes).map_err(|e| NominaError::unreadable(path, e.to_string()))
}

/// The export base name for a source path: its file name minus `.xml`.
pub fn export_base_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let base = match file_name.len().checked_sub(4) {
        Some(cut) if file_name.is_char_boundary(cut) && file_name[cut..].eq_ignore_ascii_case(".xml") => {
            &file_name[..cut]
        }
        _ => file_name.as_str(),
    };

    if base.trim().is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        base.to_string()
    }
}

/// Read and extract a CFDI payroll file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_document(path: &Path) -> Result<LoadedDocument> {
    let xml = read_xml_file(path)?;
    let rows = extract_rows(&xml)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(file = %file_name, rows = rows.len(), "loaded CFDI payroll document");

    Ok(LoadedDocument {
        base_name: export_base_name(path),
        file_name,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/xml")
            .join(name)
    }

    #[test]
    fn base_name_strips_xml_extension() {
        assert_eq!(export_base_name(Path::new("/tmp/recibo-enero.xml")), "recibo-enero");
        assert_eq!(export_base_name(Path::new("RECIBO.XML")), "RECIBO");
        assert_eq!(export_base_name(Path::new("nómina.2024.xml")), "nómina.2024");
        assert_eq!(export_base_name(Path::new(".xml")), "cfdi-nomina");
        assert_eq!(export_base_name(Path::new("/")), "cfdi-nomina");
    }

    #[test]
    fn rejects_non_xml_paths() {
        let err = read_xml_file(Path::new("/tmp/recibo.pdf")).unwrap_err();
        assert!(matches!(err, NominaError::InvalidFile { .. }));

        let err = read_xml_file(Path::new("/tmp/sin-extension")).unwrap_err();
        assert!(matches!(err, NominaError::InvalidFile { .. }));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = read_xml_file(Path::new("/definitely/not/here/recibo.xml")).unwrap_err();
        assert!(matches!(err, NominaError::UnreadableInput { .. }));
    }

    #[test]
    fn non_utf8_is_unreadable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("latin1.xml");
        std::fs::write(&path, b"<r a=\"N\xf3mina\"/>").expect("write");

        let err = read_xml_file(&path).unwrap_err();
        assert!(matches!(err, NominaError::UnreadableInput { .. }));
    }

    #[test]
    fn bom_is_stripped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bom.xml");
        std::fs::write(&path, b"\xEF\xBB\xBF<r/>").expect("write");

        assert_eq!(read_xml_file(&path).unwrap(), "<r/>");
    }

    #[test]
    fn load_fixture_document() {
        let doc = load_document(&fixture_path("nomina-extended.xml")).unwrap();
        assert_eq!(doc.file_name, "nomina-extended.xml");
        assert_eq!(doc.base_name, "nomina-extended");
        assert_eq!(doc.rows.len(), 5);
    }

    #[test]
    fn load_propagates_extraction_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roto.xml");
        std::fs::write(&path, "<cfdi:Comprobante").expect("write");

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, NominaError::InvalidXml { .. }));
    }
}
