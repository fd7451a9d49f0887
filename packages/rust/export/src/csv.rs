//! CSV serialization.
//!
//! Comma-delimited, `\n`-separated, UTF-8 with a leading byte-order mark so
//! spreadsheet applications pick up the accented labels.

use std::borrow::Cow;
use std::path::Path;

use nomina_shared::{NominaError, NominaRow, Result};
use tracing::{debug, instrument};

use crate::columns::{HEADERS, cells};

const BOM: &str = "\u{feff}";

/// Render the header and rows as CSV text (without the byte-order mark).
pub fn to_csv_string(rows: &[NominaRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(HEADERS.join(","));

    for row in rows {
        let values: Vec<String> = cells(row)
            .iter()
            .map(|cell| escape_field(&cell.to_string()).into_owned())
            .collect();
        lines.push(values.join(","));
    }

    lines.join("\n")
}

/// CSV bytes as written to disk: BOM followed by [`to_csv_string`].
pub fn to_csv_bytes(rows: &[NominaRow]) -> Vec<u8> {
    let mut out = String::from(BOM);
    out.push_str(&to_csv_string(rows));
    out.into_bytes()
}

/// Write `rows` as CSV to `path`.
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn write_csv(rows: &[NominaRow], path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(rows);
    std::fs::write(path, &bytes).map_err(|e| NominaError::io(path, e))?;
    debug!(bytes = bytes.len(), "wrote CSV");
    Ok(())
}

/// Quote a value that contains a delimiter, a quote or a line break.
fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
