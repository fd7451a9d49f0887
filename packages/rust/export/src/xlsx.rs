//! XLSX serialization.
//!
//! Produces a minimal OOXML workbook with a single worksheet: the header row
//! in bold, text values as inline strings, amounts as numeric cells, and a
//! width hint per column.

use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::Path;

use nomina_shared::{NominaError, NominaRow, Result, validate_sheet_name};
use quick_xml::escape::escape;
use tracing::{debug, instrument};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::columns::{COLUMN_COUNT, Cell, HEADERS, cells};

/// Extra characters added to each label's length for the column width hint.
const WIDTH_PADDING: usize = 5;

/// Style index of the bold header cells in `styles.xml`.
const HEADER_STYLE: u32 = 1;

/// Serialize `rows` into XLSX bytes with one worksheet named `sheet_name`.
pub fn to_xlsx_bytes(rows: &[NominaRow], sheet_name: &str) -> Result<Vec<u8>> {
    validate_sheet_name(sheet_name)?;

    let parts = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", root_rels_xml()),
        ("xl/workbook.xml", workbook_xml(sheet_name)),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml()),
        ("xl/styles.xml", styles_xml()),
        ("xl/worksheets/sheet1.xml", worksheet_xml(rows)),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in parts {
        zip.start_file(name, options)
            .map_err(|e| NominaError::Export(format!("failed to start {name}: {e}")))?;
        zip.write_all(content.as_bytes())
            .map_err(|e| NominaError::Export(format!("failed to write {name}: {e}")))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| NominaError::Export(format!("failed to finish workbook: {e}")))?;
    Ok(cursor.into_inner())
}

/// Write `rows` as an XLSX workbook to `path`.
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn write_xlsx(rows: &[NominaRow], sheet_name: &str, path: &Path) -> Result<()> {
    let bytes = to_xlsx_bytes(rows, sheet_name)?;
    std::fs::write(path, &bytes).map_err(|e| NominaError::io(path, e))?;
    debug!(bytes = bytes.len(), "wrote XLSX");
    Ok(())
}

/// Width hint for each column, in characters.
pub fn column_widths() -> [usize; COLUMN_COUNT] {
    HEADERS.map(|label| label.chars().count() + WIDTH_PADDING)
}

fn content_types_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#
        .to_string()
}

fn root_rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
        .to_string()
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
<sheet name="{}" sheetId="1" r:id="rId1"/>
</sheets>
</workbook>"#,
        escape(sheet_name)
    )
}

fn workbook_rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#
        .to_string()
}

fn styles_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border/></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>
</styleSheet>"#
        .to_string()
}

fn worksheet_xml(rows: &[NominaRow]) -> String {
    let mut xml = String::with_capacity(1024 + rows.len() * COLUMN_COUNT * 48);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);

    xml.push_str("<cols>");
    for (i, width) in column_widths().iter().enumerate() {
        let _ = write!(
            xml,
            r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#,
            n = i + 1
        );
    }
    xml.push_str("</cols>");

    xml.push_str("<sheetData>");

    xml.push_str(r#"<row r="1">"#);
    for (col, label) in HEADERS.iter().enumerate() {
        write_text_cell(&mut xml, col, 1, label, Some(HEADER_STYLE));
    }
    xml.push_str("</row>");

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx + 2;
        let _ = write!(xml, r#"<row r="{row_num}">"#);
        for (col, cell) in cells(row).iter().enumerate() {
            match cell {
                Cell::Text("") => {}
                Cell::Text(s) => write_text_cell(&mut xml, col, row_num, s, None),
                Cell::Amount(d) => {
                    let _ = write!(
                        xml,
                        r#"<c r="{}{row_num}"><v>{d}</v></c>"#,
                        column_letter(col)
                    );
                }
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData>");
    xml.push_str("</worksheet>");
    xml
}

fn write_text_cell(xml: &mut String, col: usize, row_num: usize, text: &str, style: Option<u32>) {
    let style_attr = style.map(|s| format!(r#" s="{s}""#)).unwrap_or_default();
    let _ = write!(
        xml,
        r#"<c r="{}{row_num}"{style_attr} t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        column_letter(col),
        escape(text)
    );
}

/// Convert a 0-based column index to its letter (0=A, 25=Z, 26=AA).
fn column_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;

    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }

    result
}
