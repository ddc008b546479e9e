//! Worksheet scanning: the drawing reference and the name column.

use crate::column::parse_cell_ref;
use crate::container::{resolve_target, OoxmlContainer};
use crate::error::{Error, Result};
use crate::model::SheetParts;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

use super::shared_strings::SharedStrings;

/// What a single pass over a worksheet part yields.
#[derive(Debug, Clone, Default)]
pub struct WorksheetScan {
    /// Relationship ID of the `<drawing>` element, if the sheet has one
    pub drawing_rel_id: Option<String>,
    /// Non-empty cell text of the scanned column, keyed by zero-based row
    column_values: HashMap<u32, String>,
}

impl WorksheetScan {
    /// Scan a worksheet, collecting cell text for `column` (zero-based).
    ///
    /// Pass `None` to look only for the drawing reference.
    pub fn parse(xml: &str, shared_strings: &SharedStrings, column: Option<u32>) -> Result<Self> {
        let mut scan = WorksheetScan::default();
        let mut reader = quick_xml::Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut next_row: u32 = 0;
        let mut current_row: u32 = 0;
        let mut next_col: u32 = 0;

        let mut cell: Option<CellBuilder> = None;
        let mut in_value = false;
        let mut in_inline = false;
        let mut in_phonetic = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        current_row = row_number(&e).unwrap_or(next_row);
                        next_row = current_row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let (row, col, cell_type) = cell_position(&e, current_row, next_col);
                        next_col = col + 1;
                        if column == Some(col) {
                            cell = Some(CellBuilder {
                                row,
                                cell_type,
                                text: String::new(),
                            });
                        }
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"is" if cell.is_some() => in_inline = true,
                    b"rPh" if in_inline => in_phonetic = true,
                    b"t" if in_inline && !in_phonetic => in_value = true,
                    b"drawing" => scan.drawing_rel_id = drawing_rel_id(&e),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        current_row = row_number(&e).unwrap_or(next_row);
                        next_row = current_row + 1;
                    }
                    b"c" => {
                        let (_, col, _) = cell_position(&e, current_row, next_col);
                        next_col = col + 1;
                    }
                    b"drawing" => scan.drawing_rel_id = drawing_rel_id(&e),
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value {
                        if let Some(ref mut c) = cell {
                            let text = e.unescape().unwrap_or_default();
                            c.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(c) = cell.take() {
                            let row = c.row;
                            if let Some(value) = c.resolve(shared_strings) {
                                scan.column_values.insert(row, value);
                            }
                        }
                        in_value = false;
                        in_inline = false;
                    }
                    b"v" | b"t" => in_value = false,
                    b"is" => in_inline = false,
                    b"rPh" => in_phonetic = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(scan)
    }

    /// Cell text of the scanned column at a zero-based row.
    pub fn value_at(&self, row: u32) -> Option<&str> {
        self.column_values.get(&row).map(|s| s.as_str())
    }
}

/// Cell being collected from the scanned column.
struct CellBuilder {
    row: u32,
    cell_type: Option<String>,
    text: String,
}

impl CellBuilder {
    /// Render the cached value the way the workbook shows it as text.
    ///
    /// Returns `None` for empty cells.
    fn resolve(self, shared_strings: &SharedStrings) -> Option<String> {
        let value = match self.cell_type.as_deref() {
            Some("s") => match self.text.trim().parse::<usize>() {
                Ok(idx) => shared_strings.get(idx).unwrap_or_default().to_string(),
                Err(_) => self.text,
            },
            Some("b") => match self.text.trim() {
                "" => String::new(),
                "1" | "true" => "True".to_string(),
                _ => "False".to_string(),
            },
            Some("str") | Some("inlineStr") | Some("e") | Some("d") => self.text,
            _ => format_number(&self.text),
        };

        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Format a numeric cell: integers of any width without leading zeros,
/// floats in shortest round-trip form with a trailing `.0` when integral.
/// Floats outside `1e-4 <= |x| < 1e16` use exponent notation with a signed
/// two-digit minimum exponent (`1.5e-05`, `1e+16`).
fn format_number(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if !raw.contains(['.', 'e', 'E']) {
        if let Some(int) = format_integer(raw) {
            return int;
        }
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => format_float(f),
        _ => raw.to_string(),
    }
}

/// Integer text without leading zeros, or `None` if it is not an integer.
fn format_integer(raw: &str) -> Option<String> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    Some(match (negative, digits.is_empty()) {
        (_, true) => "0".to_string(),
        (true, false) => format!("-{}", digits),
        (false, false) => digits.to_string(),
    })
}

fn format_float(f: f64) -> String {
    // Shortest round-trip digits, e.g. "1.5e-5"
    let sci = format!("{:e}", f);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if f == 0.0 || (-4..16).contains(&exponent) {
        let fixed = f.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Zero-based row index from `<row r="N">`.
fn row_number(e: &BytesStart<'_>) -> Option<u32> {
    attr_value(e, b"r")
        .and_then(|r| r.trim().parse::<u32>().ok())
        .and_then(|r| r.checked_sub(1))
}

/// Position and type of a `<c>` element; positional when `r` is absent.
fn cell_position(e: &BytesStart<'_>, current_row: u32, next_col: u32) -> (u32, u32, Option<String>) {
    let mut position = None;
    let mut cell_type = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => position = parse_cell_ref(&String::from_utf8_lossy(&attr.value)),
            b"t" => cell_type = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            _ => {}
        }
    }
    let (row, col) = position.unwrap_or((current_row, next_col));
    (row, col, cell_type)
}

fn drawing_rel_id(e: &BytesStart<'_>) -> Option<String> {
    attr_value(e, b"id").filter(|id| !id.is_empty())
}

/// Resolve a worksheet's drawing relationship to the drawing part path.
///
/// Fails when the relationship is missing: a `<drawing>` element promises a
/// drawing part.
pub fn resolve_drawing_path(
    container: &OoxmlContainer,
    sheet: &SheetParts,
    rel_id: &str,
) -> Result<String> {
    let rels = container
        .read_relationships_file(&sheet.rels_path)?
        .ok_or_else(|| {
            Error::MalformedPackage(format!(
                "worksheet {} references drawing {} but has no relationships",
                sheet.xml_path, rel_id
            ))
        })?;
    let rel = rels
        .get(rel_id)
        .filter(|r| !r.external)
        .ok_or_else(|| {
            Error::MalformedPackage(format!(
                "drawing relationship {} not found in {}",
                rel_id, sheet.rels_path
            ))
        })?;
    Ok(resolve_target(&sheet.rels_path, &rel.target))
}

/// Drawing part path for a worksheet, or `None` when it has no drawing.
pub fn find_drawing_for_sheet(
    container: &OoxmlContainer,
    sheet: &SheetParts,
) -> Result<Option<String>> {
    let xml = container.read_xml(&sheet.xml_path)?;
    let scan = WorksheetScan::parse(&xml, &SharedStrings::default(), None)?;
    match scan.drawing_rel_id {
        Some(rel_id) => resolve_drawing_path(container, sheet, &rel_id).map(Some),
        None => Ok(None),
    }
}
