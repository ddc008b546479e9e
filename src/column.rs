//! Spreadsheet column letters and cell references.

use crate::error::{Error, Result};

/// Rows in a worksheet (`1..=1048576`).
pub const MAX_ROWS: u32 = 1_048_576;

/// Columns in a worksheet (`A..=XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// Longest column letter accepted from callers ("ZZ").
const MAX_COLUMN_LETTERS: usize = 2;

/// Convert a column letter ("A", "Z", "AA", "bz") to a zero-based index.
///
/// The letters are read as a bijective base-26 numeral (A=1), so
/// `"A" -> 0`, `"Z" -> 25`, `"AA" -> 26`. Surrounding whitespace is ignored
/// and case does not matter.
///
/// # Example
///
/// ```
/// use sheetpix::column::column_letter_to_index;
///
/// assert_eq!(column_letter_to_index("B")?, 1);
/// assert_eq!(column_letter_to_index("AZ")?, 51);
/// # Ok::<(), sheetpix::Error>(())
/// ```
pub fn column_letter_to_index(letter: &str) -> Result<u32> {
    let trimmed = letter.trim();
    if trimmed.is_empty()
        || trimmed.len() > MAX_COLUMN_LETTERS
        || !trimmed.bytes().all(|b| b.is_ascii_alphabetic())
    {
        return Err(Error::InvalidColumn(letter.to_string()));
    }

    let value = trimmed.bytes().fold(0u32, |acc, b| {
        acc * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1
    });
    Ok(value - 1)
}

/// Convert a zero-based column index back to its letter form.
pub fn index_to_column_letter(index: u32) -> String {
    let mut n = u64::from(index) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Parse a cell reference like "C7" into zero-based `(row, col)`.
///
/// `$` markers are skipped. Returns `None` unless both a column and a row
/// part are present.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for b in cell_ref.trim().bytes() {
        match b {
            b'$' => continue,
            b'A'..=b'Z' | b'a'..=b'z' if !saw_row => {
                col = col
                    .checked_mul(26)?
                    .checked_add(u32::from(b.to_ascii_uppercase() - b'A') + 1)?;
                saw_col = true;
            }
            b'0'..=b'9' => {
                row = row.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
                saw_row = true;
            }
            _ => return None,
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}
