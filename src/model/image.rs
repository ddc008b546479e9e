//! Extracted image records.

use serde::{Deserialize, Serialize};

/// One image pulled from the image column, joined with its name cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedImageDetail {
    /// 1-based worksheet row (Excel convention)
    pub row: u32,

    /// Worksheet title
    pub sheet: String,

    /// Text of the name cell, or `image_row<N>` when that cell is empty
    pub name_raw: String,

    /// Image bytes exactly as stored in the package
    #[serde(skip)]
    pub image_bytes: Vec<u8>,
}

impl ExtractedImageDetail {
    /// Name used when the name cell at `row` (1-based) is empty.
    pub fn fallback_name(row: u32) -> String {
        format!("image_row{}", row)
    }

    /// Size of the image blob in bytes.
    pub fn size(&self) -> usize {
        self.image_bytes.len()
    }
}

/// An image renamed for output, as produced by the PNG-normalizing path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedImage {
    /// Unique output filename including extension
    pub filename: String,

    /// Output bytes (PNG unless the source could not be decoded)
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl NamedImage {
    /// Save the image to a file.
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}
