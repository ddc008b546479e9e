//! Drawing-layer placement structures.

use serde::{Deserialize, Serialize};

/// How a drawing object is pinned to the worksheet grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    /// `twoCellAnchor`: stretched between two cell corners
    TwoCell,
    /// `oneCellAnchor`: pinned to one cell with an explicit size
    OneCell,
}

/// A picture anchor read from a drawing part, before relationship lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingAnchor {
    /// Anchor element kind
    pub kind: AnchorKind,
    /// Zero-based row of the "from" cell
    pub row: u32,
    /// Zero-based column of the "from" cell
    pub col: u32,
    /// Relationship ID of the embedded blip (`r:embed`)
    pub rel_id: String,
}

/// A picture placement joined with its media part.
///
/// Only the top-left ("from") cell is kept; the bottom-right extent of a
/// two-cell anchor plays no part in column selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchoredImage {
    /// Zero-based row index
    pub row: u32,
    /// Zero-based column index
    pub col: u32,
    /// Package path of the image blob (e.g. `xl/media/image1.png`)
    pub media_path: String,
}

/// Package paths of the first worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetParts {
    /// Worksheet title from workbook.xml
    pub name: String,
    /// Worksheet part path (e.g. `xl/worksheets/sheet1.xml`)
    pub xml_path: String,
    /// Worksheet relationships path (e.g. `xl/worksheets/_rels/sheet1.xml.rels`)
    pub rels_path: String,
}
