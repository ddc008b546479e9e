//! XLSX drawing-layer image extraction.
//!
//! The chain followed for the first worksheet is
//! `xl/workbook.xml` -> `xl/_rels/workbook.xml.rels` -> worksheet ->
//! worksheet rels -> drawing -> drawing rels -> `xl/media/*`.
//!
//! # Example
//!
//! ```no_run
//! use sheetpix::xlsx::ImageExtractor;
//!
//! let extractor = ImageExtractor::open("parts.xlsx")?;
//! println!("Sheet: {}", extractor.sheet_parts().name);
//! for anchor in extractor.anchors()? {
//!     println!("picture at row {} col {}", anchor.row, anchor.col);
//! }
//! # Ok::<(), sheetpix::Error>(())
//! ```

pub mod drawing;
mod extractor;
mod shared_strings;
pub mod workbook;
pub mod worksheet;

pub use drawing::{map_drawing_relations, parse_anchors};
pub use extractor::{ExtractOptions, ImageExtractor};
pub use shared_strings::SharedStrings;
pub use workbook::locate_first_sheet_parts;
pub use worksheet::{find_drawing_for_sheet, WorksheetScan};
