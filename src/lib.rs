//! # sheetpix
//!
//! Extract the pictures embedded in an Excel workbook's drawing layer and
//! name each one after a cell in the same row.
//!
//! A typical input is a bill of materials: part pictures sit in one column,
//! part names in another. sheetpix follows the OOXML relationship chain of
//! the first worksheet down to its drawing, keeps the pictures anchored in
//! the image column, orders them by row, and pairs each with the text of the
//! name column at that row.
//!
//! ## Quick Start
//!
//! ```no_run
//! let data = std::fs::read("bom.xlsx")?;
//!
//! // Raw image bytes with row, sheet and name cell
//! for image in sheetpix::extract_image_details(&data, "B", "C", None)? {
//!     println!("row {}: {} ({} bytes)", image.row, image.name_raw, image.size());
//! }
//!
//! // Unique filenames, PNG-encoded
//! for image in sheetpix::extract_png_images(&data, "B", "C", Some(50))? {
//!     image.save_to(&image.filename)?;
//! }
//! # Ok::<(), sheetpix::Error>(())
//! ```
//!
//! ## Batches
//!
//! [`bundle::ImageBundler`] combines several workbooks into one ZIP with a
//! `report.csv` manifest, applying the limits in [`Settings`].

pub mod bundle;
pub mod column;
pub mod config;
pub mod container;
pub mod error;
pub mod model;
pub mod normalize;
pub mod xlsx;

// Re-exports
pub use bundle::{BundleSummary, EntryAction, ImageBundler, ManifestRow};
pub use column::{column_letter_to_index, index_to_column_letter};
pub use config::Settings;
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use error::{Error, Result};
pub use model::{
    AnchorKind, AnchoredImage, DrawingAnchor, ExtractedImageDetail, NamedImage, SheetParts,
};
pub use normalize::{normalize_image, sanitize_filename, FormatProbe, ImageKind};
pub use xlsx::{ExtractOptions, ImageExtractor};

use std::collections::{HashMap, HashSet};

/// Extract the images anchored in `image_column` of the first worksheet,
/// each paired with the `name_column` cell of its row.
///
/// Records are ordered by row and carry the image bytes unchanged. When
/// `max_images` is a positive number and more images qualify, the call
/// fails with [`Error::TooManyImages`]. A worksheet without pictures yields
/// an empty list.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("bom.xlsx")?;
/// let images = sheetpix::extract_image_details(&data, "B", "C", Some(100))?;
/// # Ok::<(), sheetpix::Error>(())
/// ```
pub fn extract_image_details(
    data: &[u8],
    image_column: &str,
    name_column: &str,
    max_images: Option<usize>,
) -> Result<Vec<ExtractedImageDetail>> {
    let options = ExtractOptions::new(image_column, name_column)?.with_max_images(max_images);
    ImageExtractor::from_bytes(data.to_vec())?.extract(&options)
}

/// Like [`extract_image_details`] but never fails on count: returns at most
/// `soft_limit` records plus the number of images that qualified.
pub fn extract_image_details_with_total(
    data: &[u8],
    image_column: &str,
    name_column: &str,
    soft_limit: Option<usize>,
) -> Result<(Vec<ExtractedImageDetail>, usize)> {
    let options = ExtractOptions::new(image_column, name_column)?;
    ImageExtractor::from_bytes(data.to_vec())?.extract_with_total(&options, soft_limit)
}

/// Extract images as uniquely named PNG files.
///
/// Names come from [`normalize::strict_filename`]; repeats get `_1`, `_2`
/// suffixes in row order, skipping any name already emitted. Images that
/// cannot be decoded keep their original bytes.
pub fn extract_png_images(
    data: &[u8],
    image_column: &str,
    name_column: &str,
    max_images: Option<usize>,
) -> Result<Vec<NamedImage>> {
    let details = extract_image_details(data, image_column, name_column, max_images)?;

    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    Ok(details
        .into_iter()
        .map(|detail| {
            let base = normalize::strict_filename(&detail.name_raw);
            let normalized = normalize_image(&detail.image_bytes);

            // A suffixed name may already belong to another name cell
            let counter = counters.entry(base.clone()).or_insert(0);
            let mut filename = format!("{}.{}", base, normalized.extension);
            while taken.contains(&filename) {
                *counter += 1;
                filename = format!("{}_{}.{}", base, counter, normalized.extension);
            }
            taken.insert(filename.clone());

            NamedImage {
                filename,
                bytes: normalized.bytes,
            }
        })
        .collect())
}
