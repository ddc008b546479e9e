//! Joining drawing anchors with the name column.

use crate::column::column_letter_to_index;
use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use crate::model::{AnchoredImage, DrawingAnchor, ExtractedImageDetail, SheetParts};
use std::path::Path;

use super::drawing::{map_drawing_relations, parse_anchors};
use super::shared_strings::SharedStrings;
use super::workbook::locate_first_sheet_parts;
use super::worksheet::{find_drawing_for_sheet, resolve_drawing_path, WorksheetScan};

const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// Which columns to read and how many images to allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Zero-based column holding the pictures
    pub image_column: u32,
    /// Zero-based column holding the names
    pub name_column: u32,
    /// Hard per-workbook cap; `None` or `Some(0)` means unlimited
    pub max_images: Option<usize>,
}

impl ExtractOptions {
    /// Build options from column letters ("B", "AA", ...).
    pub fn new(image_column: &str, name_column: &str) -> Result<Self> {
        Ok(Self {
            image_column: column_letter_to_index(image_column)?,
            name_column: column_letter_to_index(name_column)?,
            max_images: None,
        })
    }

    /// Set the hard cap on qualifying images.
    pub fn with_max_images(mut self, max_images: Option<usize>) -> Self {
        self.max_images = max_images;
        self
    }

    fn cap(&self) -> Option<usize> {
        self.max_images.filter(|&n| n > 0)
    }
}

/// Extracts the pictures of a workbook's first worksheet.
///
/// # Example
///
/// ```no_run
/// use sheetpix::xlsx::{ExtractOptions, ImageExtractor};
///
/// let extractor = ImageExtractor::open("parts.xlsx")?;
/// let options = ExtractOptions::new("B", "C")?;
/// for image in extractor.extract(&options)? {
///     println!("row {}: {}", image.row, image.name_raw);
/// }
/// # Ok::<(), sheetpix::Error>(())
/// ```
pub struct ImageExtractor {
    container: OoxmlContainer,
    sheet: SheetParts,
}

impl ImageExtractor {
    /// Open a workbook file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container)
    }

    /// Create an extractor from workbook bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    fn from_container(container: OoxmlContainer) -> Result<Self> {
        let sheet = locate_first_sheet_parts(&container)?;
        Ok(Self { container, sheet })
    }

    /// Parts of the first worksheet.
    pub fn sheet_parts(&self) -> &SheetParts {
        &self.sheet
    }

    /// Get a reference to the container.
    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// Drawing part of the first worksheet, if it has one.
    pub fn drawing_path(&self) -> Result<Option<String>> {
        find_drawing_for_sheet(&self.container, &self.sheet)
    }

    /// Raw picture anchors of the first worksheet, in document order.
    pub fn anchors(&self) -> Result<Vec<DrawingAnchor>> {
        match self.drawing_path()? {
            Some(drawing) => parse_anchors(&self.container, &drawing),
            None => Ok(Vec::new()),
        }
    }

    /// Every picture of the first worksheet joined with its media path.
    pub fn anchored_images(&self) -> Result<Vec<AnchoredImage>> {
        match self.drawing_path()? {
            Some(drawing) => self.join_anchors(&drawing),
            None => Ok(Vec::new()),
        }
    }

    /// Anchors whose relationship resolves to a media part, in document order.
    fn join_anchors(&self, drawing: &str) -> Result<Vec<AnchoredImage>> {
        let media = map_drawing_relations(&self.container, drawing)?;
        let anchors = parse_anchors(&self.container, drawing)?;

        Ok(anchors
            .into_iter()
            .filter_map(|a| {
                media.get(&a.rel_id).map(|path| AnchoredImage {
                    row: a.row,
                    col: a.col,
                    media_path: path.clone(),
                })
            })
            .collect())
    }

    /// Images in `column`, ordered by row. Same-row images keep document order.
    fn select(&self, drawing: &str, column: u32) -> Result<Vec<AnchoredImage>> {
        let mut images = self.join_anchors(drawing)?;
        images.retain(|img| img.col == column);
        images.sort_by_key(|img| img.row);
        Ok(images)
    }

    /// Scan the worksheet for its drawing and the name column, and select images.
    fn prepare(&self, options: &ExtractOptions) -> Result<Option<(WorksheetScan, Vec<AnchoredImage>)>> {
        let shared_strings = if self.container.exists(SHARED_STRINGS_PATH) {
            SharedStrings::parse(&self.container.read_xml(SHARED_STRINGS_PATH)?)?
        } else {
            SharedStrings::default()
        };
        let xml = self.container.read_xml(&self.sheet.xml_path)?;
        let scan = WorksheetScan::parse(&xml, &shared_strings, Some(options.name_column))?;

        let Some(rel_id) = scan.drawing_rel_id.as_deref() else {
            return Ok(None);
        };
        let drawing = resolve_drawing_path(&self.container, &self.sheet, rel_id)?;
        let images = self.select(&drawing, options.image_column)?;
        Ok(Some((scan, images)))
    }

    fn detail(&self, scan: &WorksheetScan, image: &AnchoredImage) -> Result<ExtractedImageDetail> {
        let row = image.row + 1;
        let name_raw = scan
            .value_at(image.row)
            .map(str::to_string)
            .unwrap_or_else(|| ExtractedImageDetail::fallback_name(row));
        Ok(ExtractedImageDetail {
            row,
            sheet: self.sheet.name.clone(),
            name_raw,
            image_bytes: self.container.read_binary(&image.media_path)?,
        })
    }

    /// Extract the images of the image column, top to bottom.
    ///
    /// Fails with [`Error::TooManyImages`] when more images qualify than the
    /// configured cap, before any image bytes are read. A sheet without a
    /// drawing yields an empty list.
    pub fn extract(&self, options: &ExtractOptions) -> Result<Vec<ExtractedImageDetail>> {
        let Some((scan, images)) = self.prepare(options)? else {
            return Ok(Vec::new());
        };

        if let Some(limit) = options.cap() {
            if images.len() > limit {
                return Err(Error::TooManyImages { limit });
            }
        }

        images.iter().map(|img| self.detail(&scan, img)).collect()
    }

    /// Extract at most `soft_limit` images without failing, plus the number
    /// that qualified in total. `None` or `Some(0)` takes everything.
    ///
    /// `options.max_images` is not consulted here.
    pub fn extract_with_total(
        &self,
        options: &ExtractOptions,
        soft_limit: Option<usize>,
    ) -> Result<(Vec<ExtractedImageDetail>, usize)> {
        let Some((scan, images)) = self.prepare(options)? else {
            return Ok((Vec::new(), 0));
        };

        let total = images.len();
        let take = soft_limit.filter(|&n| n > 0).unwrap_or(total);
        let details = images
            .iter()
            .take(take)
            .map(|img| self.detail(&scan, img))
            .collect::<Result<Vec<_>>>()?;
        Ok((details, total))
    }
}

impl std::fmt::Debug for ImageExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageExtractor")
            .field("sheet", &self.sheet)
            .finish()
    }
}
