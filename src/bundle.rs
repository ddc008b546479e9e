//! Batch bundling: several workbooks into one ZIP of named images.
//!
//! The archive holds `images/<name>.<ext>` for every distinct output name
//! and a `report.csv` manifest with one row per extracted image:
//!
//! ```text
//! source_file,sheet,row,part_name,final_filename,action
//! bom.xlsx,Parts,3,Hex Bolt M6,hex_bolt_m6.png,Saved
//! ```

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::model::ExtractedImageDetail;
use crate::normalize::{detect_extension, sanitize_filename};
use serde::Serialize;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// Directory of image entries inside the bundle.
pub const IMAGES_DIR: &str = "images/";

/// Name of the manifest entry inside the bundle.
pub const REPORT_NAME: &str = "report.csv";

const REPORT_HEADER: [&str; 6] = ["source_file", "sheet", "row", "part_name", "final_filename", "action"];

/// What happened to an image in the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryAction {
    /// First image with this output name; written to the archive
    Saved,
    /// Output name already taken earlier in the batch; reported only
    Duplicate,
}

/// One manifest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRow {
    /// Workbook filename the image came from
    pub source_file: String,
    /// Worksheet title
    pub sheet: String,
    /// 1-based worksheet row
    pub row: u32,
    /// Name cell text as read from the workbook
    pub part_name: String,
    /// Output filename inside `images/`
    pub final_filename: String,
    /// Saved or Duplicate
    pub action: EntryAction,
}

/// Counters over everything added to a bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BundleSummary {
    /// Images extracted across all workbooks
    pub processed: usize,
    /// Images written under a fresh name
    pub saved: usize,
    /// Images whose name was already taken
    pub duplicate: usize,
}

#[derive(Debug)]
struct BundleEntry {
    /// Image bytes; `None` for duplicates, which are never written
    bytes: Option<Vec<u8>>,
    manifest: ManifestRow,
}

/// Collects images from several workbooks into a single ZIP bundle.
///
/// # Example
///
/// ```no_run
/// use sheetpix::{bundle::ImageBundler, Settings};
///
/// let settings = Settings::from_env();
/// let mut bundler = ImageBundler::new(&settings);
/// let data = std::fs::read("bom.xlsx")?;
/// bundler.process_workbook("bom.xlsx", &data, "B", "C")?;
/// std::fs::write("images.zip", bundler.finish()?)?;
/// # Ok::<(), sheetpix::Error>(())
/// ```
#[derive(Debug)]
pub struct ImageBundler<'a> {
    settings: &'a Settings,
    seen_names: HashSet<String>,
    entries: Vec<BundleEntry>,
    attempted: usize,
    workbooks: usize,
    summary: BundleSummary,
}

impl<'a> ImageBundler<'a> {
    /// Create an empty bundle governed by `settings`.
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            seen_names: HashSet::new(),
            entries: Vec::new(),
            attempted: 0,
            workbooks: 0,
            summary: BundleSummary::default(),
        }
    }

    /// Extract and add the images of one workbook.
    ///
    /// Returns the number of images added. Nothing is added when this fails,
    /// but the attempt still counts toward `max_files`. A workbook without
    /// images in the column fails with [`Error::NoImagesFound`].
    pub fn process_workbook(
        &mut self,
        source_name: &str,
        data: &[u8],
        image_column: &str,
        name_column: &str,
    ) -> Result<usize> {
        let index = self.attempted;
        self.attempted += 1;
        self.settings
            .check_workbook(source_name, data.len() as u64, index)?;

        let details = crate::extract_image_details(
            data,
            image_column,
            name_column,
            self.settings.max_images,
        )?;
        if details.is_empty() {
            return Err(Error::NoImagesFound);
        }

        log::debug!("{}: {} images from sheet {:?}", source_name, details.len(), details[0].sheet);

        let count = details.len();
        self.workbooks += 1;
        for detail in details {
            self.add_image(source_name, detail);
        }

        Ok(count)
    }

    /// Name one image and record it; only the first image per name keeps
    /// its bytes.
    fn add_image(&mut self, source_name: &str, detail: ExtractedImageDetail) {
        let final_name = format!(
            "{}.{}",
            sanitize_filename(&detail.name_raw),
            detect_extension(&detail.image_bytes)
        );

        let (action, bytes) = if self.seen_names.insert(final_name.clone()) {
            self.summary.saved += 1;
            (EntryAction::Saved, Some(detail.image_bytes))
        } else {
            self.summary.duplicate += 1;
            (EntryAction::Duplicate, None)
        };
        self.summary.processed += 1;

        self.entries.push(BundleEntry {
            bytes,
            manifest: ManifestRow {
                source_file: source_name.to_string(),
                sheet: detail.sheet,
                row: detail.row,
                part_name: detail.name_raw,
                final_filename: final_name,
                action,
            },
        });
    }

    /// Like [`process_workbook`](Self::process_workbook), but a workbook
    /// without images is skipped with `Ok(None)`.
    pub fn try_process_workbook(
        &mut self,
        source_name: &str,
        data: &[u8],
        image_column: &str,
        name_column: &str,
    ) -> Result<Option<usize>> {
        match self.process_workbook(source_name, data, image_column, name_column) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.is_no_images() => {
                log::warn!("{}: no images in column {}, skipped", source_name, image_column);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Counters so far.
    pub fn summary(&self) -> BundleSummary {
        self.summary
    }

    /// Number of workbooks offered to the bundle, including rejected ones.
    pub fn attempted_count(&self) -> usize {
        self.attempted
    }

    /// Number of workbooks that contributed images.
    pub fn workbook_count(&self) -> usize {
        self.workbooks
    }

    /// Manifest rows in the order images were added.
    pub fn manifest(&self) -> impl Iterator<Item = &ManifestRow> {
        self.entries.iter().map(|e| &e.manifest)
    }

    /// Render the manifest as CSV.
    pub fn report_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(REPORT_HEADER)?;
        for row in self.manifest() {
            writer.serialize(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| Error::Csv(e.to_string()))
    }

    /// Write the ZIP bundle and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let report = self.report_csv()?;

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(7));

        for entry in &self.entries {
            let Some(bytes) = &entry.bytes else {
                continue;
            };
            zip.start_file(format!("{}{}", IMAGES_DIR, entry.manifest.final_filename), options)?;
            zip.write_all(bytes)?;
        }

        zip.start_file(REPORT_NAME, options)?;
        zip.write_all(report.as_bytes())?;

        let cursor = zip.finish()?;
        log::debug!(
            "bundle finished: {} processed, {} saved, {} duplicate",
            self.summary.processed,
            self.summary.saved,
            self.summary.duplicate
        );
        Ok(cursor.into_inner())
    }
}
