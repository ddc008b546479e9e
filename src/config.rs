//! Batch processing settings.

use crate::error::{Error, Result};

/// Environment variable for the upload size ceiling in MiB.
pub const ENV_MAX_UPLOAD_MB: &str = "SHEETPIX_MAX_UPLOAD_MB";
/// Environment variable for the per-workbook image cap.
pub const ENV_MAX_IMAGES: &str = "SHEETPIX_MAX_IMAGES";
/// Environment variable for the number of workbooks per batch.
pub const ENV_MAX_FILES: &str = "SHEETPIX_MAX_FILES";

const DEFAULT_MAX_UPLOAD_MB: u64 = 20;

/// Limits applied by the batch layer before and around extraction.
///
/// Constructed once and passed by reference; the extraction core itself
/// reads no configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Largest accepted workbook, in MiB
    pub max_upload_mb: u64,

    /// Per-workbook image cap (None = unlimited)
    pub max_images: Option<usize>,

    /// Workbooks per batch (None = unlimited)
    pub max_files: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            max_images: None,
            max_files: None,
        }
    }
}

impl Settings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `SHEETPIX_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through a lookup function.
    ///
    /// Only all-digit values are honoured; `0` means unlimited for the
    /// image and file caps. Anything else keeps the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(mb) = lookup(ENV_MAX_UPLOAD_MB).and_then(|v| parse_digits(&v)) {
            settings.max_upload_mb = mb;
        }
        if let Some(n) = lookup(ENV_MAX_IMAGES).and_then(|v| parse_digits(&v)) {
            settings.max_images = limit(n);
        }
        if let Some(n) = lookup(ENV_MAX_FILES).and_then(|v| parse_digits(&v)) {
            settings.max_files = limit(n);
        }
        settings
    }

    /// Set the upload size ceiling in MiB.
    pub fn with_max_upload_mb(mut self, mb: u64) -> Self {
        self.max_upload_mb = mb;
        self
    }

    /// Set the per-workbook image cap; `Some(0)` is treated as unlimited.
    pub fn with_max_images(mut self, max: Option<usize>) -> Self {
        self.max_images = max.filter(|&n| n > 0);
        self
    }

    /// Set the workbook count ceiling; `Some(0)` is treated as unlimited.
    pub fn with_max_files(mut self, max: Option<usize>) -> Self {
        self.max_files = max.filter(|&n| n > 0);
        self
    }

    /// Upload ceiling in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Settings {
    /// Check one workbook of a batch against the caller-side limits.
    ///
    /// `index` is the zero-based position of the workbook among those
    /// attempted so far. Checks run in order: file count, `.xlsx`
    /// extension, then size.
    pub fn check_workbook(&self, source_name: &str, len: u64, index: usize) -> Result<()> {
        if let Some(max_files) = self.max_files {
            if index >= max_files {
                return Err(Error::LimitExceeded(format!(
                    "too many files, max {} per batch",
                    max_files
                )));
            }
        }

        if !source_name.to_ascii_lowercase().ends_with(".xlsx") {
            return Err(Error::UnsupportedFormat(format!(
                "{}: only .xlsx files are supported",
                source_name
            )));
        }

        if len > self.max_upload_bytes() {
            return Err(Error::LimitExceeded(format!(
                "{}: file too large, max {}MB",
                source_name, self.max_upload_mb
            )));
        }

        Ok(())
    }
}

fn parse_digits<T: std::str::FromStr>(value: &str) -> Option<T> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn limit(n: u64) -> Option<usize> {
    match n {
        0 => None,
        n => Some(usize::try_from(n).unwrap_or(usize::MAX)),
    }
}
