//! Error types for the sheetpix library.

use std::io;
use thiserror::Error;

/// Result type alias for sheetpix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting images from a workbook.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A column letter is empty, longer than two letters, or not alphabetic.
    #[error("Invalid column letter: {0:?}")]
    InvalidColumn(String),

    /// A required package part or relationship is missing or unresolvable.
    #[error("Malformed workbook: {0}")]
    MalformedPackage(String),

    /// No picture is anchored in the requested image column.
    #[error("No images found in the selected column")]
    NoImagesFound,

    /// More images qualified than the configured cap allows.
    #[error("Too many images: limit is {limit}")]
    TooManyImages {
        /// The configured per-workbook cap.
        limit: usize,
    },

    /// Image bytes could not be decoded.
    #[error("Image decode failed: {0}")]
    DecodeFailure(String),

    /// The input is not an `.xlsx` workbook.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An upload-size or file-count ceiling was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// Error writing a ZIP archive.
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Error writing the CSV manifest.
    #[error("CSV error: {0}")]
    Csv(String),
}

impl Error {
    /// Whether this error means "nothing to extract" rather than a broken input.
    ///
    /// Batch callers use this to skip a workbook and keep going.
    pub fn is_no_images(&self) -> bool {
        matches!(self, Error::NoImagesFound)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Zip(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}
