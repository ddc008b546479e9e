//! Image format detection, PNG normalization, and output filenames.

use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Longest filename stem produced by [`sanitize_filename`], in characters.
pub const MAX_NAME_CHARS: usize = 80;

/// Placeholder used when a name sanitizes to nothing.
pub const DEFAULT_NAME: &str = "image";

/// Extension used when the format cannot be determined.
pub const FALLBACK_EXTENSION: &str = "png";

/// Characters that are illegal in filenames on common file systems.
const ILLEGAL_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Known encoded image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// JPEG
    Jpeg,
    /// PNG
    Png,
    /// WebP
    WebP,
    /// GIF
    Gif,
    /// TIFF
    Tiff,
    /// BMP
    Bmp,
    /// Recognized by the decoder but without a preferred extension
    Other,
}

impl ImageKind {
    fn from_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => ImageKind::Jpeg,
            ImageFormat::Png => ImageKind::Png,
            ImageFormat::WebP => ImageKind::WebP,
            ImageFormat::Gif => ImageKind::Gif,
            ImageFormat::Tiff => ImageKind::Tiff,
            ImageFormat::Bmp => ImageKind::Bmp,
            _ => ImageKind::Other,
        }
    }

    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::WebP => "webp",
            ImageKind::Gif => "gif",
            ImageKind::Tiff => "tif",
            ImageKind::Bmp => "bmp",
            ImageKind::Other => FALLBACK_EXTENSION,
        }
    }
}

/// Outcome of format detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatProbe {
    /// The bytes carry a recognized image signature
    Decoded(ImageKind),
    /// Not a format the decoder knows (EMF, WMF, garbage, ...)
    Unknown,
}

impl FormatProbe {
    /// Extension for the probed format, `png` when unknown.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatProbe::Decoded(kind) => kind.extension(),
            FormatProbe::Unknown => FALLBACK_EXTENSION,
        }
    }
}

/// Detect the encoded format of image bytes from their signature.
pub fn probe_format(bytes: &[u8]) -> FormatProbe {
    match image::guess_format(bytes) {
        Ok(format) => FormatProbe::Decoded(ImageKind::from_format(format)),
        Err(_) => FormatProbe::Unknown,
    }
}

/// File extension for image bytes; `png` when the format is unknown.
pub fn detect_extension(bytes: &[u8]) -> &'static str {
    probe_format(bytes).extension()
}

/// Whether the source stores palette indices rather than colors.
///
/// The decoder expands palettes, so this is read from the headers.
fn is_palette_indexed(bytes: &[u8]) -> bool {
    match probe_format(bytes) {
        FormatProbe::Decoded(ImageKind::Gif) => true,
        // IHDR color type sits right after the 8-byte signature, chunk
        // length and type, width, height and bit depth
        FormatProbe::Decoded(ImageKind::Png) => bytes.get(25) == Some(&3),
        // BITMAPINFOHEADER bits per pixel
        FormatProbe::Decoded(ImageKind::Bmp) => match bytes.get(28..30) {
            Some(&[lo, hi]) => u16::from_le_bytes([lo, hi]) <= 8,
            _ => false,
        },
        _ => false,
    }
}

/// Decode image bytes and re-encode them as PNG.
///
/// Sources with an alpha channel or a palette become RGBA, everything else
/// RGB.
pub fn to_png(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::DecodeFailure(e.to_string()))?;

    let converted = if img.color().has_alpha() || is_palette_indexed(bytes) {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let mut out = Cursor::new(Vec::new());
    converted
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| Error::DecodeFailure(e.to_string()))?;
    Ok(out.into_inner())
}

/// Result of [`normalize_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// PNG bytes, or the untouched input when decoding failed
    pub bytes: Vec<u8>,
    /// Extension to store the bytes under
    pub extension: &'static str,
    /// Whether the bytes were re-encoded
    pub converted: bool,
}

/// Re-encode image bytes as PNG, passing them through when they cannot be
/// decoded.
pub fn normalize_image(bytes: &[u8]) -> NormalizedImage {
    match to_png(bytes) {
        Ok(png) => NormalizedImage {
            bytes: png,
            extension: "png",
            converted: true,
        },
        Err(e) => {
            log::debug!("keeping original image bytes: {}", e);
            NormalizedImage {
                bytes: bytes.to_vec(),
                extension: FALLBACK_EXTENSION,
                converted: false,
            }
        }
    }
}

/// Turn a name cell into a filename stem.
///
/// Trims, turns spaces into underscores, drops `\ / : * ? " < > |`,
/// collapses underscore runs, lowercases, and keeps the first
/// [`MAX_NAME_CHARS`] characters. An empty result becomes `image`.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        let c = if c == ' ' { '_' } else { c };
        if ILLEGAL_CHARS.contains(&c) || (c == '_' && out.ends_with('_')) {
            continue;
        }
        out.push(c);
    }

    let lowered: String = out.to_lowercase().chars().take(MAX_NAME_CHARS).collect();
    if lowered.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        lowered
    }
}

/// Strict filename rule: every run outside `[A-Za-z0-9._-]` becomes one `_`.
pub fn strict_filename(name: &str) -> String {
    let out = replace_disallowed_runs(name.trim());
    if out.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        out
    }
}

/// Folder-safe name from a workbook filename: its stem under the strict
/// rule, trimmed of `.`, `_` and `-`. Falls back to `workbook`.
pub fn safe_folder_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned = replace_disallowed_runs(&stem);
    let trimmed = cleaned.trim_matches(|c: char| matches!(c, '.' | '_' | '-'));
    if trimmed.is_empty() {
        "workbook".to_string()
    } else {
        trimmed.to_string()
    }
}

fn replace_disallowed_runs(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}
