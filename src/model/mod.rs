//! Data model for extracted images.
//!
//! Drawing anchors are what the drawing XML says; anchored images are
//! anchors joined with their media part; extracted details are the records
//! handed back to callers.

mod anchor;
mod image;

pub use anchor::*;
pub use image::*;
