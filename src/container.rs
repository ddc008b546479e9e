//! ZIP container abstraction for OOXML packages.
//!
//! A `.xlsx` file is a ZIP archive of XML parts wired together by
//! relationship files (`_rels/*.rels`). This module reads parts, parses
//! relationship files, and resolves relationship targets to package paths.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path as written in the rels file (usually relative)
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

/// Collection of relationships parsed from a single .rels file.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Relationships in document order
    entries: Vec<Relationship>,
    /// Map from relationship ID to its index in `entries`
    by_id: HashMap<String, usize>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id).and_then(|&idx| self.entries.get(idx))
    }

    /// First relationship whose type URI ends with `suffix` (e.g. "/worksheet").
    pub fn first_with_type_suffix(&self, suffix: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.rel_type.ends_with(suffix))
    }

    /// Iterate relationships in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a relationship. A later entry with a duplicate ID is ignored.
    pub fn add(&mut self, rel: Relationship) {
        if self.by_id.contains_key(&rel.id) {
            return;
        }
        self.by_id.insert(rel.id.clone(), self.entries.len());
        self.entries.push(rel);
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// After UTF-16 XML is decoded into a Rust String, the declaration still
/// says encoding="UTF-16", which quick-xml would try to honour.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)));
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let content = decode_utf16(rest, u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let content = decode_utf16(rest, u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => match bytes {
            // BOM-less UTF-16: ASCII markup leaves every other byte zero
            [_, 0, _, 0, ..] => decode_utf16(bytes, u16::from_le_bytes),
            [0, _, 0, _, ..] => decode_utf16(bytes, u16::from_be_bytes),
            _ => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Path of the relationship file that belongs to `part_path`.
///
/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`;
/// the package root (`""` or `"/"`) -> `_rels/.rels`.
pub fn rels_path_for(part_path: &str) -> String {
    let part = part_path.trim_start_matches('/');
    if part.is_empty() {
        return "_rels/.rels".to_string();
    }
    match part.rsplit_once('/') {
        Some((dir, name)) => format!("{}/_rels/{}.rels", dir, name),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target to a package path.
///
/// Targets are relative to the directory of the *source* part, which is the
/// parent of the `_rels` directory holding the rels file. So for
/// `xl/worksheets/_rels/sheet1.xml.rels` the base is `xl/worksheets`.
/// Absolute targets (`/xl/media/a.png`) start from the package root.
pub fn resolve_target(rels_path: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_segments("", absolute);
    }
    let rels_dir = parent_dir(rels_path);
    let source_dir = parent_dir(rels_dir);
    normalize_segments(source_dir, target)
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Join `relative` onto `base`, collapsing `.` and `..` segments.
/// `..` never climbs above the package root.
fn normalize_segments(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// OOXML container abstraction over a ZIP archive held in memory.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sheetpix::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("parts.xlsx")?;
    /// # Ok::<(), sheetpix::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create an OOXML container from a byte vector.
    ///
    /// Bytes that are not a ZIP archive are reported as a malformed package.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)
            .map_err(|e| Error::MalformedPackage(format!("not a ZIP archive ({})", e)))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part from the archive as a string.
    ///
    /// Handles UTF-8 (with or without BOM) and UTF-16 LE/BE.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a binary part from the archive.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MalformedPackage(format!("missing part {}", path)))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().index_for_name(path).is_some()
    }

    /// List all parts in the archive.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }

    /// Read the relationships of `part_path`; empty when it has no rels file.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        Ok(self
            .read_relationships_file(&rels_path_for(part_path))?
            .unwrap_or_default())
    }

    /// Parse a rels file by its own path, or `None` when the file is absent.
    pub fn read_relationships_file(&self, rels_path: &str) -> Result<Option<Relationships>> {
        if !self.exists(rels_path) {
            return Ok(None);
        }
        let content = self.read_xml(rels_path)?;
        parse_relationships(&content).map(Some)
    }
}

/// Parse the XML of a relationships file.
pub fn parse_relationships(content: &str) -> Result<Relationships> {
    let mut rels = Relationships::new();
    if content.trim().is_empty() {
        return Ok(rels);
    }

    let mut reader = quick_xml::Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut external = false;

                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                    match attr.key.as_ref() {
                        b"Id" => id = value,
                        b"Type" => rel_type = value,
                        b"Target" => target = value,
                        b"TargetMode" => external = value.eq_ignore_ascii_case("external"),
                        _ => {}
                    }
                }

                if !id.is_empty() && !target.is_empty() {
                    rels.add(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}
