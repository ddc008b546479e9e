//! Drawing part parsing: picture anchors and their media relationships.
//!
//! A worksheet drawing (`xl/drawings/drawingN.xml`) lists anchors. Picture
//! anchors look like this:
//!
//! ```xml
//! <xdr:twoCellAnchor>
//!   <xdr:from><xdr:col>1</xdr:col><xdr:colOff>0</xdr:colOff>
//!             <xdr:row>2</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
//!   <xdr:to>...</xdr:to>
//!   <xdr:pic>
//!     <xdr:blipFill><a:blip r:embed="rId1"/></xdr:blipFill>
//!   </xdr:pic>
//!   <xdr:clientData/>
//! </xdr:twoCellAnchor>
//! ```
//!
//! `oneCellAnchor` has the same `from` and `pic` children. `absoluteAnchor`
//! is not tied to a cell and is ignored, as are anchors holding charts,
//! shapes, or groups.

use crate::column::{MAX_COLUMNS, MAX_ROWS};
use crate::container::{rels_path_for, resolve_target, OoxmlContainer};
use crate::error::{Error, Result};
use crate::model::{AnchorKind, DrawingAnchor};
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

/// Parse every picture anchor in a drawing part, in document order.
pub fn parse_anchors(container: &OoxmlContainer, drawing_path: &str) -> Result<Vec<DrawingAnchor>> {
    let xml = container.read_xml(drawing_path)?;
    parse_anchors_xml(&xml)
}

/// Parse picture anchors from drawing XML, in document order.
///
/// Anchors without a picture blip, or whose `from` cell lacks a numeric row
/// or column inside the sheet grid, are skipped.
pub fn parse_anchors_xml(xml: &str) -> Result<Vec<DrawingAnchor>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut anchors = Vec::new();
    // Local names of the open elements
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<AnchorBuilder> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if let Some(builder) = current.as_mut() {
                    builder.on_element(&path, &name, &e);
                } else if let Some(kind) = anchor_kind(&name) {
                    current = Some(AnchorBuilder::new(kind, path.len()));
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                if let Some(builder) = current.as_mut() {
                    builder.on_element(&path, e.local_name().as_ref(), &e);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(builder) = current.as_mut() {
                    let text = e.unescape().unwrap_or_default();
                    builder.on_text(&path, &text);
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
                if current.as_ref().is_some_and(|b| b.depth == path.len()) {
                    anchors.extend(current.take().and_then(AnchorBuilder::finish));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(anchors)
}

fn anchor_kind(local_name: &[u8]) -> Option<AnchorKind> {
    match local_name {
        b"twoCellAnchor" => Some(AnchorKind::TwoCell),
        b"oneCellAnchor" => Some(AnchorKind::OneCell),
        _ => None,
    }
}

/// Fields of one anchor, collected while its element is open.
struct AnchorBuilder {
    kind: AnchorKind,
    /// Index of the anchor element in the open-element path
    depth: usize,
    row: Option<u32>,
    col: Option<u32>,
    rel_id: Option<String>,
}

impl AnchorBuilder {
    fn new(kind: AnchorKind, depth: usize) -> Self {
        Self {
            kind,
            depth,
            row: None,
            col: None,
            rel_id: None,
        }
    }

    /// Open elements below the anchor element itself.
    fn inner<'p>(&self, path: &'p [Vec<u8>]) -> &'p [Vec<u8>] {
        path.get(self.depth + 1..).unwrap_or(&[])
    }

    fn on_element(&mut self, path: &[Vec<u8>], name: &[u8], e: &BytesStart<'_>) {
        if name != b"blip" || self.rel_id.is_some() {
            return;
        }
        // Only a picture directly under the anchor; grouped pictures are skipped
        if let [pic, blip_fill] = self.inner(path) {
            if pic == b"pic" && blip_fill == b"blipFill" {
                self.rel_id = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.local_name().as_ref() == b"embed")
                    .map(|a| String::from_utf8_lossy(&a.value).into_owned())
                    .filter(|id| !id.is_empty());
            }
        }
    }

    fn on_text(&mut self, path: &[Vec<u8>], text: &str) {
        if let [from, field] = self.inner(path) {
            if from != b"from" {
                return;
            }
            match field.as_slice() {
                b"row" => self.row = grid_index(text, MAX_ROWS),
                b"col" => self.col = grid_index(text, MAX_COLUMNS),
                _ => {}
            }
        }
    }

    /// Anchors with a missing or off-grid cell are dropped.
    fn finish(self) -> Option<DrawingAnchor> {
        Some(DrawingAnchor {
            kind: self.kind,
            row: self.row?,
            col: self.col?,
            rel_id: self.rel_id?,
        })
    }
}

/// Zero-based grid index, `None` unless below `limit`.
fn grid_index(text: &str, limit: u32) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|&n| n < limit)
}

/// Map each relationship ID of a drawing to the media part it points at.
///
/// A drawing without a rels file yields an empty map. External targets
/// (linked pictures) are left out since they are not in the package.
pub fn map_drawing_relations(
    container: &OoxmlContainer,
    drawing_path: &str,
) -> Result<HashMap<String, String>> {
    let rels_path = rels_path_for(drawing_path);
    let Some(rels) = container.read_relationships_file(&rels_path)? else {
        return Ok(HashMap::new());
    };

    Ok(rels
        .iter()
        .filter(|r| !r.external)
        .map(|r| (r.id.clone(), resolve_target(&rels_path, &r.target)))
        .collect())
}
