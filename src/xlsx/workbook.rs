//! Workbook-level navigation: finding the first worksheet's parts.

use crate::container::{rels_path_for, resolve_target, OoxmlContainer};
use crate::error::{Error, Result};
use crate::model::SheetParts;
use quick_xml::events::Event;

const WORKBOOK_PATH: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";

/// Sheet entry from workbook.xml.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetEntry {
    name: String,
    rel_id: Option<String>,
}

/// Locate the XML part and rels path of the first worksheet.
///
/// The first `<sheet>` of `xl/workbook.xml` is resolved through
/// `xl/_rels/workbook.xml.rels`: by exact relationship ID first, then by the
/// first relationship whose type ends in `/worksheet`.
pub fn locate_first_sheet_parts(container: &OoxmlContainer) -> Result<SheetParts> {
    if !container.exists(WORKBOOK_PATH) {
        return Err(Error::MalformedPackage(format!("missing {}", WORKBOOK_PATH)));
    }
    let rels = container
        .read_relationships_file(WORKBOOK_RELS_PATH)?
        .ok_or_else(|| Error::MalformedPackage(format!("missing {}", WORKBOOK_RELS_PATH)))?;

    let sheet = parse_first_sheet(&container.read_xml(WORKBOOK_PATH)?)?
        .ok_or_else(|| Error::MalformedPackage("no worksheets found in workbook".to_string()))?;
    let rel_id = sheet
        .rel_id
        .ok_or_else(|| Error::MalformedPackage("first sheet has no relationship id".to_string()))?;

    let target = rels
        .get(&rel_id)
        .filter(|r| !r.external)
        .or_else(|| rels.first_with_type_suffix("/worksheet"))
        .map(|r| r.target.as_str())
        .ok_or_else(|| {
            Error::MalformedPackage(format!("could not resolve first sheet target {}", rel_id))
        })?;

    let xml_path = resolve_target(WORKBOOK_RELS_PATH, target);
    let rels_path = rels_path_for(&xml_path);
    Ok(SheetParts {
        name: sheet.name,
        xml_path,
        rels_path,
    })
}

/// Find the first `<sheet>` element in workbook.xml.
fn parse_first_sheet(xml: &str) -> Result<Option<SheetEntry>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"sheet" => {
                let mut name = String::new();
                let mut rel_id = None;

                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                    // r:id is the only attribute with local name "id"
                    match attr.key.local_name().as_ref() {
                        b"name" => name = value,
                        b"id" if !value.is_empty() => rel_id = Some(value),
                        _ => {}
                    }
                }

                return Ok(Some(SheetEntry { name, rel_id }));
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
}
