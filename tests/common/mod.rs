//! Synthetic workbook builder shared by the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A picture placed in the drawing.
#[derive(Debug, Clone)]
pub struct Picture {
    /// Zero-based anchor row
    pub row: u32,
    /// Zero-based anchor column
    pub col: u32,
    pub bytes: Vec<u8>,
    pub one_cell: bool,
}

impl Picture {
    pub fn at(cell: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let (row, col) = sheetpix::column::parse_cell_ref(cell).expect("valid cell ref");
        Self {
            row,
            col,
            bytes: bytes.into(),
            one_cell: false,
        }
    }

    pub fn one_cell(mut self) -> Self {
        self.one_cell = true;
        self
    }
}

/// Builder for a one-sheet workbook with a picture drawing.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub sheet_name: String,
    /// (cell reference, text) pairs stored as shared strings
    pub text_cells: Vec<(String, String)>,
    /// (cell reference, raw number) pairs
    pub number_cells: Vec<(String, String)>,
    pub pictures: Vec<Picture>,
    pub sheet_part: String,
    pub sheet_target: String,
    pub sheet_rel_id: String,
    /// Drawing id written in the worksheet when it differs from the rels
    pub drawing_ref_id: Option<String>,
    pub workbook_sheet_rel_id: String,
    pub with_workbook: bool,
    pub with_drawing: bool,
    pub with_sheet_rels: bool,
    pub with_drawing_rels: bool,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            sheet_name: "Parts".to_string(),
            text_cells: Vec::new(),
            number_cells: Vec::new(),
            pictures: Vec::new(),
            sheet_part: "xl/worksheets/sheet1.xml".to_string(),
            sheet_target: "worksheets/sheet1.xml".to_string(),
            sheet_rel_id: "rId1".to_string(),
            drawing_ref_id: None,
            workbook_sheet_rel_id: "rId1".to_string(),
            with_workbook: true,
            with_drawing: true,
            with_sheet_rels: true,
            with_drawing_rels: true,
        }
    }
}

fn rels_path(part: &str) -> String {
    let (dir, name) = part.rsplit_once('/').unwrap_or(("", part));
    format!("{}/_rels/{}.rels", dir, name)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, cell: &str, value: &str) -> Self {
        self.text_cells.push((cell.to_string(), value.to_string()));
        self
    }

    pub fn number(mut self, cell: &str, value: &str) -> Self {
        self.number_cells.push((cell.to_string(), value.to_string()));
        self
    }

    pub fn picture(mut self, picture: Picture) -> Self {
        self.pictures.push(picture);
        self
    }

    fn sheet_xml(&self) -> String {
        let mut cells: Vec<(u32, u32, String)> = Vec::new();
        for (idx, (cell, _)) in self.text_cells.iter().enumerate() {
            let (row, col) = sheetpix::column::parse_cell_ref(cell).expect("valid cell ref");
            cells.push((row, col, format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, cell, idx)));
        }
        for (cell, value) in &self.number_cells {
            let (row, col) = sheetpix::column::parse_cell_ref(cell).expect("valid cell ref");
            cells.push((row, col, format!(r#"<c r="{}"><v>{}</v></c>"#, cell, value)));
        }
        cells.sort_by_key(|(row, col, _)| (*row, *col));

        let mut data = String::new();
        let mut open_row: Option<u32> = None;
        for (row, _, xml) in &cells {
            if open_row != Some(*row) {
                if open_row.is_some() {
                    data.push_str("</row>");
                }
                data.push_str(&format!(r#"<row r="{}">"#, row + 1));
                open_row = Some(*row);
            }
            data.push_str(xml);
        }
        if open_row.is_some() {
            data.push_str("</row>");
        }

        let drawing = if self.with_drawing {
            let id = self.drawing_ref_id.as_ref().unwrap_or(&self.sheet_rel_id);
            format!(r#"<drawing r:id="{}"/>"#, id)
        } else {
            String::new()
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheetData>{}</sheetData>{}
</worksheet>"#,
            data, drawing
        )
    }

    fn shared_strings_xml(&self) -> String {
        let items: String = self
            .text_cells
            .iter()
            .map(|(_, text)| format!(r#"<si><t xml:space="preserve">{}</t></si>"#, escape(text)))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#,
            self.text_cells.len(),
            items
        )
    }

    fn drawing_xml(&self) -> String {
        let mut anchors = String::new();
        for (idx, pic) in self.pictures.iter().enumerate() {
            let from = format!(
                "<xdr:from><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>",
                pic.col, pic.row
            );
            let body = format!(
                r#"<xdr:pic><xdr:nvPicPr><xdr:cNvPr id="{id}" name="Picture {id}"/><xdr:cNvPicPr/></xdr:nvPicPr><xdr:blipFill><a:blip r:embed="rId{rel}"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill><xdr:spPr/></xdr:pic><xdr:clientData/>"#,
                id = idx + 2,
                rel = idx + 1
            );
            if pic.one_cell {
                anchors.push_str(&format!(
                    r#"<xdr:oneCellAnchor>{}<xdr:ext cx="952500" cy="952500"/>{}</xdr:oneCellAnchor>"#,
                    from, body
                ));
            } else {
                anchors.push_str(&format!(
                    r#"<xdr:twoCellAnchor editAs="oneCell">{}<xdr:to><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>{}</xdr:twoCellAnchor>"#,
                    from,
                    pic.col + 1,
                    pic.row + 1,
                    body
                ));
            }
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{}</xdr:wsDr>"#,
            anchors
        )
    }

    fn drawing_rels_xml(&self) -> String {
        let rels: String = (0..self.pictures.len())
            .map(|idx| {
                format!(
                    r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image{}.png"/>"#,
                    idx + 1,
                    idx + 1
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        )
    }

    /// Build the workbook as .xlsx bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let mut put = |name: &str, data: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        };

        put(
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#,
        );
        put(
            "_rels/.rels",
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
        );

        if self.with_workbook {
            put(
                "xl/workbook.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="{}" sheetId="1" r:id="{}"/></sheets>
</workbook>"#,
                    escape(&self.sheet_name),
                    self.workbook_sheet_rel_id
                )
                .as_bytes(),
            );
        }
        put(
            "xl/_rels/workbook.xml.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="{}"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#,
                self.sheet_target
            )
            .as_bytes(),
        );

        put("xl/sharedStrings.xml", self.shared_strings_xml().as_bytes());
        put(&self.sheet_part, self.sheet_xml().as_bytes());

        if self.with_sheet_rels {
            put(
                &rels_path(&self.sheet_part),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/>
</Relationships>"#,
                    self.sheet_rel_id
                )
                .as_bytes(),
            );
        }

        put("xl/drawings/drawing1.xml", self.drawing_xml().as_bytes());
        if self.with_drawing_rels {
            put("xl/drawings/_rels/drawing1.xml.rels", self.drawing_rels_xml().as_bytes());
        }

        for (idx, pic) in self.pictures.iter().enumerate() {
            put(&format!("xl/media/image{}.png", idx + 1), &pic.bytes);
        }

        zip.finish().unwrap().into_inner()
    }
}

/// Encode a solid-color PNG.
pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Encode a solid-color JPEG.
pub fn jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

/// The BOM layout used across tests: pictures in B3, B7 and D5, names in C.
pub fn bom_fixture() -> Fixture {
    Fixture::new()
        .text("C1", "Part name")
        .text("C3", "Hex Bolt M6")
        .text("C5", "Not in column")
        .text("C7", "Washer 6mm")
        // document order deliberately not row order
        .picture(Picture::at("B7", b"IMG-B7".to_vec()))
        .picture(Picture::at("D5", b"IMG-D5".to_vec()))
        .picture(Picture::at("B3", b"IMG-B3".to_vec()))
}
