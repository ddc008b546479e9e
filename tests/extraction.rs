//! End-to-end extraction over synthetic workbooks.

mod common;

use common::{bom_fixture, jpeg, png, Fixture, Picture};
use sheetpix::{
    extract_image_details, extract_image_details_with_total, extract_png_images, AnchorKind,
    Error, ExtractOptions, ImageExtractor,
};

#[test]
fn test_bom_rows_names_and_bytes() {
    let data = bom_fixture().build();
    let images = extract_image_details(&data, "B", "C", None).unwrap();

    assert_eq!(images.len(), 2);

    assert_eq!(images[0].row, 3);
    assert_eq!(images[0].sheet, "Parts");
    assert_eq!(images[0].name_raw, "Hex Bolt M6");
    assert_eq!(images[0].image_bytes, b"IMG-B3");

    assert_eq!(images[1].row, 7);
    assert_eq!(images[1].name_raw, "Washer 6mm");
    assert_eq!(images[1].image_bytes, b"IMG-B7");
}

#[test]
fn test_other_column_selects_other_images() {
    let data = bom_fixture().build();
    let images = extract_image_details(&data, "D", "C", None).unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].row, 5);
    assert_eq!(images[0].name_raw, "Not in column");
    assert_eq!(images[0].image_bytes, b"IMG-D5");
}

#[test]
fn test_lowercase_columns() {
    let data = bom_fixture().build();
    let upper = extract_image_details(&data, "B", "C", None).unwrap();
    let lower = extract_image_details(&data, "b", "c", None).unwrap();
    assert_eq!(upper, lower);
}

#[test]
fn test_empty_name_cell_uses_row_fallback() {
    let data = Fixture::new()
        .text("C3", "Hex Bolt M6")
        .picture(Picture::at("B3", b"one".to_vec()))
        .picture(Picture::at("B7", b"two".to_vec()))
        .build();

    let images = extract_image_details(&data, "B", "C", None).unwrap();
    assert_eq!(images[0].name_raw, "Hex Bolt M6");
    assert_eq!(images[1].name_raw, "image_row7");
}

#[test]
fn test_numeric_name_cell() {
    let data = Fixture::new()
        .number("C2", "1042")
        .number("C4", "2.5")
        .picture(Picture::at("B2", b"a".to_vec()))
        .picture(Picture::at("B4", b"b".to_vec()))
        .build();

    let names: Vec<String> = extract_image_details(&data, "B", "C", None)
        .unwrap()
        .into_iter()
        .map(|d| d.name_raw)
        .collect();
    assert_eq!(names, vec!["1042", "2.5"]);
}

#[test]
fn test_cap_fails_when_exceeded() {
    let data = Fixture::new()
        .picture(Picture::at("B2", b"a".to_vec()))
        .picture(Picture::at("B3", b"b".to_vec()))
        .picture(Picture::at("B4", b"c".to_vec()))
        .build();

    let err = extract_image_details(&data, "B", "C", Some(2)).unwrap_err();
    assert!(matches!(err, Error::TooManyImages { limit: 2 }));

    assert_eq!(extract_image_details(&data, "B", "C", Some(3)).unwrap().len(), 3);
    assert_eq!(extract_image_details(&data, "B", "C", Some(0)).unwrap().len(), 3);
}

#[test]
fn test_cap_counts_only_image_column() {
    // Two images in B and one in D: a cap of 2 holds for column B
    let data = bom_fixture().build();
    assert_eq!(extract_image_details(&data, "B", "C", Some(2)).unwrap().len(), 2);
}

#[test]
fn test_extraction_is_repeatable() {
    let data = bom_fixture().build();
    let first = extract_image_details(&data, "B", "C", None).unwrap();
    let second = extract_image_details(&data, "B", "C", None).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|d| &d.image_bytes).collect::<Vec<_>>(),
        second.iter().map(|d| &d.image_bytes).collect::<Vec<_>>()
    );
}

#[test]
fn test_same_row_keeps_document_order() {
    let data = Fixture::new()
        .text("C4", "Bracket")
        .picture(Picture::at("B4", b"first".to_vec()))
        .picture(Picture::at("B2", b"top".to_vec()))
        .picture(Picture::at("B4", b"second".to_vec()))
        .build();

    let bytes: Vec<Vec<u8>> = extract_image_details(&data, "B", "C", None)
        .unwrap()
        .into_iter()
        .map(|d| d.image_bytes)
        .collect();
    assert_eq!(bytes, vec![b"top".to_vec(), b"first".to_vec(), b"second".to_vec()]);
}

#[test]
fn test_one_cell_anchors() {
    let data = Fixture::new()
        .text("C6", "Spring")
        .picture(Picture::at("B6", b"spring".to_vec()).one_cell())
        .build();

    let extractor = ImageExtractor::from_bytes(data).unwrap();
    let anchors = extractor.anchors().unwrap();
    assert_eq!(anchors.len(), 1);
    assert_eq!(anchors[0].kind, AnchorKind::OneCell);

    let options = ExtractOptions::new("B", "C").unwrap();
    let images = extractor.extract(&options).unwrap();
    assert_eq!(images[0].row, 6);
    assert_eq!(images[0].name_raw, "Spring");
}

#[test]
fn test_no_drawing_yields_empty() {
    let mut fixture = bom_fixture();
    fixture.with_drawing = false;
    let data = fixture.build();

    assert!(extract_image_details(&data, "B", "C", None).unwrap().is_empty());
    let extractor = ImageExtractor::from_bytes(data).unwrap();
    assert_eq!(extractor.drawing_path().unwrap(), None);
    assert!(extractor.anchors().unwrap().is_empty());
}

#[test]
fn test_drawing_without_rels_yields_empty() {
    let mut fixture = bom_fixture();
    fixture.with_drawing_rels = false;
    let data = fixture.build();

    assert!(extract_image_details(&data, "B", "C", None).unwrap().is_empty());
}

#[test]
fn test_no_images_in_column_yields_empty() {
    let data = bom_fixture().build();
    assert!(extract_image_details(&data, "A", "C", None).unwrap().is_empty());
}

#[test]
fn test_drawing_without_sheet_rels_is_malformed() {
    let mut fixture = bom_fixture();
    fixture.with_sheet_rels = false;
    let data = fixture.build();

    let err = extract_image_details(&data, "B", "C", None).unwrap_err();
    assert!(matches!(err, Error::MalformedPackage(_)));
}

#[test]
fn test_drawing_rel_id_mismatch_is_malformed() {
    let mut fixture = bom_fixture();
    fixture.sheet_rel_id = "rId5".to_string();
    assert_eq!(extract_image_details(&fixture.build(), "B", "C", None).unwrap().len(), 2);

    fixture.drawing_ref_id = Some("rId6".to_string());
    let err = extract_image_details(&fixture.build(), "B", "C", None).unwrap_err();
    assert!(matches!(err, Error::MalformedPackage(_)));
}

#[test]
fn test_missing_workbook_is_malformed() {
    let mut fixture = bom_fixture();
    fixture.with_workbook = false;
    let err = extract_image_details(&fixture.build(), "B", "C", None).unwrap_err();
    assert!(matches!(err, Error::MalformedPackage(_)));
}

#[test]
fn test_not_a_zip_is_malformed() {
    let err = extract_image_details(b"plain text, not a workbook", "B", "C", None).unwrap_err();
    assert!(matches!(err, Error::MalformedPackage(_)));
}

#[test]
fn test_invalid_column_checked_first() {
    let err = extract_image_details(b"not even a zip", "B1", "C", None).unwrap_err();
    assert!(matches!(err, Error::InvalidColumn(_)));

    let data = bom_fixture().build();
    for bad in ["", "ABC", "1", "B-"] {
        let err = extract_image_details(&data, "B", bad, None).unwrap_err();
        assert!(matches!(err, Error::InvalidColumn(_)), "{:?} accepted", bad);
    }
}

#[test]
fn test_sheet_rel_fallback_by_type() {
    let mut fixture = bom_fixture();
    fixture.workbook_sheet_rel_id = "rId42".to_string();
    let images = extract_image_details(&fixture.build(), "B", "C", None).unwrap();
    assert_eq!(images.len(), 2);
}

#[test]
fn test_absolute_sheet_target_and_custom_path() {
    let mut fixture = bom_fixture();
    fixture.sheet_part = "xl/worksheets/parts.xml".to_string();
    fixture.sheet_target = "/xl/worksheets/parts.xml".to_string();
    let data = fixture.build();

    let extractor = ImageExtractor::from_bytes(data.clone()).unwrap();
    assert_eq!(extractor.sheet_parts().xml_path, "xl/worksheets/parts.xml");
    assert_eq!(extractor.sheet_parts().rels_path, "xl/worksheets/_rels/parts.xml.rels");
    assert_eq!(
        extractor.drawing_path().unwrap().as_deref(),
        Some("xl/drawings/drawing1.xml")
    );

    let images = extract_image_details(&data, "B", "C", None).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].name_raw, "Hex Bolt M6");
}

#[test]
fn test_anchored_images_resolve_media() {
    let extractor = ImageExtractor::from_bytes(bom_fixture().build()).unwrap();
    let images = extractor.anchored_images().unwrap();

    assert_eq!(images.len(), 3);
    // Document order, not row order
    assert_eq!((images[0].row, images[0].col), (6, 1));
    assert_eq!(images[0].media_path, "xl/media/image1.png");
    assert_eq!((images[2].row, images[2].col), (2, 1));
    assert_eq!(images[2].media_path, "xl/media/image3.png");
}

#[test]
fn test_soft_limit_reports_total() {
    let data = Fixture::new()
        .picture(Picture::at("B2", b"a".to_vec()))
        .picture(Picture::at("B3", b"b".to_vec()))
        .picture(Picture::at("B4", b"c".to_vec()))
        .build();

    let (images, total) = extract_image_details_with_total(&data, "B", "C", Some(2)).unwrap();
    assert_eq!(total, 3);
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].row, 2);
    assert_eq!(images[1].row, 3);

    let (images, total) = extract_image_details_with_total(&data, "B", "C", None).unwrap();
    assert_eq!((images.len(), total), (3, 3));
}

#[test]
fn test_png_variant_unique_names() {
    let data = Fixture::new()
        .text("C2", "Hex Bolt")
        .text("C3", "Hex Bolt")
        .text("C4", "Hex Bolt")
        .picture(Picture::at("B2", png(4, 4, [255, 0, 0, 255])))
        .picture(Picture::at("B3", jpeg(4, 4, [0, 255, 0])))
        .picture(Picture::at("B4", b"not an image".to_vec()))
        .build();

    let images = extract_png_images(&data, "B", "C", None).unwrap();
    let names: Vec<&str> = images.iter().map(|i| i.filename.as_str()).collect();
    assert_eq!(names, vec!["Hex_Bolt.png", "Hex_Bolt_1.png", "Hex_Bolt_2.png"]);

    // Decodable images come out as PNG; the rest pass through
    assert!(images[0].bytes.starts_with(b"\x89PNG"));
    assert!(images[1].bytes.starts_with(b"\x89PNG"));
    assert_eq!(images[2].bytes, b"not an image");
}

#[test]
fn test_png_variant_respects_cap() {
    let data = bom_fixture().build();
    let err = extract_png_images(&data, "B", "C", Some(1)).unwrap_err();
    assert!(matches!(err, Error::TooManyImages { limit: 1 }));
}

#[test]
fn test_png_variant_suffix_never_reuses_a_name() {
    let data = Fixture::new()
        .text("C2", "a")
        .text("C3", "a")
        .text("C4", "a_1")
        .picture(Picture::at("B2", b"x".to_vec()))
        .picture(Picture::at("B3", b"y".to_vec()))
        .picture(Picture::at("B4", b"z".to_vec()))
        .build();

    let images = extract_png_images(&data, "B", "C", None).unwrap();
    let names: Vec<&str> = images.iter().map(|i| i.filename.as_str()).collect();
    assert_eq!(names, vec!["a.png", "a_1.png", "a_1_1.png"]);
}

#[test]
fn test_anchor_beyond_sheet_grid_is_ignored() {
    let data = Fixture::new()
        .text("C3", "Hex Bolt M6")
        .picture(Picture::at("B3", b"ok".to_vec()))
        .picture(Picture {
            row: u32::MAX,
            col: 1,
            bytes: b"far".to_vec(),
            one_cell: true,
        })
        .build();

    let images = extract_image_details(&data, "B", "C", None).unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].row, 3);
    assert_eq!(images[0].image_bytes, b"ok");
}
