//! End-to-end tests: real PDFs built with lopdf, through selection,
//! transforms, text filtering, rendering, cropping and export.

mod common;

use common::{first_page_size, multi_page_pdf, pdf_with_content};
use pdfsnip::{
    DirectorySink, Document, DocumentSource, ExportError, ExtractionResult, MemorySink,
    NO_TEXT_FOUND, Pdf, Point, Rect, Session, Size, SnipError, Stage, to_document_space,
};

fn pdf_with_record_at_100_100() -> Vec<u8> {
    pdf_with_content(612, 792, b"BT /F1 12 Tf 100 100 Td (Subtotal) Tj ET")
}

// --- Text path ---

#[test]
fn record_inside_document_rect_is_returned() {
    let pdf = Pdf::open(&pdf_with_record_at_100_100()).unwrap();
    let rect: Rect<Document> = Rect::new(50.0, 50.0, 100.0, 100.0);
    let result = pdf.extract_text(0, &rect).unwrap();
    assert_eq!(result, ExtractionResult::Text("Subtotal".into()));
}

#[test]
fn rect_without_records_is_no_text_found() {
    let pdf = Pdf::open(&pdf_with_record_at_100_100()).unwrap();
    let rect: Rect<Document> = Rect::new(200.0, 200.0, 10.0, 10.0);
    let result = pdf.extract_text(0, &rect).unwrap();
    assert_eq!(result, ExtractionResult::NoTextFound);
    assert_eq!(result.display_text(), Some(NO_TEXT_FOUND));
}

#[test]
fn records_join_with_single_space_in_content_order() {
    let content = b"BT /F1 12 Tf 60 60 Td (Total:) Tj ET BT /F1 12 Tf 120 60 Td (42.00) Tj ET";
    let pdf = Pdf::open(&pdf_with_content(612, 792, content)).unwrap();
    let result = pdf
        .extract_text(0, &Rect::new(0.0, 0.0, 200.0, 100.0))
        .unwrap();
    assert_eq!(result.text(), Some("Total: 42.00"));
}

#[test]
fn zero_area_document_rect_is_rejected() {
    let pdf = Pdf::open(&pdf_with_record_at_100_100()).unwrap();
    let rect: Rect<Document> = Rect::new(100.0, 100.0, 0.0, 0.0);
    assert_eq!(pdf.extract_text(0, &rect), Err(SnipError::EmptyRegion));
}

#[test]
fn half_size_container_maps_to_document_space() {
    let rect = Rect::from_corners(Point::new(100.0, 100.0), Point::new(150.0, 150.0));
    let doc = to_document_space(rect, Size::new(600.0, 800.0), Size::new(1200.0, 1600.0)).unwrap();
    assert!(doc.approx_eq(&Rect::new(200.0, 200.0, 100.0, 100.0), 1e-9));
}

#[test]
fn session_drag_on_large_page_finds_text() {
    // Document top-left (250, 250) is bottom-left y = 1600 - 250 = 1350.
    let bytes = pdf_with_content(1200, 1600, b"BT /F1 12 Tf 250 1350 Td (Found) Tj ET");
    let mut session: Session = Session::default();
    session.load_bytes(&bytes).unwrap();
    session.set_container(Size::new(600.0, 800.0));

    session.pointer_down(Point::new(100.0, 100.0));
    session.pointer_move(Point::new(150.0, 150.0));
    let rect = session.pointer_up().unwrap();

    let result = session.extract_text(rect).unwrap();
    assert_eq!(result.text(), Some("Found"));
    assert_eq!(session.status(), Some("Found"));
}

#[test]
fn text_on_second_page_needs_page_change() {
    let bytes = multi_page_pdf(&[
        b"BT /F1 12 Tf 100 700 Td (first) Tj ET",
        b"BT /F1 12 Tf 100 700 Td (second) Tj ET",
    ]);
    let mut session: Session = Session::default();
    session.load_bytes(&bytes).unwrap();
    session.set_container(Size::new(612.0, 792.0));
    assert_eq!(session.page_count(), 2);

    let rect = Rect::new(50.0, 50.0, 200.0, 100.0);
    assert_eq!(session.extract_text(rect).unwrap().text(), Some("first"));

    session.next_page();
    assert_eq!(session.page(), 1);
    assert_eq!(session.extract_text(rect).unwrap().text(), Some("second"));
}

// --- Image path ---

#[test]
fn letter_page_crop_yields_53_point_pdf() {
    let bytes = pdf_with_content(612, 792, b"0 0 0 rg 0 700 200 92 re f");
    let mut session: Session = Session::default();
    session.load_bytes(&bytes).unwrap();
    let mut sink = MemorySink::new();

    let saved = session
        .export_crop(Rect::new(40.0, 40.0, 20.0, 20.0), &mut sink)
        .unwrap();

    assert_eq!(saved.artifact.filename, "cropped_hd.pdf");
    assert_eq!(saved.artifact.mime_type, "application/pdf");
    assert_eq!(first_page_size(&saved.artifact.bytes), (53.0, 53.0));

    let image = session
        .last_result()
        .and_then(ExtractionResult::image)
        .unwrap();
    assert_eq!((image.width(), image.height()), (53, 53));
    // The crop lies inside the filled band at the top of the page.
    let px = image.bitmap().get_pixel(26, 26);
    assert!(px[0] < 64 && px[1] < 64 && px[2] < 64, "expected dark pixel, got {px:?}");
}

#[test]
fn text_and_crop_cover_the_same_region_with_a_set_container() {
    // 300x400 page shown at half size. Display (25, 25, 50, 50) is document
    // (50, 50, 100, 100) top-left, which is filled black and holds a record.
    let content = b"0 0 0 rg 50 250 100 100 re f BT /F1 12 Tf 100 300 Td (Mark) Tj ET";
    let bytes = pdf_with_content(300, 400, content);
    let mut session: Session = Session::default();
    session.load_bytes(&bytes).unwrap();
    session.set_container(Size::new(150.0, 200.0));
    let rect = Rect::new(25.0, 25.0, 50.0, 50.0);

    assert_eq!(session.extract_text(rect).unwrap().text(), Some("Mark"));

    let mut sink = MemorySink::new();
    let saved = session.export_crop(rect, &mut sink).unwrap();
    // 100 document units at raster scale 4.
    assert_eq!(first_page_size(&saved.artifact.bytes), (400.0, 400.0));
    let image = session
        .last_result()
        .and_then(ExtractionResult::image)
        .unwrap();
    assert_eq!((image.width(), image.height()), (400, 400));
    let px = image.bitmap().get_pixel(200, 200);
    assert!(px[0] < 64, "expected the filled square, got {px:?}");
}

#[test]
fn crop_of_blank_area_is_white() {
    let bytes = pdf_with_content(612, 792, b"0 0 0 rg 0 700 200 92 re f");
    let pdf = Pdf::open(&bytes).unwrap();
    // Display (300, 600) at ratio 4/1.5 is raster (800, 1600): well below the band.
    let image = pdf.crop(0, &Rect::new(800.0, 1600.0, 40.0, 40.0), 4.0).unwrap();
    assert_eq!((image.width(), image.height()), (40, 40));
    assert_eq!(image.bitmap().get_pixel(20, 20).0, [255, 255, 255, 255]);
}

#[test]
fn zero_area_selection_never_reaches_sink() {
    let bytes = pdf_with_content(612, 792, b"");
    let mut session: Session = Session::default();
    session.load_bytes(&bytes).unwrap();
    let mut sink = MemorySink::new();

    let err = session
        .export_crop(Rect::new(40.0, 40.0, 0.0, 0.0), &mut sink)
        .unwrap_err();
    assert_eq!(err.stage, Stage::Crop);
    assert!(matches!(err.source, ExportError::Snip(SnipError::EmptyRegion)));
    assert!(sink.artifacts().is_empty());
    assert_eq!(session.status(), Some("Error cropping PDF."));
}

#[test]
fn off_page_selection_never_reaches_sink() {
    let bytes = pdf_with_content(612, 792, b"");
    let mut session: Session = Session::default();
    session.load_bytes(&bytes).unwrap();
    let mut sink = MemorySink::new();

    assert!(
        session
            .export_crop(Rect::new(2000.0, 2000.0, 50.0, 50.0), &mut sink)
            .is_err()
    );
    assert!(sink.artifacts().is_empty());
}

#[test]
fn directory_sink_writes_crop_and_text() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = pdf_with_content(612, 792, b"BT /F1 12 Tf 100 700 Td (Header) Tj ET");
    let mut session: Session = Session::default();
    session.load_bytes(&bytes).unwrap();
    session.set_container(Size::new(612.0, 792.0));
    let mut sink = DirectorySink::new(dir.path());

    let saved = session
        .export_crop(Rect::new(50.0, 50.0, 100.0, 100.0), &mut sink)
        .unwrap();
    assert_eq!(saved.path, dir.path().join("cropped_hd.pdf"));
    let on_disk = std::fs::read(&saved.path).unwrap();
    assert!(on_disk.starts_with(b"%PDF-"));
    // Reopening the artifact gives a one-page document.
    assert_eq!(Pdf::open(&on_disk).unwrap().page_count(), 1);

    // The crop replaced any text result, so there is nothing to export yet.
    let err = session.export_text(&mut sink).unwrap_err();
    assert!(matches!(err.source, ExportError::NothingToExport));

    session.extract_text(Rect::new(50.0, 50.0, 200.0, 100.0)).unwrap();
    let saved = session.export_text(&mut sink).unwrap();
    assert_eq!(std::fs::read(saved.path).unwrap(), b"Header");
}

// --- Input handling ---

#[test]
fn non_pdf_upload_is_rejected() {
    let mut session: Session = Session::default();
    let err = session.load_bytes(b"GIF89a not a pdf").unwrap_err();
    assert_eq!(err.stage, Stage::Load);
    assert!(matches!(err.source, SnipError::InputRejected(_)));
    assert_eq!(err.user_message(), "Please upload a valid PDF file.");
    assert_eq!(session.status(), Some("Please upload a valid PDF file."));
    assert!(session.source().is_none());
}

#[test]
fn rejected_upload_keeps_previous_document() {
    let mut session: Session = Session::default();
    session.load_bytes(&pdf_with_record_at_100_100()).unwrap();
    assert!(session.load_bytes(b"plain text").is_err());
    assert_eq!(session.page_count(), 1);
}

#[test]
fn load_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.pdf");
    std::fs::write(&path, pdf_with_record_at_100_100()).unwrap();

    let mut session: Session = Session::default();
    session.load_file(&path).unwrap();
    let size = session.source().unwrap().page_size(0).unwrap();
    assert_eq!(size, Size::new(612.0, 792.0));
}

#[test]
fn missing_file_is_load_error() {
    let mut session: Session = Session::default();
    let err = session.load_file("/nonexistent/upload.pdf").unwrap_err();
    assert_eq!(err.stage, Stage::Load);
    assert!(matches!(err.source, SnipError::IoError(_)));
}
