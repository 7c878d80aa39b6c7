//! Text-layer records and selection filtering.

use crate::geometry::{Document, Point, Rect};
use crate::result::ExtractionResult;

/// One atomic unit of a page's text layer.
///
/// `anchor` is the baseline origin of the text as produced by the document
/// parser, in document space. It is a point, not a bounding box.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRecord {
    /// The text content of this record.
    pub text: String,
    /// Baseline origin in document space.
    pub anchor: Point,
}

impl TextRecord {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            anchor: Point::new(x, y),
        }
    }
}

/// Records whose anchor lies inside `rect` (edges inclusive), in input order.
pub fn records_in_rect<'a>(
    records: &'a [TextRecord],
    rect: &Rect<Document>,
) -> impl Iterator<Item = &'a TextRecord> {
    let rect = *rect;
    records.iter().filter(move |r| rect.contains(r.anchor))
}

/// Filter a page's text records by a document-space rectangle.
///
/// Matched records keep the parser's order and are joined with a single
/// space. No match yields [`ExtractionResult::NoTextFound`], never an empty
/// string.
pub fn filter_text(records: &[TextRecord], rect: &Rect<Document>) -> ExtractionResult {
    let matched: Vec<&str> = records_in_rect(records, rect)
        .map(|r| r.text.as_str())
        .collect();

    if matched.is_empty() {
        ExtractionResult::NoTextFound
    } else {
        ExtractionResult::Text(matched.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Vec<TextRecord> {
        vec![
            TextRecord::new("Invoice", 72.0, 720.0),
            TextRecord::new("Total:", 72.0, 100.0),
            TextRecord::new("42.00", 140.0, 100.0),
            TextRecord::new("footer", 300.0, 20.0),
        ]
    }

    #[test]
    fn single_record_inside() {
        let records = vec![TextRecord::new("hello", 100.0, 100.0)];
        let result = filter_text(&records, &Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(result, ExtractionResult::Text("hello".to_string()));
    }

    #[test]
    fn no_match_yields_sentinel() {
        let records = vec![TextRecord::new("hello", 100.0, 100.0)];
        let result = filter_text(&records, &Rect::new(200.0, 200.0, 10.0, 10.0));
        assert_eq!(result, ExtractionResult::NoTextFound);
    }

    #[test]
    fn empty_page_yields_sentinel() {
        let result = filter_text(&[], &Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(result, ExtractionResult::NoTextFound);
    }

    #[test]
    fn joins_in_parser_order() {
        let result = filter_text(&page(), &Rect::new(60.0, 90.0, 100.0, 20.0));
        assert_eq!(result, ExtractionResult::Text("Total: 42.00".to_string()));
    }

    #[test]
    fn order_is_not_resorted_by_position() {
        let records = vec![
            TextRecord::new("second", 200.0, 50.0),
            TextRecord::new("first", 100.0, 50.0),
        ];
        let result = filter_text(&records, &Rect::new(0.0, 0.0, 300.0, 100.0));
        assert_eq!(result, ExtractionResult::Text("second first".to_string()));
    }

    #[test]
    fn anchor_on_edge_is_included() {
        let records = vec![
            TextRecord::new("left-top", 10.0, 10.0),
            TextRecord::new("right-bottom", 20.0, 20.0),
        ];
        let result = filter_text(&records, &Rect::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(
            result,
            ExtractionResult::Text("left-top right-bottom".to_string())
        );
    }

    #[test]
    fn enlarging_rect_never_drops_matches() {
        let records = page();
        let origin = (60.0, 90.0);
        let mut previous = 0;
        for grow in [0.0, 10.0, 50.0, 100.0, 300.0, 700.0] {
            let rect = Rect::new(origin.0, origin.1, 20.0 + grow, 20.0 + grow);
            let count = records_in_rect(&records, &rect).count();
            assert!(count >= previous, "grow={grow}: {count} < {previous}");
            previous = count;
        }
        assert_eq!(previous, 3);
    }
}
