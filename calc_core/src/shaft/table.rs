//! # Segment Table
//!
//! Row model for the editable segment table. Each row exposes the two
//! editable numeric fields of one segment (pre-filled to one decimal) and a
//! removal control. Field commits arrive as raw text and go through
//! [`parse_field_value`] before the editor accepts them.

use serde::{Deserialize, Serialize};

use super::{is_positive_finite, Segment};
use crate::format::round_one_decimal;

/// Which dimension of a segment a table input edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentField {
    Length,
    Diameter,
}

impl SegmentField {
    /// Middle part of a row input name (`drive_shaft.length.3`)
    pub fn name(self) -> &'static str {
        match self {
            SegmentField::Length => "length",
            SegmentField::Diameter => "diameter",
        }
    }

    /// Column heading
    pub fn label(self) -> &'static str {
        match self {
            SegmentField::Length => "Length (mm)",
            SegmentField::Diameter => "Diameter (mm)",
        }
    }

    /// Parse a field name as produced by [`SegmentField::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "length" => Some(SegmentField::Length),
            "diameter" => Some(SegmentField::Diameter),
            _ => None,
        }
    }

    /// Read this dimension from a segment.
    pub fn get(self, segment: &Segment) -> f64 {
        match self {
            SegmentField::Length => segment.length_mm,
            SegmentField::Diameter => segment.diameter_mm,
        }
    }

    /// Overwrite this dimension on a segment.
    pub fn set(self, segment: &mut Segment, value: f64) {
        match self {
            SegmentField::Length => segment.length_mm = value,
            SegmentField::Diameter => segment.diameter_mm = value,
        }
    }
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// 1-based display index
    pub number: usize,

    /// Length pre-fill, rounded to one decimal
    pub length_mm: f64,

    /// Diameter pre-fill, rounded to one decimal
    pub diameter_mm: f64,

    /// Whether the removal control does anything (false for the last remaining row)
    pub removable: bool,
}

impl TableRow {
    /// Zero-based position of the segment this row edits
    pub fn index(&self) -> usize {
        self.number - 1
    }

    /// Pre-fill value for one of the editable fields
    pub fn value(&self, field: SegmentField) -> f64 {
        match field {
            SegmentField::Length => self.length_mm,
            SegmentField::Diameter => self.diameter_mm,
        }
    }
}

/// Build one row per segment, in order.
pub fn render_rows(segments: &[Segment]) -> Vec<TableRow> {
    let removable = segments.len() > 1;
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| TableRow {
            number: i + 1,
            length_mm: round_one_decimal(segment.length_mm),
            diameter_mm: round_one_decimal(segment.diameter_mm),
            removable,
        })
        .collect()
}

/// Parse a committed field value.
///
/// Accepts trimmed decimal text for a finite number strictly greater than
/// zero. Anything else yields `None` and the edit is discarded.
pub fn parse_field_value(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| is_positive_finite(*value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rows_one_per_segment() {
        let rows = render_rows(&[Segment::new(150.04, 60.0), Segment::new(120.0, 44.96)]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 1);
        assert_eq!(rows[0].length_mm, 150.0);
        assert_eq!(rows[1].number, 2);
        assert_eq!(rows[1].index(), 1);
        assert_eq!(rows[1].value(SegmentField::Diameter), 45.0);
        assert!(rows.iter().all(|r| r.removable));
    }

    #[test]
    fn test_single_row_not_removable() {
        let rows = render_rows(&[Segment::new(10.0, 5.0)]);
        assert!(!rows[0].removable);
    }

    #[test]
    fn test_parse_field_value() {
        assert_eq!(parse_field_value("42"), Some(42.0));
        assert_eq!(parse_field_value(" 12.5 "), Some(12.5));
        assert_eq!(parse_field_value("0"), None);
        assert_eq!(parse_field_value("-1"), None);
        assert_eq!(parse_field_value("abc"), None);
        assert_eq!(parse_field_value(""), None);
        assert_eq!(parse_field_value("inf"), None);
        assert_eq!(parse_field_value("NaN"), None);
    }

    #[test]
    fn test_field_names() {
        for field in [SegmentField::Length, SegmentField::Diameter] {
            assert_eq!(SegmentField::from_name(field.name()), Some(field));
        }
        assert_eq!(SegmentField::from_name("width"), None);

        let mut segment = Segment::new(1.0, 2.0);
        SegmentField::Diameter.set(&mut segment, 9.0);
        assert_eq!(SegmentField::Diameter.get(&segment), 9.0);
    }
}
