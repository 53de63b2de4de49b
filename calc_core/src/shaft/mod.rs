//! # Shaft Geometry
//!
//! A stepped shaft is described as an ordered list of cylindrical
//! [`Segment`]s laid out left to right along the shaft axis. This module
//! holds the geometry model and the editor engine built on top of it:
//!
//! - [`codec`] - JSON encoding of the segment list for a hidden form field
//! - [`table`] - Editable table rows and field-commit parsing
//! - [`preview`] - Scaled side-view diagram and SVG output
//! - [`summary`] - Minimum diameter / total length summary line
//! - [`editor`] - The editor controller that keeps all of the above in sync
//!
//! ## Example
//!
//! ```rust
//! use calc_core::shaft::editor::{HiddenField, ShaftEditor, TextField};
//!
//! let mut editor = ShaftEditor::new(TextField::new("geometry", ""));
//! assert_eq!(editor.segments().len(), 3); // default shape
//!
//! editor.add_segment();
//! assert_eq!(editor.segments().len(), 4);
//! assert!(editor.field().value().starts_with('['));
//! ```

pub mod codec;
pub mod editor;
pub mod preview;
pub mod summary;
pub mod table;

use serde::{Deserialize, Serialize};

// Re-export commonly used items
pub use codec::{decode, encode, seed_segments};
pub use editor::{EditorAction, EditorContainer, ShaftEditor};

/// Segment appended when the sequence is somehow empty (length, diameter in mm).
pub const FALLBACK_SEGMENT: Segment = Segment {
    length_mm: 100.0,
    diameter_mm: 40.0,
};

/// One cylindrical section of a shaft.
///
/// ## JSON Example
///
/// ```json
/// { "length_mm": 150.0, "diameter_mm": 60.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Axial length in millimetres
    pub length_mm: f64,

    /// Diameter in millimetres
    pub diameter_mm: f64,
}

impl Segment {
    /// Create a new segment (no validation).
    pub fn new(length_mm: f64, diameter_mm: f64) -> Self {
        Segment {
            length_mm,
            diameter_mm,
        }
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        is_positive_finite(self.length_mm) && is_positive_finite(self.diameter_mm)
    }
}

/// The only values the editor ever stores.
pub fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Shape used when no usable geometry was supplied: 150/60, 120/45, 150/60 mm.
pub fn default_segments() -> Vec<Segment> {
    vec![
        Segment::new(150.0, 60.0),
        Segment::new(120.0, 45.0),
        Segment::new(150.0, 60.0),
    ]
}

/// Sum of all segment lengths (mm).
pub fn total_length_mm(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| s.length_mm).sum()
}

/// Largest diameter, or 0 for an empty list.
pub fn max_diameter_mm(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| s.diameter_mm).fold(0.0, f64::max)
}

/// Smallest diameter, or `None` for an empty list.
pub fn min_diameter_mm(segments: &[Segment]) -> Option<f64> {
    segments.iter().map(|s| s.diameter_mm).reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape() {
        let segments = default_segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::new(150.0, 60.0));
        assert_eq!(segments[1], Segment::new(120.0, 45.0));
        assert_eq!(segments[2], Segment::new(150.0, 60.0));
    }

    #[test]
    fn test_segment_validity() {
        assert!(Segment::new(10.0, 5.0).is_valid());
        assert!(!Segment::new(0.0, 5.0).is_valid());
        assert!(!Segment::new(10.0, -1.0).is_valid());
        assert!(!Segment::new(f64::NAN, 5.0).is_valid());
        assert!(!Segment::new(10.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_aggregates() {
        let segments = vec![
            Segment::new(100.0, 40.0),
            Segment::new(200.0, 20.0),
            Segment::new(50.0, 80.0),
        ];
        assert_eq!(total_length_mm(&segments), 350.0);
        assert_eq!(max_diameter_mm(&segments), 80.0);
        assert_eq!(min_diameter_mm(&segments), Some(20.0));

        assert_eq!(total_length_mm(&[]), 0.0);
        assert_eq!(max_diameter_mm(&[]), 0.0);
        assert_eq!(min_diameter_mm(&[]), None);
    }
}
