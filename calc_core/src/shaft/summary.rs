//! Minimum diameter and total length across a segment list.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{min_diameter_mm, total_length_mm, Segment};
use crate::format::{format_one_decimal, round_one_decimal};

/// Derived shaft figures, both rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min_diameter_mm: f64,
    pub total_length_mm: f64,
}

/// Compute the summary from scratch.
///
/// An empty list (which an active editor never holds) reports zeros.
pub fn summarize(segments: &[Segment]) -> Summary {
    Summary {
        min_diameter_mm: round_one_decimal(min_diameter_mm(segments).unwrap_or(0.0)),
        total_length_mm: round_one_decimal(total_length_mm(segments)),
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Minimum diameter: {} mm • Total length: {} mm",
            format_one_decimal(self.min_diameter_mm),
            format_one_decimal(self.total_length_mm)
        )
    }
}
