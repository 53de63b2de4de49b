//! # Shaft Preview
//!
//! Lays out a scaled side view of the shaft on a fixed 620 × 200 canvas
//! and serialises it to SVG.
//!
//! Segments are drawn left to right with no gaps, each as a rectangle
//! centred on the canvas midline. Lengths are scaled to fill the usable
//! width and diameters to fill the usable height, so the preview shows
//! proportions rather than absolute size. A diameter label sits above
//! each rectangle, and a dashed centreline marking the shaft axis is
//! painted last, on top of the segments.
//!
//! ```text
//!  30                                              590
//!   ┌──────────┐            ┌──────────┐             20
//!   │          ├────────────┤          │
//!  -│- - - - - │- - - - - - │- - - - - │-            100
//!   │          ├────────────┤          │
//!   └──────────┘            └──────────┘             180
//! ```

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::{max_diameter_mm, total_length_mm, Segment};
use crate::format::format_one_decimal;

/// Logical canvas width
pub const CANVAS_WIDTH: f64 = 620.0;
/// Logical canvas height
pub const CANVAS_HEIGHT: f64 = 200.0;
/// Left and right margin
pub const MARGIN_X: f64 = 30.0;
/// Top and bottom margin
pub const MARGIN_Y: f64 = 20.0;

/// Gap between a rectangle's top edge and its label baseline
const LABEL_OFFSET: f64 = 6.0;

/// Rectangle for one segment, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SegmentRect {
    /// Horizontal centre of the rectangle
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical centre of the rectangle
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Diameter label, anchored at its horizontal centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Dashed axis line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centerline {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
}

/// One drawable item. Scenes store these in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewElement {
    Segment(SegmentRect),
    Label(Label),
    Centerline(Centerline),
}

/// A fully laid-out preview, replaced wholesale on every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewScene {
    pub width: f64,
    pub height: f64,

    /// Canvas units per millimetre of length
    pub horizontal_scale: f64,

    /// Canvas units per millimetre of diameter
    pub vertical_scale: f64,

    /// Drawables in paint order
    pub elements: Vec<PreviewElement>,
}

impl PreviewScene {
    /// Segment rectangles, left to right
    pub fn rects(&self) -> impl Iterator<Item = &SegmentRect> {
        self.elements.iter().filter_map(|e| match e {
            PreviewElement::Segment(rect) => Some(rect),
            _ => None,
        })
    }

    /// Diameter labels, left to right
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.elements.iter().filter_map(|e| match e {
            PreviewElement::Label(label) => Some(label),
            _ => None,
        })
    }

    /// The axis line
    pub fn centerline(&self) -> Option<&Centerline> {
        self.elements.iter().find_map(|e| match e {
            PreviewElement::Centerline(line) => Some(line),
            _ => None,
        })
    }
}

impl Default for PreviewScene {
    fn default() -> Self {
        layout(&[])
    }
}

/// Width available for segments
pub fn usable_width() -> f64 {
    CANVAS_WIDTH - 2.0 * MARGIN_X
}

/// Height available for segments
pub fn usable_height() -> f64 {
    CANVAS_HEIGHT - 2.0 * MARGIN_Y
}

/// Lay out the preview for a segment list.
///
/// # Example
///
/// ```rust
/// use calc_core::shaft::Segment;
/// use calc_core::shaft::preview::layout;
///
/// let scene = layout(&[Segment::new(100.0, 50.0)]);
/// let rect = scene.rects().next().unwrap();
/// assert_eq!((rect.width, rect.height), (560.0, 160.0));
/// ```
pub fn layout(segments: &[Segment]) -> PreviewScene {
    let total_length = total_length_mm(segments);
    let max_diameter = max_diameter_mm(segments);

    let horizontal_scale = if total_length > 0.0 {
        usable_width() / total_length
    } else {
        1.0
    };
    let vertical_scale = if max_diameter > 0.0 {
        usable_height() / max_diameter
    } else {
        1.0
    };

    let mid_y = CANVAS_HEIGHT / 2.0;
    let mut elements = Vec::with_capacity(segments.len() * 2 + 1);
    let mut cursor_x = MARGIN_X;

    for segment in segments {
        let width = segment.length_mm * horizontal_scale;
        let height = segment.diameter_mm * vertical_scale;
        let rect = SegmentRect {
            x: cursor_x,
            y: mid_y - height / 2.0,
            width,
            height,
        };

        elements.push(PreviewElement::Segment(rect));
        elements.push(PreviewElement::Label(Label {
            x: rect.center_x(),
            y: rect.y - LABEL_OFFSET,
            text: format!("{} mm", format_one_decimal(segment.diameter_mm)),
        }));

        cursor_x += width;
    }

    // Centerline is painted last, over the segments.
    elements.push(PreviewElement::Centerline(Centerline {
        x1: MARGIN_X,
        x2: MARGIN_X + usable_width(),
        y: mid_y,
    }));

    PreviewScene {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        horizontal_scale,
        vertical_scale,
        elements,
    }
}

/// Serialise a scene as an SVG document fragment (no XML declaration, so
/// it can be inlined into HTML or written to a `.svg` file).
pub fn to_svg(scene: &PreviewScene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="shaft-preview" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-label="Shaft preview">"#,
        w = coord(scene.width),
        h = coord(scene.height),
    );

    for element in &scene.elements {
        match element {
            PreviewElement::Segment(rect) => {
                let _ = writeln!(
                    out,
                    r##"  <rect x="{}" y="{}" width="{}" height="{}" fill="#cbd5e1" stroke="#334155" stroke-width="1"/>"##,
                    coord(rect.x),
                    coord(rect.y),
                    coord(rect.width),
                    coord(rect.height),
                );
            }
            PreviewElement::Label(label) => {
                let _ = writeln!(
                    out,
                    r##"  <text x="{}" y="{}" text-anchor="middle" font-size="12" fill="#0f172a">{}</text>"##,
                    coord(label.x),
                    coord(label.y),
                    xml_escape(&label.text),
                );
            }
            PreviewElement::Centerline(line) => {
                let _ = writeln!(
                    out,
                    r##"  <line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="#dc2626" stroke-width="1" stroke-dasharray="6 4"/>"##,
                    coord(line.x1),
                    coord(line.x2),
                    y = coord(line.y),
                );
            }
        }
    }

    out.push_str("</svg>\n");
    out
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn coord(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
