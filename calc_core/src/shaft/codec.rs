//! # Geometry Codec
//!
//! Converts a segment list to and from the JSON text kept in the editor's
//! hidden form field:
//!
//! ```json
//! [{"diameter_mm":60.0,"length_mm":150.0},{"diameter_mm":45.0,"length_mm":120.0}]
//! ```
//!
//! Decoding is permissive. Text that is empty, malformed, or not an array
//! decodes to `None`; inside an array, elements that do not yield a
//! positive finite length and diameter are dropped and the rest are kept.
//! Elements are parsed lazily, so a number outside the `f64` range only
//! invalidates the element that holds it.

use std::collections::HashMap;

use serde_json::value::RawValue;
use serde_json::{json, Value};

use super::{default_segments, Segment};

/// Decode hidden-field text into segments.
///
/// Returns `None` when the text is empty, not well-formed JSON, or not a
/// JSON array. A well-formed array always yields `Some`, possibly empty
/// once invalid elements have been filtered out.
///
/// # Example
///
/// ```rust
/// use calc_core::shaft::codec::decode;
///
/// let segments = decode(r#"[{"length_mm": 80, "diameter_mm": "25.5"}]"#).unwrap();
/// assert_eq!(segments[0].diameter_mm, 25.5);
///
/// assert!(decode("not json").is_none());
/// ```
pub fn decode(text: &str) -> Option<Vec<Segment>> {
    if text.trim().is_empty() {
        return None;
    }

    let items: Vec<&RawValue> = serde_json::from_str(text).ok()?;

    Some(
        items
            .into_iter()
            .map(decode_element)
            .filter(Segment::is_valid)
            .collect(),
    )
}

fn decode_element(item: &RawValue) -> Segment {
    let Ok(fields) = serde_json::from_str::<HashMap<String, &RawValue>>(item.get()) else {
        return Segment::new(f64::NAN, f64::NAN);
    };
    let property = |name: &str| {
        fields
            .get(name)
            .and_then(|raw| serde_json::from_str::<Value>(raw.get()).ok())
    };

    Segment::new(
        coerce_number(property("length_mm").as_ref()),
        coerce_number(property("diameter_mm").as_ref()),
    )
}

/// Encode segments as the hidden-field JSON array.
pub fn encode(segments: &[Segment]) -> String {
    let items: Vec<Value> = segments
        .iter()
        .map(|s| json!({ "length_mm": s.length_mm, "diameter_mm": s.diameter_mm }))
        .collect();
    Value::Array(items).to_string()
}

/// Initial editor geometry: the decoded segments if at least one survived,
/// otherwise the default three-segment shape.
pub fn seed_segments(text: &str) -> Vec<Segment> {
    match decode(text) {
        Some(segments) if !segments.is_empty() => segments,
        _ => default_segments(),
    }
}

/// Loose numeric coercion for element properties.
///
/// Numbers pass through; strings are trimmed and parsed (empty means 0);
/// booleans map to 1/0 and `null` to 0. Missing or out-of-range
/// properties, arrays, objects and unparseable strings become NaN and are
/// filtered later.
fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Null) => 0.0,
        Some(Value::Array(_)) | Some(Value::Object(_)) | None => f64::NAN,
    }
}
