//! # Form Binding
//!
//! Turns raw string-keyed form data into validated calculator inputs.
//!
//! Each calculator publishes a list of [`FieldSpec`]s (name, label, limits,
//! initial value). Binding checks every field in order and collects one
//! message per failing field, so a re-rendered form can show all errors at
//! once:
//!
//! - missing or blank → `This field is required.`
//! - not a finite number → `Enter a number.`
//! - below `min` → `Ensure this value is greater than or equal to {min}.`
//! - above `max` → `Ensure this value is less than or equal to {max}.`
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use calc_core::calculations::CalculatorKind;
//! use calc_core::calculations::form::bind;
//!
//! let mut data = HashMap::new();
//! data.insert("power".to_string(), "15".to_string());
//! data.insert("rotational_speed".to_string(), "1450".to_string());
//!
//! let form = bind(CalculatorKind::PulleyTorque, &data);
//! assert!(form.is_valid());
//! assert_eq!(form.result.unwrap().value, 98.8);
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CalculationResult, CalculatorKind};
use crate::errors::{CalcError, CalcResult};

/// Form field that selects which calculator a POST targets.
pub const FORM_ID_FIELD: &str = "form_id";

/// Static description of one numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Form / JSON key
    pub name: &'static str,
    /// Human-readable label including units
    pub label: &'static str,
    /// Help text shown under the input
    pub help: &'static str,
    /// Inclusive lower bound
    pub min: Option<f64>,
    /// Inclusive upper bound
    pub max: Option<f64>,
    /// Pre-filled value on an unbound form
    pub initial: Option<f64>,
}

impl FieldSpec {
    /// Check a numeric value against this field's limits.
    pub fn check(&self, value: f64) -> CalcResult<()> {
        match self.range_message(value) {
            Some(reason) => Err(CalcError::invalid_input(self.name, value.to_string(), reason)),
            None => Ok(()),
        }
    }

    /// Parse and check raw form text, returning the cleaned value or a message.
    pub fn clean(&self, raw: Option<&str>) -> Result<f64, String> {
        let text = raw.map(str::trim).unwrap_or("");
        if text.is_empty() {
            return Err("This field is required.".to_string());
        }
        let value: f64 = text.parse().map_err(|_| "Enter a number.".to_string())?;
        match self.range_message(value) {
            Some(message) => Err(message),
            None => Ok(value),
        }
    }

    fn range_message(&self, value: f64) -> Option<String> {
        if !value.is_finite() {
            return Some("Enter a number.".to_string());
        }
        if let Some(min) = self.min {
            if value < min {
                return Some(format!(
                    "Ensure this value is greater than or equal to {}.",
                    min
                ));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Some(format!("Ensure this value is less than or equal to {}.", max));
            }
        }
        None
    }
}

/// A calculator form after binding submitted data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundForm {
    pub kind: CalculatorKind,

    /// Raw submitted text, echoed back into the inputs
    pub values: HashMap<String, String>,

    /// Per-field error messages (empty when valid)
    pub errors: BTreeMap<String, String>,

    /// Cleaned inputs as JSON, present when every field validated
    pub cleaned: Option<Value>,

    /// Calculation output, present when the form was valid
    pub result: Option<CalculationResult>,

    /// Non-field error (e.g. the calculation itself rejected the inputs)
    pub form_error: Option<String>,
}

impl BoundForm {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.form_error.is_none() && self.result.is_some()
    }

    /// Text to show in a field's input
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }
}

/// Bind submitted data to one calculator and evaluate it if valid.
pub fn bind(kind: CalculatorKind, data: &HashMap<String, String>) -> BoundForm {
    let mut values = HashMap::new();
    let mut errors = BTreeMap::new();
    let mut cleaned = Map::new();

    for spec in kind.fields() {
        let raw = data.get(spec.name).map(String::as_str);
        values.insert(spec.name.to_string(), raw.unwrap_or("").to_string());

        match spec.clean(raw) {
            Ok(value) => {
                cleaned.insert(spec.name.to_string(), Value::from(value));
            }
            Err(message) => {
                errors.insert(spec.name.to_string(), message);
            }
        }
    }

    let mut form = BoundForm {
        kind,
        values,
        errors,
        cleaned: None,
        result: None,
        form_error: None,
    };

    if form.errors.is_empty() {
        let cleaned = Value::Object(cleaned);
        match kind.calculate_json(&cleaned) {
            Ok(result) => form.result = Some(result),
            Err(e) => form.form_error = Some(e.to_string()),
        }
        form.cleaned = Some(cleaned);
    }

    form
}

/// The state of one calculator on a page: unbound (initial values) or bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FormState {
    Unbound(CalculatorKind),
    Bound(BoundForm),
}

impl FormState {
    pub fn kind(&self) -> CalculatorKind {
        match self {
            FormState::Unbound(kind) => *kind,
            FormState::Bound(form) => form.kind,
        }
    }

    /// Text to pre-fill a field with
    pub fn value(&self, spec: &FieldSpec) -> String {
        match self {
            FormState::Unbound(_) => spec.initial.map(|v| v.to_string()).unwrap_or_default(),
            FormState::Bound(form) => form.value(spec.name).unwrap_or("").to_string(),
        }
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        match self {
            FormState::Unbound(_) => None,
            FormState::Bound(form) => form.error(name),
        }
    }
}

/// Every calculator form for a page, with at most one bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedForms {
    pub forms: Vec<FormState>,
}

impl PreparedForms {
    /// The bound form, if a known calculator was submitted
    pub fn bound(&self) -> Option<&BoundForm> {
        self.forms.iter().find_map(|state| match state {
            FormState::Bound(form) => Some(form),
            FormState::Unbound(_) => None,
        })
    }
}

/// Build every calculator form, binding the one named by `form_id` (if any).
///
/// An unknown or missing `form_id` leaves every form unbound.
pub fn prepare_forms(data: Option<&HashMap<String, String>>) -> PreparedForms {
    let active = data
        .and_then(|d| d.get(FORM_ID_FIELD))
        .and_then(|slug| CalculatorKind::from_slug(slug));

    let forms = CalculatorKind::ALL
        .iter()
        .map(|&kind| match (active, data) {
            (Some(selected), Some(data)) if selected == kind => FormState::Bound(bind(kind, data)),
            _ => FormState::Unbound(kind),
        })
        .collect();

    PreparedForms { forms }
}
