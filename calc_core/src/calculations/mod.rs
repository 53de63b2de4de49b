//! # Belt Drive Calculations
//!
//! This module contains the conveyor drive calculators. Each calculation
//! follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `FIELDS` - Form field metadata (labels, limits, initial values)
//! - `calculate(input) -> CalcResult<CalculationResult>` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`belt_power`] - Drive power for a belt conveyor (lift + friction)
//! - [`pulley_torque`] - Pulley torque from power and speed
//! - [`belt_tension`] - Tight/slack side tensions via Euler's belt friction equation

pub mod belt_power;
pub mod belt_tension;
pub mod form;
pub mod pulley_torque;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CalcError, CalcResult};
use form::FieldSpec;

// Re-export commonly used types
pub use belt_power::BeltPowerInput;
pub use belt_tension::BeltTensionInput;
pub use pulley_torque::PulleyTorqueInput;

/// Output of any calculator.
///
/// ## JSON Example
///
/// ```json
/// {
///   "title": "Pulley torque",
///   "description": "Shaft torque delivered to the pulley.",
///   "value": 98.8,
///   "units": "N·m"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub title: String,
    pub description: String,
    pub value: f64,
    pub units: String,
}

impl CalculationResult {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        value: f64,
        units: impl Into<String>,
    ) -> Self {
        CalculationResult {
            title: title.into(),
            description: description.into(),
            value,
            units: units.into(),
        }
    }
}

impl fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.title, self.value, self.units)
    }
}

/// Identifies a calculator. Serialises as its slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    BeltPower,
    PulleyTorque,
    BeltTension,
}

impl CalculatorKind {
    /// Every calculator, in page order
    pub const ALL: [CalculatorKind; 3] = [
        CalculatorKind::BeltPower,
        CalculatorKind::PulleyTorque,
        CalculatorKind::BeltTension,
    ];

    /// URL / form identifier
    pub fn slug(self) -> &'static str {
        match self {
            CalculatorKind::BeltPower => "belt_power",
            CalculatorKind::PulleyTorque => "pulley_torque",
            CalculatorKind::BeltTension => "belt_tension",
        }
    }

    /// Short display name
    pub fn title(self) -> &'static str {
        match self {
            CalculatorKind::BeltPower => "Belt power",
            CalculatorKind::PulleyTorque => "Pulley torque",
            CalculatorKind::BeltTension => "Belt tension",
        }
    }

    /// One-line description shown above the form
    pub fn summary(self) -> &'static str {
        match self {
            CalculatorKind::BeltPower => "Estimate the power requirement for a belt conveyor.",
            CalculatorKind::PulleyTorque => "Calculate motor torque from power and rotational speed.",
            CalculatorKind::BeltTension => "Estimate belt tensions using Euler's equation.",
        }
    }

    /// Input fields, in form order
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            CalculatorKind::BeltPower => belt_power::FIELDS,
            CalculatorKind::PulleyTorque => pulley_torque::FIELDS,
            CalculatorKind::BeltTension => belt_tension::FIELDS,
        }
    }

    /// Look up a calculator by slug.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.slug() == slug)
    }

    /// Like [`CalculatorKind::from_slug`], but reports unknown slugs as an error.
    pub fn parse(slug: &str) -> CalcResult<Self> {
        Self::from_slug(slug).ok_or_else(|| CalcError::unknown_calculator(slug))
    }

    /// Deserialize JSON input for this calculator and run it.
    pub fn calculate_json(self, input: &Value) -> CalcResult<CalculationResult> {
        CalculationInput::from_json(self, input)?.calculate()
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Enum wrapper for all calculator inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalculationInput {
    BeltPower(BeltPowerInput),
    PulleyTorque(PulleyTorqueInput),
    BeltTension(BeltTensionInput),
}

impl CalculationInput {
    /// Parse the untagged JSON inputs of a specific calculator.
    pub fn from_json(kind: CalculatorKind, input: &Value) -> CalcResult<Self> {
        fn parse<T: serde::de::DeserializeOwned>(input: &Value) -> CalcResult<T> {
            T::deserialize(input).map_err(|e| CalcError::serialization(e.to_string()))
        }

        Ok(match kind {
            CalculatorKind::BeltPower => CalculationInput::BeltPower(parse(input)?),
            CalculatorKind::PulleyTorque => CalculationInput::PulleyTorque(parse(input)?),
            CalculatorKind::BeltTension => CalculationInput::BeltTension(parse(input)?),
        })
    }

    pub fn kind(&self) -> CalculatorKind {
        match self {
            CalculationInput::BeltPower(_) => CalculatorKind::BeltPower,
            CalculationInput::PulleyTorque(_) => CalculatorKind::PulleyTorque,
            CalculationInput::BeltTension(_) => CalculatorKind::BeltTension,
        }
    }

    pub fn calculate(&self) -> CalcResult<CalculationResult> {
        match self {
            CalculationInput::BeltPower(input) => belt_power::calculate(input),
            CalculationInput::PulleyTorque(input) => pulley_torque::calculate(input),
            CalculationInput::BeltTension(input) => belt_tension::calculate(input),
        }
    }
}
