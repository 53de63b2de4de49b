//! # Belt Tensions
//!
//! Tight and slack side tensions on a drive pulley from Euler's belt
//! friction (capstan) equation.
//!
//! ## Method
//!
//! - Effective tension: T_e = T1 − T2 = M / r
//! - Tension ratio: T1 / T2 = e^(μθ), θ in radians
//! - Slack side: T2 = T_e / (e^(μθ) − 1)
//! - Tight side: T1 = T2 · e^(μθ)
//!
//! The field limits (θ ≥ 10°, μ ≥ 0.05) keep e^(μθ) strictly above 1.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::belt_tension::{BeltTensionInput, calculate};
//!
//! let input = BeltTensionInput {
//!     torque: 1000.0,
//!     pulley_radius: 0.25,
//!     wrap_angle: 180.0,
//!     friction_coefficient: 0.35,
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.value, 5997.2);
//! ```

use serde::{Deserialize, Serialize};

use super::form::FieldSpec;
use super::CalculationResult;
use crate::errors::CalcResult;
use crate::format::round_to;
use crate::units::{Degrees, Metres, NewtonMetres, Newtons, Radians};

/// Form fields, in display order.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "torque",
        label: "Pulley torque (N·m)",
        help: "Torque transmitted by the drive pulley.",
        min: Some(0.0),
        max: None,
        initial: None,
    },
    FieldSpec {
        name: "pulley_radius",
        label: "Pulley radius (m)",
        help: "Radius of the drive pulley.",
        min: Some(0.01),
        max: None,
        initial: None,
    },
    FieldSpec {
        name: "wrap_angle",
        label: "Wrap angle (degrees)",
        help: "Angle of belt contact with the pulley.",
        min: Some(10.0),
        max: Some(360.0),
        initial: Some(180.0),
    },
    FieldSpec {
        name: "friction_coefficient",
        label: "Belt/pulley friction coefficient",
        help: "Dimensionless coefficient of friction between belt and pulley lagging.",
        min: Some(0.05),
        max: None,
        initial: Some(0.35),
    },
];

/// Input parameters for the belt tension calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "torque": 1000.0,
///   "pulley_radius": 0.25,
///   "wrap_angle": 180.0,
///   "friction_coefficient": 0.35
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeltTensionInput {
    /// Pulley torque in newton-metres
    pub torque: f64,

    /// Pulley radius in metres
    pub pulley_radius: f64,

    /// Wrap angle in degrees
    pub wrap_angle: f64,

    /// Belt/pulley friction coefficient μ
    pub friction_coefficient: f64,
}

/// Both belt tensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tensions {
    pub tight: Newtons,
    pub slack: Newtons,
    pub ratio: f64,
}

impl BeltTensionInput {
    /// Validate input parameters against the field limits.
    pub fn validate(&self) -> CalcResult<()> {
        let values = [
            self.torque,
            self.pulley_radius,
            self.wrap_angle,
            self.friction_coefficient,
        ];
        for (spec, value) in FIELDS.iter().zip(values) {
            spec.check(value)?;
        }
        Ok(())
    }

    /// Unrounded tight/slack tensions
    pub fn tensions(&self) -> Tensions {
        let effective = NewtonMetres(self.torque).force_at_radius(Metres(self.pulley_radius));
        let wrap: Radians = Degrees(self.wrap_angle).into();
        let ratio = (self.friction_coefficient * wrap.value()).exp();
        let slack = effective / (ratio - 1.0);

        Tensions {
            tight: slack * ratio,
            slack,
            ratio,
        }
    }
}

/// Calculate the tight side tension.
pub fn calculate(input: &BeltTensionInput) -> CalcResult<CalculationResult> {
    input.validate()?;

    let tensions = input.tensions();

    Ok(CalculationResult::new(
        "Tight and slack side tensions",
        "Belt tensions computed using Euler's belt friction equation.",
        round_to(tensions.tight.value(), 1),
        "N (tight side)",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> BeltTensionInput {
        BeltTensionInput {
            torque: 1000.0,
            pulley_radius: 0.25,
            wrap_angle: 180.0,
            friction_coefficient: 0.35,
        }
    }

    #[test]
    fn test_tensions() {
        let t = test_input().tensions();
        // e^(0.35π) = 3.0028
        assert!((t.ratio - 3.0028).abs() < 0.0001);
        assert!((t.slack.value() - 1997.17).abs() < 0.01);
        assert!((t.tight.value() - 5997.17).abs() < 0.01);
        // T1 - T2 = M / r
        assert!((t.tight.value() - t.slack.value() - 4000.0).abs() < 1e-6);
    }

    #[test]
    fn test_belt_tension_calculation() {
        let result = calculate(&test_input()).unwrap();
        assert_eq!(result.value, 5997.2);
        assert_eq!(result.units, "N (tight side)");
    }

    #[test]
    fn test_wrap_angle_limits() {
        let mut input = test_input();
        input.wrap_angle = 5.0;
        assert!(calculate(&input).is_err());
        input.wrap_angle = 361.0;
        assert!(calculate(&input).is_err());
        input.wrap_angle = 360.0;
        assert!(calculate(&input).is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut input = test_input();
        input.torque = f64::NAN;
        assert!(calculate(&input).is_err());
    }
}
