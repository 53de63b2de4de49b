//! # Belt Conveyor Drive Power
//!
//! Estimates the drive power for a belt conveyor from the power needed to
//! lift the material plus a friction allowance.
//!
//! ## Method
//!
//! - Mass flow: ṁ = Q / 3.6 (t/h → kg/s)
//! - Lift power: P_lift = ṁ · g · H / 1000 (kW)
//! - Friction power: P_f = Q · f / 1000 (kW), with f in N per tonne
//! - Shaft power: P_s = P_lift + P_f
//! - Drive power: P = P_s / η, with η = 0.92
//! - Effective tension: T_e = P_s · 1000 / v (N)
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::belt_power::{BeltPowerInput, calculate};
//!
//! let input = BeltPowerInput {
//!     throughput: 500.0,
//!     lift_height: 10.0,
//!     friction_factor: 15.0,
//!     belt_speed: 2.5,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.value, 22.96);
//! assert_eq!(result.units, "kW");
//! ```

use serde::{Deserialize, Serialize};

use super::form::FieldSpec;
use super::CalculationResult;
use crate::errors::CalcResult;
use crate::format::{format_thousands, round_to};
use crate::units::{KgPerSecond, KiloWatts, MetresPerSecond, TonnesPerHour, Watts};

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.80665;

/// Assumed overall drive efficiency
pub const DRIVE_EFFICIENCY: f64 = 0.92;

/// Form fields, in display order.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "throughput",
        label: "Material throughput (t/h)",
        help: "Mass flow rate of conveyed material in tonnes per hour.",
        min: Some(0.0),
        max: None,
        initial: None,
    },
    FieldSpec {
        name: "lift_height",
        label: "Lift height (m)",
        help: "Vertical lift between loading and discharge points.",
        min: Some(0.0),
        max: None,
        initial: None,
    },
    FieldSpec {
        name: "friction_factor",
        label: "Friction factor (N per tonne)",
        help: "Average resistance per tonne of material to account for idler and skirt friction.",
        min: Some(0.0),
        max: None,
        initial: Some(15.0),
    },
    FieldSpec {
        name: "belt_speed",
        label: "Belt speed (m/s)",
        help: "Linear speed of the belt.",
        min: Some(0.1),
        max: None,
        initial: None,
    },
];

/// Input parameters for the belt power estimate.
///
/// ## JSON Example
///
/// ```json
/// {
///   "throughput": 500.0,
///   "lift_height": 10.0,
///   "friction_factor": 15.0,
///   "belt_speed": 2.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeltPowerInput {
    /// Material throughput in tonnes per hour
    pub throughput: f64,

    /// Vertical lift in metres
    pub lift_height: f64,

    /// Friction resistance in newtons per tonne of material
    pub friction_factor: f64,

    /// Belt speed in metres per second
    pub belt_speed: f64,
}

impl BeltPowerInput {
    /// Validate input parameters against the field limits.
    pub fn validate(&self) -> CalcResult<()> {
        let values = [
            self.throughput,
            self.lift_height,
            self.friction_factor,
            self.belt_speed,
        ];
        for (spec, value) in FIELDS.iter().zip(values) {
            spec.check(value)?;
        }
        Ok(())
    }

    fn mass_flow(&self) -> KgPerSecond {
        TonnesPerHour(self.throughput).into()
    }

    /// Power needed to raise the material (kW)
    pub fn lift_power(&self) -> KiloWatts {
        Watts(self.mass_flow().value() * GRAVITY * self.lift_height).into()
    }

    /// Friction allowance (kW)
    pub fn friction_power(&self) -> KiloWatts {
        Watts(self.throughput * self.friction_factor).into()
    }

    /// Power at the drive pulley shaft before drive losses (kW)
    pub fn shaft_power(&self) -> KiloWatts {
        self.lift_power() + self.friction_power()
    }
}

/// Estimate the required drive power.
pub fn calculate(input: &BeltPowerInput) -> CalcResult<CalculationResult> {
    input.validate()?;

    let shaft_power = input.shaft_power();
    let total_power = shaft_power / DRIVE_EFFICIENCY;
    let effective_tension = Watts::from(shaft_power).force_at(MetresPerSecond(input.belt_speed));

    Ok(CalculationResult::new(
        "Required drive power",
        format!(
            "Estimated power requirement including allowance for lift and friction losses. \
             Effective tension ≈ {} N.",
            format_thousands(effective_tension.value())
        ),
        round_to(total_power.value(), 2),
        "kW",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> BeltPowerInput {
        BeltPowerInput {
            throughput: 500.0,
            lift_height: 10.0,
            friction_factor: 15.0,
            belt_speed: 2.5,
        }
    }

    #[test]
    fn test_power_components() {
        let input = test_input();
        // ṁ = 138.9 kg/s, P_lift = 138.9 * 9.80665 * 10 / 1000 = 13.62 kW
        assert!((input.lift_power().value() - 13.6203).abs() < 0.001);
        // P_f = 500 * 15 / 1000 = 7.5 kW
        assert!((input.friction_power().value() - 7.5).abs() < 1e-9);
        assert!((input.shaft_power().value() - 21.1203).abs() < 0.001);
    }

    #[test]
    fn test_belt_power_calculation() {
        let result = calculate(&test_input()).unwrap();
        // 21.1203 / 0.92 = 22.957
        assert_eq!(result.value, 22.96);
        assert_eq!(result.title, "Required drive power");
        // T_e = 21120.3 / 2.5 = 8448 N
        assert!(result.description.contains("Effective tension ≈ 8,448 N."));
    }

    #[test]
    fn test_friction_only() {
        let input = BeltPowerInput {
            throughput: 100.0,
            lift_height: 0.0,
            friction_factor: 15.0,
            belt_speed: 1.0,
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.value, 1.63);
        assert!(result.description.contains("1,500 N"));
    }

    #[test]
    fn test_invalid_speed() {
        let mut input = test_input();
        input.belt_speed = 0.05;
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_negative_throughput() {
        let mut input = test_input();
        input.throughput = -1.0;
        assert!(calculate(&input).is_err());
    }
}
