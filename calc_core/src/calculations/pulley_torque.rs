//! # Pulley Torque
//!
//! Torque delivered to a drive pulley from motor power and pulley speed:
//!
//! T = P / ω, with ω = 2π · n / 60
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::pulley_torque::{PulleyTorqueInput, calculate};
//!
//! let input = PulleyTorqueInput { power: 15.0, rotational_speed: 1450.0 };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.value, 98.8); // N·m
//! ```

use serde::{Deserialize, Serialize};

use super::form::FieldSpec;
use super::CalculationResult;
use crate::errors::CalcResult;
use crate::format::round_to;
use crate::units::{KiloWatts, NewtonMetres, RadiansPerSecond, Rpm, Watts};

/// Form fields, in display order.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "power",
        label: "Drive power (kW)",
        help: "Rated motor power available at the pulley.",
        min: Some(0.0),
        max: None,
        initial: None,
    },
    FieldSpec {
        name: "rotational_speed",
        label: "Pulley speed (rpm)",
        help: "Rotational speed of the conveyor pulley.",
        min: Some(0.1),
        max: None,
        initial: None,
    },
];

/// Input parameters for the pulley torque calculation.
///
/// ## JSON Example
///
/// ```json
/// { "power": 15.0, "rotational_speed": 1450.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulleyTorqueInput {
    /// Drive power in kilowatts
    pub power: f64,

    /// Pulley speed in revolutions per minute
    pub rotational_speed: f64,
}

impl PulleyTorqueInput {
    /// Validate input parameters against the field limits.
    pub fn validate(&self) -> CalcResult<()> {
        FIELDS[0].check(self.power)?;
        FIELDS[1].check(self.rotational_speed)?;
        Ok(())
    }

    /// Unrounded shaft torque
    pub fn torque(&self) -> NewtonMetres {
        let power: Watts = KiloWatts(self.power).into();
        let speed: RadiansPerSecond = Rpm(self.rotational_speed).into();
        power.torque_at(speed)
    }
}

/// Calculate the pulley torque.
pub fn calculate(input: &PulleyTorqueInput) -> CalcResult<CalculationResult> {
    input.validate()?;

    Ok(CalculationResult::new(
        "Pulley torque",
        "Shaft torque delivered to the pulley.",
        round_to(input.torque().value(), 1),
        "N·m",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulley_torque() {
        let input = PulleyTorqueInput {
            power: 15.0,
            rotational_speed: 1450.0,
        };
        // T = 15000 * 60 / (2π * 1450) = 98.79 N·m
        assert!((input.torque().value() - 98.7858).abs() < 0.001);

        let result = calculate(&input).unwrap();
        assert_eq!(result.value, 98.8);
        assert_eq!(result.units, "N·m");
    }

    #[test]
    fn test_zero_power_gives_zero_torque() {
        let input = PulleyTorqueInput {
            power: 0.0,
            rotational_speed: 100.0,
        };
        assert_eq!(calculate(&input).unwrap().value, 0.0);
    }

    #[test]
    fn test_speed_below_minimum() {
        let input = PulleyTorqueInput {
            power: 5.0,
            rotational_speed: 0.0,
        };
        let err = calculate(&input).unwrap_err();
        assert!(err.to_string().contains("rotational_speed"));
    }
}
