//! # Unit Types
//!
//! Type-safe wrappers for engineering units. These provide compile-time
//! safety against unit confusion while remaining lightweight (just f64 wrappers).
//!
//! ## Design Philosophy
//!
//! We use simple newtype wrappers rather than a full units library because:
//! - Belt drive design uses a small, consistent set of units
//! - We want JSON serialization to be clean (just numbers)
//! - Minimal runtime overhead
//!
//! ## SI Units
//!
//! Beltworks uses SI units throughout, matching conveyor design practice:
//! - Length: metres (m)
//! - Power: kilowatts (kW), watts (W)
//! - Force: newtons (N)
//! - Torque: newton-metres (N·m)
//! - Rotation: revolutions per minute (rpm), radians per second (rad/s)
//! - Angle: degrees, radians
//! - Mass flow: tonnes per hour (t/h), kilograms per second (kg/s)
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::{KiloWatts, Watts, Degrees, Radians};
//!
//! let power = KiloWatts(7.5);
//! let watts: Watts = power.into();
//! assert_eq!(watts.0, 7500.0);
//!
//! let wrap: Radians = Degrees(180.0).into();
//! assert!((wrap.0 - std::f64::consts::PI).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metres(pub f64);

// ============================================================================
// Power Units
// ============================================================================

/// Power in watts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f64);

/// Power in kilowatts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloWatts(pub f64);

impl From<KiloWatts> for Watts {
    fn from(kw: KiloWatts) -> Self {
        Watts(kw.0 * 1000.0)
    }
}

impl From<Watts> for KiloWatts {
    fn from(w: Watts) -> Self {
        KiloWatts(w.0 / 1000.0)
    }
}

// ============================================================================
// Force and Torque Units
// ============================================================================

/// Force in newtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Newtons(pub f64);

/// Torque in newton-metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewtonMetres(pub f64);

// ============================================================================
// Rotation and Angle Units
// ============================================================================

/// Rotational speed in revolutions per minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rpm(pub f64);

/// Angular velocity in radians per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RadiansPerSecond(pub f64);

impl From<Rpm> for RadiansPerSecond {
    fn from(rpm: Rpm) -> Self {
        RadiansPerSecond(rpm.0 * 2.0 * std::f64::consts::PI / 60.0)
    }
}

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radians(pub f64);

impl From<Degrees> for Radians {
    fn from(deg: Degrees) -> Self {
        Radians(deg.0 * std::f64::consts::PI / 180.0)
    }
}

impl From<Radians> for Degrees {
    fn from(rad: Radians) -> Self {
        Degrees(rad.0 * 180.0 / std::f64::consts::PI)
    }
}

// ============================================================================
// Speed and Mass Flow Units
// ============================================================================

/// Linear speed in metres per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetresPerSecond(pub f64);

/// Mass flow in tonnes per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TonnesPerHour(pub f64);

/// Mass flow in kilograms per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgPerSecond(pub f64);

impl From<TonnesPerHour> for KgPerSecond {
    fn from(tph: TonnesPerHour) -> Self {
        // 1 t/h = 1000 kg / 3600 s
        KgPerSecond(tph.0 / 3.6)
    }
}

impl From<KgPerSecond> for TonnesPerHour {
    fn from(kgs: KgPerSecond) -> Self {
        TonnesPerHour(kgs.0 * 3.6)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Metres);
impl_arithmetic!(Watts);
impl_arithmetic!(KiloWatts);
impl_arithmetic!(Newtons);
impl_arithmetic!(NewtonMetres);
impl_arithmetic!(Rpm);
impl_arithmetic!(RadiansPerSecond);
impl_arithmetic!(Degrees);
impl_arithmetic!(Radians);
impl_arithmetic!(MetresPerSecond);
impl_arithmetic!(TonnesPerHour);
impl_arithmetic!(KgPerSecond);

// ============================================================================
// Cross-unit Relations
// ============================================================================

impl NewtonMetres {
    /// Tangential force at a given radius: F = T / r
    pub fn force_at_radius(self, radius: Metres) -> Newtons {
        Newtons(self.0 / radius.0)
    }
}

impl Watts {
    /// Torque delivered at a given angular velocity: T = P / ω
    pub fn torque_at(self, speed: RadiansPerSecond) -> NewtonMetres {
        NewtonMetres(self.0 / speed.0)
    }

    /// Force transmitted at a given linear speed: F = P / v
    pub fn force_at(self, speed: MetresPerSecond) -> Newtons {
        Newtons(self.0 / speed.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kilowatts_to_watts() {
        let kw = KiloWatts(1.5);
        let w: Watts = kw.into();
        assert_eq!(w.0, 1500.0);
    }

    #[test]
    fn test_rpm_to_angular_velocity() {
        let omega: RadiansPerSecond = Rpm(60.0).into();
        assert!((omega.0 - 2.0 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_mass_flow_conversion() {
        let flow: KgPerSecond = TonnesPerHour(36.0).into();
        assert!((flow.0 - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_unit_relations() {
        let force = NewtonMetres(500.0).force_at_radius(Metres(0.25));
        assert_eq!(force.0, 2000.0);

        let torque = Watts(1000.0).torque_at(RadiansPerSecond(10.0));
        assert_eq!(torque.0, 100.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = KiloWatts(10.0);
        let b = KiloWatts(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let radius = Metres(0.25);
        let json = serde_json::to_string(&radius).unwrap();
        assert_eq!(json, "0.25");

        let roundtrip: Metres = serde_json::from_str(&json).unwrap();
        assert_eq!(radius, roundtrip);
    }
}
