//! # Numeric Formatting
//!
//! Display helpers shared by the shaft editor and the calculators.
//!
//! Displayed editor values are rounded to one decimal place. A machine
//! epsilon is added before rounding so that values such as `1.05`, which
//! are stored as `1.0499999...`, still round up. Ties round away from zero.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::format::{round_one_decimal, format_one_decimal};
//!
//! assert_eq!(round_one_decimal(1.05), 1.1);
//! assert_eq!(format_one_decimal(20.0), "20.0");
//! ```

/// Round to one decimal place (epsilon-corrected, ties away from zero).
pub fn round_one_decimal(value: f64) -> f64 {
    ((value + f64::EPSILON) * 10.0).round() / 10.0
}

/// Round to one decimal place and render with exactly one fractional digit.
pub fn format_one_decimal(value: f64) -> String {
    format!("{:.1}", round_one_decimal(value))
}

/// Round to a fixed number of decimal places (ties away from zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Render a value rounded to a whole number with `,` thousands separators.
///
/// ```rust
/// use calc_core::format::format_thousands;
///
/// assert_eq!(format_thousands(12345.6), "12,346");
/// assert_eq!(format_thousands(-1500.0), "-1,500");
/// ```
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
