//! # calc_core - Belt Drive Calculation Engine
//!
//! `calc_core` is the computational heart of Beltworks: closed-form conveyor
//! drive calculators and the shaft geometry editor, behind a clean,
//! JSON-friendly API. Every input and output type implements
//! Serialize/Deserialize, so the same engine serves the web front end, the
//! CLI and API clients.
//!
//! ## Design Philosophy
//!
//! - **Stateless calculators**: Pure functions that take input and return results
//! - **DOM-free editor**: The shaft editor is a plain state machine; front ends render it
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::calculations::pulley_torque::{calculate, PulleyTorqueInput};
//!
//! let result = calculate(&PulleyTorqueInput { power: 15.0, rotational_speed: 1450.0 }).unwrap();
//! println!("{}", result); // Pulley torque: 98.8 N·m
//!
//! // Serialize to JSON for transmission
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Belt power, pulley torque and belt tension calculators
//! - [`shaft`] - Shaft segment model, codec, table, preview, summary and editor
//! - [`records`] - Saved calculation results
//! - [`file_io`] - Results file operations with atomic saves and locking
//! - [`format`] - Display rounding helpers
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod errors;
pub mod file_io;
pub mod format;
pub mod records;
pub mod shaft;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationResult, CalculatorKind};
pub use errors::{CalcError, CalcResult};
pub use file_io::{append_record, load_records, save_records, FileLock};
pub use records::{CalculationRecord, RecordFile};
pub use shaft::{Segment, ShaftEditor};
