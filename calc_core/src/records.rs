//! # Saved Calculation Records
//!
//! A [`CalculationRecord`] captures one evaluated calculator: which
//! calculator ran, the cleaned inputs, the result and when it was saved.
//! Records are stored together in a [`RecordFile`], a human-readable JSON
//! document (see [`crate::file_io`] for atomic saves and locking).
//!
//! ## Structure
//!
//! ```text
//! RecordFile
//! ├── version: schema version
//! └── records: Vec<CalculationRecord> (newest first)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::calculations::{CalculationResult, CalculatorKind};

/// Current schema version for results files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// A saved calculation result.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "9b2f0c4e-6c1d-4f7a-9d55-1f1e2b3c4d5e",
///   "calculator": "pulley_torque",
///   "input_data": { "power": 15.0, "rotational_speed": 1450.0 },
///   "result": {
///     "title": "Pulley torque",
///     "description": "Shaft torque delivered to the pulley.",
///     "value": 98.8,
///     "units": "N·m"
///   },
///   "created_at": "2025-01-15T10:30:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: Uuid,
    pub calculator: CalculatorKind,

    /// Cleaned input values used for the calculation
    pub input_data: Value,

    pub result: CalculationResult,
    pub created_at: DateTime<Utc>,
}

impl CalculationRecord {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(calculator: CalculatorKind, input_data: Value, result: CalculationResult) -> Self {
        CalculationRecord {
            id: Uuid::new_v4(),
            calculator,
            input_data,
            result,
            created_at: Utc::now(),
        }
    }
}

/// Root container serialized to the results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFile {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Saved records, newest first
    pub records: Vec<CalculationRecord>,
}

impl RecordFile {
    pub fn new() -> Self {
        RecordFile {
            version: SCHEMA_VERSION.to_string(),
            records: Vec::new(),
        }
    }

    /// Insert a record, keep newest-first order and drop anything beyond `max_records`.
    pub fn insert(&mut self, record: CalculationRecord, max_records: usize) {
        self.records.push(record);
        self.records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.records.truncate(max_records);
    }

    /// Records for a single calculator, newest first
    pub fn for_calculator(&self, kind: CalculatorKind) -> impl Iterator<Item = &CalculationRecord> {
        self.records.iter().filter(move |r| r.calculator == kind)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for RecordFile {
    fn default() -> Self {
        RecordFile::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn record_at(kind: CalculatorKind, minutes_ago: i64) -> CalculationRecord {
        let mut record = CalculationRecord::new(
            kind,
            json!({}),
            CalculationResult::new("t", "d", 1.0, "kW"),
        );
        record.created_at = Utc::now() - Duration::minutes(minutes_ago);
        record
    }

    #[test]
    fn test_insert_keeps_newest_first() {
        let mut file = RecordFile::new();
        file.insert(record_at(CalculatorKind::BeltPower, 10), 10);
        file.insert(record_at(CalculatorKind::BeltTension, 0), 10);
        file.insert(record_at(CalculatorKind::PulleyTorque, 5), 10);

        let kinds: Vec<_> = file.records.iter().map(|r| r.calculator).collect();
        assert_eq!(
            kinds,
            vec![
                CalculatorKind::BeltTension,
                CalculatorKind::PulleyTorque,
                CalculatorKind::BeltPower
            ]
        );
    }

    #[test]
    fn test_insert_caps_length() {
        let mut file = RecordFile::new();
        for minutes in 0..5 {
            file.insert(record_at(CalculatorKind::BeltPower, minutes), 3);
        }
        assert_eq!(file.len(), 3);
    }

    #[test]
    fn test_filter_by_calculator() {
        let mut file = RecordFile::new();
        file.insert(record_at(CalculatorKind::BeltPower, 1), 10);
        file.insert(record_at(CalculatorKind::PulleyTorque, 2), 10);
        assert_eq!(file.for_calculator(CalculatorKind::PulleyTorque).count(), 1);
    }

    #[test]
    fn test_serialization() {
        let record = record_at(CalculatorKind::PulleyTorque, 0);
        let json = serde_json::to_string_pretty(&record).unwrap();
        assert!(json.contains("\"calculator\": \"pulley_torque\""));
        let roundtrip: CalculationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, roundtrip);
    }
}
