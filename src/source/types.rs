//! Sample types emitted by heart-rate and activity sources.
//!
//! These mirror what a wearable health store hands out: instantaneous
//! heart-rate readings and cumulative activity increments, both timestamped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single heart-rate observation.
///
/// `bpm` is the instantaneous beats-per-minute value reported by the sensor.
/// Samples are immutable once observed and ordered by `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Timestamp when the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Beats per minute
    pub bpm: f64,
}

impl HeartRateSample {
    /// Create a sample timestamped now.
    pub fn new(bpm: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            bpm,
        }
    }

    /// Create a sample at an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>, bpm: f64) -> Self {
        Self { timestamp, bpm }
    }

    /// Whether the reading can be converted into a beat interval.
    ///
    /// Zero, negative, and non-finite bpm values are excluded before any
    /// `60 / bpm` conversion.
    pub fn is_valid(&self) -> bool {
        self.bpm.is_finite() && self.bpm > 0.0
    }
}

/// Activity quantity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    /// Step count increment
    Steps,
    /// Active energy burned, kilocalories
    ActiveEnergy,
    /// Exercise time, minutes
    ExerciseMinutes,
}

/// A cumulative activity increment.
///
/// Daily totals are the sum of all increments of a kind since midnight UTC;
/// individual samples carry partial amounts, not running totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivitySample {
    /// Timestamp when the increment was recorded
    pub timestamp: DateTime<Utc>,
    /// Quantity classification
    pub kind: ActivityKind,
    /// Increment amount in the kind's unit
    pub value: f64,
}

impl ActivitySample {
    /// Create an increment timestamped now.
    pub fn new(kind: ActivityKind, value: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            value,
        }
    }

    /// Create an increment at an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>, kind: ActivityKind, value: f64) -> Self {
        Self {
            timestamp,
            kind,
            value,
        }
    }
}

/// Unified sample type for sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SensorSample {
    HeartRate(HeartRateSample),
    Activity(ActivitySample),
}

impl SensorSample {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SensorSample::HeartRate(s) => s.timestamp,
            SensorSample::Activity(s) => s.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heart_rate_sample_validity() {
        assert!(HeartRateSample::new(72.0).is_valid());
        assert!(!HeartRateSample::new(0.0).is_valid());
        assert!(!HeartRateSample::new(-30.0).is_valid());
        assert!(!HeartRateSample::new(f64::NAN).is_valid());
        assert!(!HeartRateSample::new(f64::INFINITY).is_valid());
    }

    #[test]
    fn test_sensor_sample_timestamp() {
        let ts = Utc::now();
        let hr = SensorSample::HeartRate(HeartRateSample::at(ts, 60.0));
        let act = SensorSample::Activity(ActivitySample::at(ts, ActivityKind::Steps, 12.0));

        assert_eq!(hr.timestamp(), ts);
        assert_eq!(act.timestamp(), ts);
    }

    #[test]
    fn test_sample_serialization_round_trip() {
        let sample = SensorSample::HeartRate(HeartRateSample::new(68.5));
        let json = serde_json::to_string(&sample).unwrap();
        let back: SensorSample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }
}
