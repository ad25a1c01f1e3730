//! Daily activity totals.
//!
//! Activity samples arrive as increments (steps taken, energy burned,
//! exercise accrued since the previous sample). Totals reset at UTC
//! midnight, matching how the companion screen presents "today".

use crate::source::types::{ActivityKind, ActivitySample};
use chrono::{DateTime, NaiveTime, Utc};

/// Cumulative activity for one UTC day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailySummary {
    /// Start of the day the totals cover
    pub day_start: DateTime<Utc>,
    /// Steps taken
    pub steps: u64,
    /// Active energy burned, kcal
    pub calories_kcal: f64,
    /// Exercise accrued, minutes
    pub exercise_minutes: f64,
}

impl DailySummary {
    /// Total the increments that fall in the current UTC day, up to `now`.
    pub fn aggregate(samples: &[ActivitySample], now: DateTime<Utc>) -> Self {
        let day_start = utc_day_start(now);
        let mut steps = 0.0_f64;
        let mut calories = 0.0_f64;
        let mut exercise = 0.0_f64;

        for sample in samples {
            if sample.timestamp < day_start || sample.timestamp > now {
                continue;
            }
            match sample.kind {
                ActivityKind::Steps => steps += sample.value,
                ActivityKind::ActiveEnergy => calories += sample.value,
                ActivityKind::ExerciseMinutes => exercise += sample.value,
            }
        }

        Self {
            day_start,
            steps: steps.max(0.0).round() as u64,
            calories_kcal: calories,
            exercise_minutes: exercise,
        }
    }

    /// Step count as shown on the companion screen.
    pub fn steps_text(&self) -> String {
        self.steps.to_string()
    }

    /// Energy line as shown on the companion screen, whole kcal.
    pub fn calories_text(&self) -> String {
        format!("{} kcal", self.calories_kcal as u64)
    }

    /// Exercise line as shown on the companion screen, whole minutes.
    pub fn exercise_text(&self) -> String {
        format!("{} min", self.exercise_minutes as u64)
    }
}

/// UTC midnight of the day containing `now`.
pub fn utc_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn test_aggregate_sums_by_kind() {
        let samples = vec![
            ActivitySample::at(at(8, 0), ActivityKind::Steps, 120.0),
            ActivitySample::at(at(9, 0), ActivityKind::Steps, 80.0),
            ActivitySample::at(at(9, 0), ActivityKind::ActiveEnergy, 35.5),
            ActivitySample::at(at(10, 0), ActivityKind::ExerciseMinutes, 12.0),
        ];

        let summary = DailySummary::aggregate(&samples, at(11, 0));
        assert_eq!(summary.steps, 200);
        assert_eq!(summary.calories_kcal, 35.5);
        assert_eq!(summary.exercise_minutes, 12.0);
        assert_eq!(summary.day_start, at(0, 0));
    }

    #[test]
    fn test_aggregate_excludes_previous_day() {
        let yesterday = Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 0).unwrap();
        let samples = vec![
            ActivitySample::at(yesterday, ActivityKind::Steps, 500.0),
            ActivitySample::at(at(7, 30), ActivityKind::Steps, 100.0),
        ];

        let summary = DailySummary::aggregate(&samples, at(8, 0));
        assert_eq!(summary.steps, 100);
    }

    #[test]
    fn test_aggregate_excludes_future_samples() {
        let samples = vec![
            ActivitySample::at(at(8, 0), ActivityKind::ActiveEnergy, 10.0),
            ActivitySample::at(at(12, 0), ActivityKind::ActiveEnergy, 99.0),
        ];

        let summary = DailySummary::aggregate(&samples, at(9, 0));
        assert_eq!(summary.calories_kcal, 10.0);
    }

    #[test]
    fn test_empty_day_is_zeroed() {
        let summary = DailySummary::aggregate(&[], at(6, 0));
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.calories_kcal, 0.0);
        assert_eq!(summary.exercise_minutes, 0.0);
    }

    #[test]
    fn test_display_texts_truncate() {
        let summary = DailySummary {
            day_start: at(0, 0),
            steps: 4321,
            calories_kcal: 312.9,
            exercise_minutes: 47.8,
        };
        assert_eq!(summary.steps_text(), "4321");
        assert_eq!(summary.calories_text(), "312 kcal");
        assert_eq!(summary.exercise_text(), "47 min");
    }
}
