//! Heart rate variability extraction.
//!
//! Turns a short run of heart-rate samples into successive RR intervals and
//! the time-domain statistics derived from them. Heart-rate monitors report
//! smoothed bpm rather than raw beat times, so each interval here is the
//! idealized beat spacing implied by one bpm reading.

use crate::core::stress::stress_score;
use crate::source::types::HeartRateSample;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Adjacent samples further apart than this are treated as separate runs
/// and produce no interval.
pub const MAX_PAIR_GAP_SECS: f64 = 2.0;

/// Fewer successive intervals than this cannot express variability.
pub const MIN_INTERVALS: usize = 2;

/// Declared ordering of a sample slice handed to the pipeline.
///
/// Sensor-store queries deliver newest-first; replayed recordings are
/// chronological. Callers state which they hold and the pipeline normalizes,
/// so a mislabeled slice is the only way to corrupt pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOrder {
    /// Most recent sample at index 0.
    NewestFirst,
    /// Oldest sample at index 0.
    OldestFirst,
}

/// Successive RR intervals in milliseconds, chronological.
///
/// Each adjacent chronological pair closer together than
/// [`MAX_PAIR_GAP_SECS`] contributes one interval, derived from the earlier
/// sample of the pair: `60.0 / bpm * 1000.0`. Pairs whose earlier sample has
/// a non-positive or non-finite bpm are skipped. The result is chronological
/// regardless of the input ordering.
pub fn rr_intervals(samples: &[HeartRateSample], order: SampleOrder) -> Vec<f64> {
    let mut intervals = Vec::with_capacity(samples.len().saturating_sub(1));
    match order {
        SampleOrder::OldestFirst => {
            for pair in samples.windows(2) {
                push_interval(&mut intervals, &pair[0], &pair[1]);
            }
        }
        SampleOrder::NewestFirst => {
            for i in (1..samples.len()).rev() {
                push_interval(&mut intervals, &samples[i], &samples[i - 1]);
            }
        }
    }
    intervals
}

fn push_interval(out: &mut Vec<f64>, earlier: &HeartRateSample, later: &HeartRateSample) {
    let gap_secs = (later.timestamp - earlier.timestamp)
        .num_milliseconds()
        .abs() as f64
        / 1000.0;
    if gap_secs < MAX_PAIR_GAP_SECS && earlier.is_valid() {
        out.push(60.0 / earlier.bpm * 1000.0);
    }
}

/// Root mean square of successive differences, in milliseconds.
///
/// Returns `0.0` when fewer than [`MIN_INTERVALS`] intervals are available.
pub fn rmssd(rr_ms: &[f64]) -> f64 {
    if rr_ms.len() < MIN_INTERVALS {
        return 0.0;
    }
    let squared_diffs: Vec<f64> = rr_ms.windows(2).map(|w| (w[1] - w[0]).powi(2)).collect();
    squared_diffs.mean().sqrt()
}

/// Standard deviation of the intervals (population form), in milliseconds.
///
/// Returns `0.0` when fewer than [`MIN_INTERVALS`] intervals are available.
pub fn sdnn(rr_ms: &[f64]) -> f64 {
    if rr_ms.len() < MIN_INTERVALS {
        return 0.0;
    }
    rr_ms.population_std_dev()
}

/// One scored evaluation of a sample window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrvSummary {
    /// Root mean square of successive differences, ms
    pub rmssd_ms: f64,
    /// Standard deviation of RR intervals, ms
    pub sdnn_ms: f64,
    /// Mapped stress score, 0..=100
    pub stress: u8,
    /// Samples the window held when evaluated
    pub samples_used: usize,
    /// RR intervals that survived the pairing gate
    pub intervals_used: usize,
}

/// Outcome of evaluating a sample window.
///
/// A window too sparse to pair yields [`HrvReading::Insufficient`] rather
/// than a score, so downstream surfaces can say "unknown" instead of
/// presenting a number derived from nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HrvReading {
    /// Not enough pairable samples to evaluate.
    Insufficient,
    /// A computed summary.
    Scored(HrvSummary),
}

impl HrvReading {
    /// The summary, when one was computed.
    pub fn summary(&self) -> Option<&HrvSummary> {
        match self {
            HrvReading::Scored(summary) => Some(summary),
            HrvReading::Insufficient => None,
        }
    }

    /// Whether the window could not be evaluated.
    pub fn is_insufficient(&self) -> bool {
        matches!(self, HrvReading::Insufficient)
    }
}

/// Evaluate a sample window end to end.
///
/// Windows with fewer than two samples, or whose pairs are all rejected by
/// the gap gate, are [`HrvReading::Insufficient`]. A single surviving
/// interval is still scored; its RMSSD is `0.0` by definition.
pub fn evaluate(samples: &[HeartRateSample], order: SampleOrder) -> HrvReading {
    if samples.len() < 2 {
        return HrvReading::Insufficient;
    }
    let intervals = rr_intervals(samples, order);
    if intervals.is_empty() {
        return HrvReading::Insufficient;
    }
    let rmssd_ms = rmssd(&intervals);
    HrvReading::Scored(HrvSummary {
        rmssd_ms,
        sdnn_ms: sdnn(&intervals),
        stress: stress_score(rmssd_ms),
        samples_used: samples.len(),
        intervals_used: intervals.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn chronological(bpms: &[f64], spacing_secs: i64) -> Vec<HeartRateSample> {
        let base = Utc::now();
        bpms.iter()
            .enumerate()
            .map(|(i, &bpm)| {
                HeartRateSample::at(base + Duration::seconds(i as i64 * spacing_secs), bpm)
            })
            .collect()
    }

    #[test]
    fn test_rr_from_bpm() {
        let samples = chronological(&[60.0, 80.0, 75.0], 1);
        let rr = rr_intervals(&samples, SampleOrder::OldestFirst);
        assert_eq!(rr.len(), 2);
        assert_close(rr[0], 1000.0);
        assert_close(rr[1], 750.0);
    }

    #[test]
    fn test_orderings_agree() {
        let samples = chronological(&[62.0, 65.0, 61.0, 70.0, 66.0], 1);
        let mut reversed = samples.clone();
        reversed.reverse();

        let forward = rr_intervals(&samples, SampleOrder::OldestFirst);
        let backward = rr_intervals(&reversed, SampleOrder::NewestFirst);
        assert_eq!(forward, backward);
        assert_close(rmssd(&forward), rmssd(&backward));
    }

    #[test]
    fn test_gap_gate_is_strict() {
        let base = Utc::now();
        let samples = vec![
            HeartRateSample::at(base, 60.0),
            HeartRateSample::at(base + Duration::milliseconds(1999), 61.0),
            HeartRateSample::at(base + Duration::milliseconds(3999), 62.0),
        ];
        // First pair is 1.999s apart, second exactly 2.0s.
        let rr = rr_intervals(&samples, SampleOrder::OldestFirst);
        assert_eq!(rr.len(), 1);
        assert_close(rr[0], 1000.0);
    }

    #[test]
    fn test_non_positive_bpm_is_skipped() {
        let samples = chronological(&[60.0, 0.0, 75.0], 1);
        let rr = rr_intervals(&samples, SampleOrder::OldestFirst);
        // The 0 bpm sample is earlier in one pair and produces nothing.
        assert_eq!(rr.len(), 1);
        assert_close(rr[0], 1000.0);
        assert!(rr.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rmssd_steady_rate_is_zero() {
        let samples = chronological(&[72.0, 72.0, 72.0, 72.0], 1);
        let rr = rr_intervals(&samples, SampleOrder::OldestFirst);
        assert_close(rmssd(&rr), 0.0);
    }

    #[test]
    fn test_rmssd_known_value() {
        // 1000ms and 800ms intervals give one diff of 200ms.
        let rr = vec![1000.0, 800.0];
        assert_close(rmssd(&rr), 200.0);

        // Diffs of 100 and -100: sqrt((100^2 + 100^2) / 2) = 100.
        let rr = vec![900.0, 1000.0, 900.0];
        assert_close(rmssd(&rr), 100.0);
    }

    #[test]
    fn test_rmssd_single_interval_is_zero() {
        assert_close(rmssd(&[1000.0]), 0.0);
        assert_close(rmssd(&[]), 0.0);
    }

    #[test]
    fn test_sdnn_known_value() {
        // Population std dev of [900, 1100] is 100.
        assert_close(sdnn(&[900.0, 1100.0]), 100.0);
        assert_close(sdnn(&[1000.0]), 0.0);
    }

    #[test]
    fn test_evaluate_too_few_samples() {
        let samples = chronological(&[70.0], 1);
        assert!(evaluate(&samples, SampleOrder::OldestFirst).is_insufficient());
        assert!(evaluate(&[], SampleOrder::NewestFirst).is_insufficient());
    }

    #[test]
    fn test_evaluate_all_pairs_gapped() {
        let samples = chronological(&[70.0, 71.0, 72.0], 10);
        assert!(evaluate(&samples, SampleOrder::OldestFirst).is_insufficient());
    }

    #[test]
    fn test_evaluate_single_interval_scores_zero_rmssd() {
        let samples = chronological(&[60.0, 61.0], 1);
        let reading = evaluate(&samples, SampleOrder::OldestFirst);
        let summary = reading.summary().expect("two samples should score");
        assert_close(summary.rmssd_ms, 0.0);
        assert_eq!(summary.stress, 100);
        assert_eq!(summary.intervals_used, 1);
    }

    #[test]
    fn test_evaluate_full_window() {
        let samples = chronological(&[60.0, 80.0, 60.0, 80.0, 60.0], 1);
        let reading = evaluate(&samples, SampleOrder::OldestFirst);
        let summary = reading.summary().expect("window should score");
        // Intervals alternate 1000/750, every diff is 250ms.
        assert_close(summary.rmssd_ms, 250.0);
        assert_eq!(summary.stress, 0);
        assert_eq!(summary.samples_used, 5);
        assert_eq!(summary.intervals_used, 4);
    }

    #[test]
    fn test_reading_serializes_with_status_tag() {
        let insufficient = serde_json::to_string(&HrvReading::Insufficient).unwrap();
        assert!(insufficient.contains("insufficient"));

        let scored = HrvReading::Scored(HrvSummary {
            rmssd_ms: 42.0,
            sdnn_ms: 30.0,
            stress: 16,
            samples_used: 10,
            intervals_used: 9,
        });
        let json = serde_json::to_string(&scored).unwrap();
        assert!(json.contains("\"status\":\"scored\""));
        assert!(json.contains("\"rmssd_ms\":42.0"));
    }
}
