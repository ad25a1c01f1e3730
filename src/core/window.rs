//! Recency window over heart-rate samples.
//!
//! Models the sensor-store query the pipeline consumes: the most recent
//! samples (at most a configured count) within a bounded look-back horizon,
//! returned newest-first.

use crate::source::types::HeartRateSample;
use chrono::{DateTime, Duration, Utc};

/// Hard cap on retained samples, independent of the look-back horizon.
const STORE_CAP: usize = 4096;

/// Buffer of recent heart-rate samples with bounded retention.
///
/// Samples are kept in chronological order. Retention is bounded both by the
/// look-back horizon (relative to the newest sample) and by [`STORE_CAP`].
/// The buffer holds no derived state; every query is independent.
pub struct SampleWindow {
    /// Stored samples, oldest first
    samples: Vec<HeartRateSample>,
    /// Maximum number of samples a query returns
    sample_limit: usize,
    /// Look-back horizon for queries and retention
    lookback: Duration,
}

impl SampleWindow {
    /// Create a window with the given query limit and look-back in seconds.
    pub fn new(sample_limit: usize, lookback_secs: u64) -> Self {
        Self {
            samples: Vec::new(),
            sample_limit,
            lookback: Duration::seconds(lookback_secs as i64),
        }
    }

    /// Insert a sample, keeping the buffer chronological.
    ///
    /// Sources normally deliver in order, so this is an append; a late
    /// sample is placed by timestamp instead.
    pub fn push(&mut self, sample: HeartRateSample) {
        match self.samples.last() {
            Some(last) if sample.timestamp < last.timestamp => {
                let pos = self
                    .samples
                    .iter()
                    .rposition(|s| s.timestamp <= sample.timestamp)
                    .map(|p| p + 1)
                    .unwrap_or(0);
                self.samples.insert(pos, sample);
            }
            _ => self.samples.push(sample),
        }
        self.trim();
    }

    /// The most recent samples within the look-back horizon, newest-first,
    /// capped at the configured sample limit.
    ///
    /// This is the consume contract of the pipeline: callers downstream must
    /// treat the result as newest-first ordered.
    pub fn recent(&self, now: DateTime<Utc>) -> Vec<HeartRateSample> {
        let cutoff = now - self.lookback;
        self.samples
            .iter()
            .rev()
            .filter(|s| s.timestamp <= now)
            .take_while(|s| s.timestamp >= cutoff)
            .take(self.sample_limit)
            .copied()
            .collect()
    }

    /// The newest sample, if any.
    pub fn latest(&self) -> Option<&HeartRateSample> {
        self.samples.last()
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all retained samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Drop samples outside the look-back horizon or beyond the store cap.
    fn trim(&mut self) {
        if let Some(newest) = self.samples.last() {
            let cutoff = newest.timestamp - self.lookback;
            let keep_from = self
                .samples
                .iter()
                .position(|s| s.timestamp >= cutoff)
                .unwrap_or(0);
            if keep_from > 0 {
                self.samples.drain(..keep_from);
            }
        }
        if self.samples.len() > STORE_CAP {
            let excess = self.samples.len() - STORE_CAP;
            self.samples.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(base: DateTime<Utc>, offset_secs: i64, bpm: f64) -> HeartRateSample {
        HeartRateSample::at(base + Duration::seconds(offset_secs), bpm)
    }

    #[test]
    fn test_recent_is_newest_first() {
        let base = Utc::now();
        let mut window = SampleWindow::new(10, 300);
        for i in 0..5 {
            window.push(sample_at(base, i, 60.0 + i as f64));
        }

        let recent = window.recent(base + Duration::seconds(5));
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].bpm, 64.0);
        assert_eq!(recent[4].bpm, 60.0);
    }

    #[test]
    fn test_recent_honors_sample_limit() {
        let base = Utc::now();
        let mut window = SampleWindow::new(3, 300);
        for i in 0..10 {
            window.push(sample_at(base, i, 70.0));
        }

        let recent = window.recent(base + Duration::seconds(10));
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].timestamp, base + Duration::seconds(9));
    }

    #[test]
    fn test_recent_honors_lookback() {
        let base = Utc::now();
        let mut window = SampleWindow::new(10, 300);
        window.push(sample_at(base, 0, 60.0));
        window.push(sample_at(base, 200, 65.0));
        window.push(sample_at(base, 400, 70.0));

        // At t=400s the first sample is 400s old, outside the 300s horizon.
        let recent = window.recent(base + Duration::seconds(400));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].bpm, 70.0);
        assert_eq!(recent[1].bpm, 65.0);
    }

    #[test]
    fn test_recent_excludes_future_samples() {
        let base = Utc::now();
        let mut window = SampleWindow::new(10, 300);
        window.push(sample_at(base, 0, 60.0));
        window.push(sample_at(base, 60, 65.0));

        let recent = window.recent(base + Duration::seconds(30));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].bpm, 60.0);
    }

    #[test]
    fn test_out_of_order_push_sorts_by_timestamp() {
        let base = Utc::now();
        let mut window = SampleWindow::new(10, 300);
        window.push(sample_at(base, 2, 62.0));
        window.push(sample_at(base, 0, 60.0));
        window.push(sample_at(base, 1, 61.0));

        let recent = window.recent(base + Duration::seconds(3));
        let bpms: Vec<f64> = recent.iter().map(|s| s.bpm).collect();
        assert_eq!(bpms, vec![62.0, 61.0, 60.0]);
    }

    #[test]
    fn test_trim_drops_samples_outside_horizon() {
        let base = Utc::now();
        let mut window = SampleWindow::new(10, 60);
        window.push(sample_at(base, 0, 60.0));
        window.push(sample_at(base, 70, 61.0));
        window.push(sample_at(base, 120, 62.0));

        // Pushing a sample 120s in advances the horizon past the first one.
        assert_eq!(window.len(), 2);
        assert_eq!(window.latest().unwrap().bpm, 62.0);
    }
}
