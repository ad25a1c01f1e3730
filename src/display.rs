//! Display state for the paired device.
//!
//! Folds received payloads into the three lines a companion screen shows.
//! Fields only move off their placeholder text once a payload carries the
//! matching metric, so a missing metric keeps its line readable instead of
//! showing a fabricated value.

use crate::core::stress::stress_score;
use crate::payload::MetricPayload;
use chrono::{DateTime, Utc};

/// Placeholder shown before any SDNN arrives.
pub const NO_HRV_TEXT: &str = "No HRV Data";

/// Placeholder shown before any RMSSD arrives.
pub const NO_RMSSD_TEXT: &str = "No RMSSD Data";

/// Placeholder shown before any stress score can be derived.
pub const UNKNOWN_STRESS_TEXT: &str = "Unknown";

/// The lines a paired display renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    /// SDNN line, e.g. `HRV: 31.00 ms`
    pub hrv_line: String,
    /// RMSSD line, e.g. `RMSSD: 42.50 ms`
    pub rmssd_line: String,
    /// Stress line, e.g. `Stress Level: 15/100`
    pub stress_line: String,
    last_update: Option<DateTime<Utc>>,
    payloads_applied: u64,
}

impl DisplayState {
    pub fn new() -> Self {
        Self {
            hrv_line: NO_HRV_TEXT.to_string(),
            rmssd_line: NO_RMSSD_TEXT.to_string(),
            stress_line: UNKNOWN_STRESS_TEXT.to_string(),
            last_update: None,
            payloads_applied: 0,
        }
    }

    /// Fold one received payload into the display.
    ///
    /// The stress line prefers the score carried in the payload and falls
    /// back to deriving one from the received RMSSD.
    pub fn apply(&mut self, payload: &MetricPayload) {
        if let Some(sdnn) = payload.sdnn_ms() {
            self.hrv_line = format!("HRV: {sdnn:.2} ms");
        }
        if let Some(rmssd) = payload.rmssd_ms() {
            self.rmssd_line = format!("RMSSD: {rmssd:.2} ms");
        }
        let stress = payload
            .stress
            .or_else(|| payload.rmssd_ms().map(stress_score));
        if let Some(stress) = stress {
            self.stress_line = format!("Stress Level: {stress}/100");
        }
        self.last_update = Some(Utc::now());
        self.payloads_applied += 1;
    }

    /// The three display lines, newline joined.
    pub fn render(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.hrv_line, self.rmssd_line, self.stress_line
        )
    }

    /// When the last payload was applied.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Number of payloads folded in so far.
    pub fn payloads_applied(&self) -> u64 {
        self.payloads_applied
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}
