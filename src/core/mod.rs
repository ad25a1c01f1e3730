//! Core functionality for the pulselink pipeline.
//!
//! This module contains:
//! - The recency window over heart-rate samples
//! - RR interval extraction and HRV statistics
//! - The RMSSD to stress score mapping

pub mod hrv;
pub mod stress;
pub mod window;

// Re-export commonly used types
pub use hrv::{
    evaluate, rmssd, rr_intervals, sdnn, HrvReading, HrvSummary, SampleOrder, MAX_PAIR_GAP_SECS,
    MIN_INTERVALS,
};
pub use stress::{stress_score, MAX_STRESS, RMSSD_SCALE};
pub use window::SampleWindow;
