//! Session accounting.
//!
//! Tracks what a monitoring session observed and produced without retaining
//! any of the underlying samples. Counters only: the log can be shown to the
//! user or persisted across runs, and never holds biosignal data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current monitoring session.
#[derive(Debug)]
pub struct SessionLog {
    /// Heart-rate samples observed
    heart_rate_samples: AtomicU64,
    /// Activity samples observed
    activity_samples: AtomicU64,
    /// Windows evaluated, scored or not
    windows_evaluated: AtomicU64,
    /// Windows that held too little data to score
    insufficient_windows: AtomicU64,
    /// Payloads sent over the display link
    payloads_sent: AtomicU64,
    /// Payloads folded into a display
    payloads_displayed: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl SessionLog {
    /// Create a new session log.
    pub fn new() -> Self {
        Self {
            heart_rate_samples: AtomicU64::new(0),
            activity_samples: AtomicU64::new(0),
            windows_evaluated: AtomicU64::new(0),
            insufficient_windows: AtomicU64::new(0),
            payloads_sent: AtomicU64::new(0),
            payloads_displayed: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a session log with persistence.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        // Try to load existing stats
        if let Err(e) = log.load() {
            eprintln!("Note: Could not load previous session stats: {e}");
        }

        log
    }

    /// Record an observed heart-rate sample.
    pub fn record_heart_rate_sample(&self) {
        self.heart_rate_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an observed activity sample.
    pub fn record_activity_sample(&self) {
        self.activity_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an evaluated window.
    pub fn record_window_evaluated(&self) {
        self.windows_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a window that could not be scored.
    pub fn record_insufficient_window(&self) {
        self.insufficient_windows.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a payload sent over the link.
    pub fn record_payload_sent(&self) {
        self.payloads_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a payload applied to a display.
    pub fn record_payload_displayed(&self) {
        self.payloads_displayed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            heart_rate_samples: self.heart_rate_samples.load(Ordering::Relaxed),
            activity_samples: self.activity_samples.load(Ordering::Relaxed),
            windows_evaluated: self.windows_evaluated.load(Ordering::Relaxed),
            insufficient_windows: self.insufficient_windows.load(Ordering::Relaxed),
            payloads_sent: self.payloads_sent.load(Ordering::Relaxed),
            payloads_displayed: self.payloads_displayed.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds() as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Heart rate samples observed: {}\n\
             - Activity samples observed: {}\n\
             - Windows evaluated: {}\n\
             - Windows with insufficient data: {}\n\
             - Payloads sent: {}\n\
             - Payloads displayed: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Data Handling:\n\
             - Raw samples never leave the process\n\
             - Only derived metrics cross the display link\n\
             - Scores are wellness estimates, not medical measurements",
            stats.heart_rate_samples,
            stats.activity_samples,
            stats.windows_evaluated,
            stats.insufficient_windows,
            stats.payloads_sent,
            stats.payloads_displayed,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                heart_rate_samples: stats.heart_rate_samples,
                activity_samples: stats.activity_samples,
                windows_evaluated: stats.windows_evaluated,
                insufficient_windows: stats.insufficient_windows,
                payloads_sent: stats.payloads_sent,
                payloads_displayed: stats.payloads_displayed,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.heart_rate_samples
                    .store(persisted.heart_rate_samples, Ordering::Relaxed);
                self.activity_samples
                    .store(persisted.activity_samples, Ordering::Relaxed);
                self.windows_evaluated
                    .store(persisted.windows_evaluated, Ordering::Relaxed);
                self.insufficient_windows
                    .store(persisted.insufficient_windows, Ordering::Relaxed);
                self.payloads_sent
                    .store(persisted.payloads_sent, Ordering::Relaxed);
                self.payloads_displayed
                    .store(persisted.payloads_displayed, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.heart_rate_samples.store(0, Ordering::Relaxed);
        self.activity_samples.store(0, Ordering::Relaxed);
        self.windows_evaluated.store(0, Ordering::Relaxed);
        self.insufficient_windows.store(0, Ordering::Relaxed);
        self.payloads_sent.store(0, Ordering::Relaxed);
        self.payloads_displayed.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub heart_rate_samples: u64,
    pub activity_samples: u64,
    pub windows_evaluated: u64,
    pub insufficient_windows: u64,
    pub payloads_sent: u64,
    pub payloads_displayed: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    heart_rate_samples: u64,
    activity_samples: u64,
    windows_evaluated: u64,
    insufficient_windows: u64,
    payloads_sent: u64,
    payloads_displayed: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared session log.
pub type SharedSessionLog = Arc<SessionLog>;

/// Create a new shared session log.
pub fn create_shared_log() -> SharedSessionLog {
    Arc::new(SessionLog::new())
}

/// Create a new shared session log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedSessionLog {
    Arc::new(SessionLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_log_counting() {
        let log = SessionLog::new();

        log.record_heart_rate_sample();
        log.record_heart_rate_sample();
        log.record_window_evaluated();
        log.record_payload_sent();

        let stats = log.stats();
        assert_eq!(stats.heart_rate_samples, 2);
        assert_eq!(stats.windows_evaluated, 1);
        assert_eq!(stats.payloads_sent, 1);
        assert_eq!(stats.payloads_displayed, 0);
    }

    #[test]
    fn test_session_log_reset() {
        let log = SessionLog::new();

        for _ in 0..100 {
            log.record_heart_rate_sample();
        }
        log.record_insufficient_window();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.heart_rate_samples, 0);
        assert_eq!(stats.insufficient_windows, 0);
    }

    #[test]
    fn test_summary_format() {
        let log = SessionLog::new();
        let summary = log.summary();

        assert!(summary.contains("Heart rate samples observed"));
        assert!(summary.contains("Windows evaluated"));
        assert!(summary.contains("Data Handling"));
        assert!(summary.contains("not medical measurements"));
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = std::env::temp_dir().join("pulselink-session-test");
        let path = dir.join("stats.json");
        let _ = std::fs::remove_file(&path);

        {
            let log = SessionLog::with_persistence(path.clone());
            log.record_heart_rate_sample();
            log.record_payload_sent();
            log.save().unwrap();
        }

        let reloaded = SessionLog::with_persistence(path.clone());
        let stats = reloaded.stats();
        assert_eq!(stats.heart_rate_samples, 1);
        assert_eq!(stats.payloads_sent, 1);

        let _ = std::fs::remove_file(&path);
    }
}
