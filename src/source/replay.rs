//! Replayed recording source.
//!
//! Reads serialized [`SensorSample`] lines from a JSONL file and feeds them
//! into the pipeline, either as fast as the consumer drains them or paced by
//! the recorded timestamps. Malformed lines are skipped, not fatal.

use crate::source::types::SensorSample;
use crate::source::{sleep_while_running, MonitorError};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::warn;

/// Longest pause honored between paced samples, whatever the recording says.
const MAX_PACED_GAP: Duration = Duration::from_secs(5);

/// A source that replays a recorded sample stream.
pub struct ReplayMonitor {
    path: PathBuf,
    paced: bool,
    sender: Sender<SensorSample>,
    receiver: Receiver<SensorSample>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReplayMonitor {
    /// Create a replay source for the given JSONL file, unpaced.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (sender, receiver) = bounded(10_000);
        Self {
            path: path.into(),
            paced: false,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Pace emission by the recorded timestamps.
    pub fn with_pacing(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Open the recording and start the worker thread.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(MonitorError::AlreadyRunning);
        }
        let file = File::open(&self.path)?;
        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        let running = self.running.clone();
        let paced = self.paced;

        self.handle = Some(thread::spawn(move || {
            replay_lines(BufReader::new(file), &sender, &running, paced);
            running.store(false, Ordering::SeqCst);
        }));

        Ok(())
    }

    /// Stop the worker thread and wait for it to finish.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Whether the recording is still being emitted.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for sensor samples.
    pub fn receiver(&self) -> &Receiver<SensorSample> {
        &self.receiver
    }
}

impl Drop for ReplayMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn replay_lines(
    reader: BufReader<File>,
    sender: &Sender<SensorSample>,
    running: &AtomicBool,
    paced: bool,
) {
    let mut previous: Option<DateTime<Utc>> = None;

    for line in reader.lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "replay read failed, stopping");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let sample: SensorSample = match serde_json::from_str(&line) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, "skipping malformed replay line");
                continue;
            }
        };

        if paced {
            if let Some(prev) = previous {
                let gap = (sample.timestamp() - prev)
                    .to_std()
                    .unwrap_or_default()
                    .min(MAX_PACED_GAP);
                sleep_while_running(running, gap);
            }
            previous = Some(sample.timestamp());
        }

        if sender.send(sample).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::types::{ActivityKind, ActivitySample, HeartRateSample};
    use chrono::Utc;

    fn write_recording(name: &str, lines: &[String]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pulselink-{}-{}.jsonl",
            name,
            std::process::id()
        ));
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_replays_samples_in_order() {
        let base = Utc::now();
        let lines = vec![
            serde_json::to_string(&SensorSample::HeartRate(HeartRateSample::at(base, 60.0)))
                .unwrap(),
            "not a sample".to_string(),
            String::new(),
            serde_json::to_string(&SensorSample::HeartRate(HeartRateSample::at(
                base + chrono::Duration::seconds(1),
                61.0,
            )))
            .unwrap(),
            serde_json::to_string(&SensorSample::Activity(ActivitySample::at(
                base + chrono::Duration::seconds(2),
                ActivityKind::Steps,
                12.0,
            )))
            .unwrap(),
        ];
        let path = write_recording("order", &lines);

        let mut monitor = ReplayMonitor::new(&path);
        monitor.start().unwrap();

        let mut samples = Vec::new();
        for _ in 0..3 {
            samples.push(
                monitor
                    .receiver()
                    .recv_timeout(Duration::from_secs(2))
                    .expect("replay should emit"),
            );
        }
        monitor.stop();

        match (&samples[0], &samples[1], &samples[2]) {
            (
                SensorSample::HeartRate(a),
                SensorSample::HeartRate(b),
                SensorSample::Activity(c),
            ) => {
                assert_eq!(a.bpm, 60.0);
                assert_eq!(b.bpm, 61.0);
                assert_eq!(c.value, 12.0);
            }
            other => panic!("unexpected replay order: {other:?}"),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_recording_fails_to_start() {
        let mut monitor = ReplayMonitor::new("/nonexistent/recording.jsonl");
        assert!(matches!(monitor.start(), Err(MonitorError::Io(_))));
        assert!(!monitor.is_running());
    }

    #[test]
    fn test_finishes_after_recording_ends() {
        let lines = vec![serde_json::to_string(&SensorSample::HeartRate(
            HeartRateSample::new(70.0),
        ))
        .unwrap()];
        let path = write_recording("finish", &lines);

        let mut monitor = ReplayMonitor::new(&path);
        monitor.start().unwrap();

        assert!(monitor
            .receiver()
            .recv_timeout(Duration::from_secs(2))
            .is_ok());

        // The worker clears the running flag once the file is exhausted.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while monitor.is_running() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!monitor.is_running());

        let _ = std::fs::remove_file(&path);
    }
}
