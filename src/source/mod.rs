//! Sample sources for the pulselink pipeline.
//!
//! A source owns a worker thread that emits [`SensorSample`]s into a bounded
//! channel. The pipeline only ever consumes the channel, so simulated and
//! replayed sources are interchangeable at runtime.

pub mod replay;
pub mod simulated;
pub mod types;

// Re-export commonly used types
pub use replay::ReplayMonitor;
pub use simulated::{SimulatedConfig, SimulatedMonitor};
pub use types::{ActivityKind, ActivitySample, HeartRateSample, SensorSample};

use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Errors that can occur while running a sample source.
#[derive(Debug)]
pub enum MonitorError {
    /// The source is already emitting.
    AlreadyRunning,
    /// The source's backing data could not be read.
    Io(std::io::Error),
}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorError::AlreadyRunning => write!(f, "Monitor is already running"),
            MonitorError::Io(e) => write!(f, "Monitor I/O error: {e}"),
        }
    }
}

impl std::error::Error for MonitorError {}

impl From<std::io::Error> for MonitorError {
    fn from(e: std::io::Error) -> Self {
        MonitorError::Io(e)
    }
}

/// A sample source chosen at runtime.
pub enum Monitor {
    Simulated(SimulatedMonitor),
    Replay(ReplayMonitor),
}

impl Monitor {
    /// Start emitting samples.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        match self {
            Monitor::Simulated(m) => m.start(),
            Monitor::Replay(m) => m.start(),
        }
    }

    /// Stop emitting and join the worker.
    pub fn stop(&mut self) {
        match self {
            Monitor::Simulated(m) => m.stop(),
            Monitor::Replay(m) => m.stop(),
        }
    }

    /// Whether the source is still emitting.
    pub fn is_running(&self) -> bool {
        match self {
            Monitor::Simulated(m) => m.is_running(),
            Monitor::Replay(m) => m.is_running(),
        }
    }

    /// The channel samples arrive on.
    pub fn receiver(&self) -> &Receiver<SensorSample> {
        match self {
            Monitor::Simulated(m) => m.receiver(),
            Monitor::Replay(m) => m.receiver(),
        }
    }
}

/// Sleep in short slices so a cleared running flag cuts the wait short.
pub(crate) fn sleep_while_running(running: &AtomicBool, total: Duration) {
    let slice = Duration::from_millis(25);
    let mut remaining = total;
    while running.load(Ordering::SeqCst) && !remaining.is_zero() {
        let nap = remaining.min(slice);
        std::thread::sleep(nap);
        remaining -= nap;
    }
}
