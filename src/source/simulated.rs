//! Simulated wearable source.
//!
//! Emits a deterministic heart-rate wander plus periodic activity
//! increments, so the full pipeline can run on machines with no sensor
//! hardware. No randomness: two overlaid waves keep successive readings
//! different, which keeps derived variability nonzero.

use crate::source::types::{ActivityKind, ActivitySample, HeartRateSample, SensorSample};
use crate::source::{sleep_while_running, MonitorError};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// Resting baseline of the simulated wearer.
const BASE_BPM: f64 = 72.0;

/// Slow wander, on the scale of shifting posture or attention.
const SLOW_WAVE_AMPLITUDE_BPM: f64 = 6.0;
const SLOW_WAVE_PERIOD_SECS: f64 = 23.0;

/// Fast wander at a breathing-like period.
const FAST_WAVE_AMPLITUDE_BPM: f64 = 3.5;
const FAST_WAVE_PERIOD_SECS: f64 = 5.7;

const STEPS_EVERY_TICKS: u64 = 5;
const STEPS_PER_BURST: f64 = 9.0;
const ENERGY_EVERY_TICKS: u64 = 10;
const ENERGY_PER_BURST_KCAL: f64 = 1.1;
const EXERCISE_EVERY_TICKS: u64 = 30;
const EXERCISE_PER_BURST_MIN: f64 = 0.5;

/// Simulated heart rate at `elapsed_secs` into the session.
pub fn bpm_at(elapsed_secs: f64) -> f64 {
    BASE_BPM
        + SLOW_WAVE_AMPLITUDE_BPM * (TAU * elapsed_secs / SLOW_WAVE_PERIOD_SECS).sin()
        + FAST_WAVE_AMPLITUDE_BPM * (TAU * elapsed_secs / FAST_WAVE_PERIOD_SECS).sin()
}

/// Configuration for the simulated source.
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    /// Spacing between heart-rate samples
    pub tick: Duration,
    /// Whether to also emit activity increments
    pub emit_activity: bool,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            emit_activity: true,
        }
    }
}

/// A source that synthesizes wearable samples on a worker thread.
pub struct SimulatedMonitor {
    config: SimulatedConfig,
    sender: Sender<SensorSample>,
    receiver: Receiver<SensorSample>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedMonitor {
    /// Create a simulated source with the given configuration.
    pub fn new(config: SimulatedConfig) -> Self {
        let (sender, receiver) = bounded(10_000);
        Self {
            config,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Start the worker thread.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(MonitorError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        let running = self.running.clone();
        let config = self.config.clone();

        self.handle = Some(thread::spawn(move || {
            let started = Instant::now();
            let mut ticks: u64 = 0;

            while running.load(Ordering::SeqCst) {
                let bpm = bpm_at(started.elapsed().as_secs_f64());
                if !emit(&sender, SensorSample::HeartRate(HeartRateSample::new(bpm))) {
                    break;
                }

                ticks += 1;
                if config.emit_activity {
                    emit_activity(&sender, ticks);
                }

                sleep_while_running(&running, config.tick);
            }
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

    /// Whether the worker thread is emitting.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for sensor samples.
    pub fn receiver(&self) -> &Receiver<SensorSample> {
        &self.receiver
    }
}

impl Drop for SimulatedMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Send one sample; false means the consumer is gone and the worker should
/// stop.
fn emit(sender: &Sender<SensorSample>, sample: SensorSample) -> bool {
    match sender.try_send(sample) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            debug!("sample channel full, dropping sample");
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

fn emit_activity(sender: &Sender<SensorSample>, ticks: u64) {
    if ticks % STEPS_EVERY_TICKS == 0 {
        emit(
            sender,
            SensorSample::Activity(ActivitySample::new(ActivityKind::Steps, STEPS_PER_BURST)),
        );
    }
    if ticks % ENERGY_EVERY_TICKS == 0 {
        emit(
            sender,
            SensorSample::Activity(ActivitySample::new(
                ActivityKind::ActiveEnergy,
                ENERGY_PER_BURST_KCAL,
            )),
        );
    }
    if ticks % EXERCISE_EVERY_TICKS == 0 {
        emit(
            sender,
            SensorSample::Activity(ActivitySample::new(
                ActivityKind::ExerciseMinutes,
                EXERCISE_PER_BURST_MIN,
            )),
        );
    }
}
