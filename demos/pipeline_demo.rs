//! Demonstration of the pulselink pipeline.
//!
//! This example shows how to:
//! 1. Start a simulated heart-rate source
//! 2. Collect samples into a recency window
//! 3. Evaluate RR intervals, RMSSD, SDNN, and the stress score
//! 4. Send payloads over the paired link and render the display
//!
//! Run with: cargo run --example pipeline_demo

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulselink::{
    core::{evaluate, HrvReading, SampleOrder, SampleWindow},
    display::DisplayState,
    link::PairedLink,
    payload::PayloadBuilder,
    session::SessionLog,
    source::{SensorSample, SimulatedConfig, SimulatedMonitor},
    DISCLAIMER,
};

fn main() {
    println!("pulselink - Pipeline Demo");
    println!("=========================");
    println!();

    // Display the wellness disclaimer
    println!("{DISCLAIMER}");
    println!();

    // Create components
    let mut monitor = SimulatedMonitor::new(SimulatedConfig {
        tick: Duration::from_millis(500),
        emit_activity: true,
    });
    let mut window = SampleWindow::new(10, 300); // 10 samples, 5min look-back
    let payload_builder = PayloadBuilder::new();
    let session_log = SessionLog::new();
    let (device_link, display_link) = PairedLink::pair();
    let mut display = DisplayState::new();

    println!("Instance ID: {}", payload_builder.instance_id());
    println!();
    println!("Monitoring for 30 seconds...");
    println!();

    // Start the source
    if let Err(e) = monitor.start() {
        eprintln!("Error starting source: {e}");
        return;
    }

    // Set up stop flag
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    // Run for 30 seconds
    let start = std::time::Instant::now();
    let receiver = monitor.receiver().clone();
    let mut sample_count = 0;
    let mut payload_count = 0;
    let mut last_eval = std::time::Instant::now();

    while running.load(Ordering::SeqCst) && start.elapsed() < Duration::from_secs(30) {
        // Receive samples with timeout
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(SensorSample::HeartRate(sample)) => {
                sample_count += 1;
                session_log.record_heart_rate_sample();

                if sample_count <= 5 || sample_count % 10 == 0 {
                    println!(
                        "  Heart rate: {:.1} bpm at {}",
                        sample.bpm,
                        sample.timestamp.format("%H:%M:%S%.3f")
                    );
                }
                window.push(sample);
            }
            Ok(SensorSample::Activity(sample)) => {
                session_log.record_activity_sample();
                println!(
                    "  Activity: {:?} +{:.1} at {}",
                    sample.kind,
                    sample.value,
                    sample.timestamp.format("%H:%M:%S")
                );
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                break;
            }
        }

        // Evaluate once per second
        if last_eval.elapsed() >= Duration::from_secs(1) {
            session_log.record_window_evaluated();

            match evaluate(&window.recent(chrono::Utc::now()), SampleOrder::NewestFirst) {
                HrvReading::Insufficient => {
                    session_log.record_insufficient_window();
                    println!("  (waiting for enough samples)");
                }
                HrvReading::Scored(summary) => {
                    let payload = payload_builder.build(&summary, chrono::Utc::now());

                    println!();
                    println!("=== Window Evaluated ===");
                    println!("  Samples used: {}", summary.samples_used);
                    println!("  RR intervals: {}", summary.intervals_used);
                    println!("  RMSSD: {:.2} ms", summary.rmssd_ms);
                    println!("  SDNN: {:.2} ms", summary.sdnn_ms);
                    println!("  Stress: {}/100", summary.stress);
                    println!();

                    if device_link.send(&payload).is_ok() {
                        session_log.record_payload_sent();
                        payload_count += 1;
                    }

                    // Show one payload in full
                    if payload_count == 5 {
                        let json = serde_json::to_string_pretty(&payload)
                            .unwrap_or_else(|_| "{}".to_string());
                        println!("  Payload (truncated):");
                        for line in json.lines().take(16) {
                            println!("    {line}");
                        }
                        println!("    ...");
                        println!();
                    }
                }
            }

            // Fold received payloads into the display
            while let Ok(Some(payload)) = display_link.try_recv() {
                display.apply(&payload);
                session_log.record_payload_displayed();
            }

            last_eval = std::time::Instant::now();
        }
    }

    // Stop the source
    println!();
    println!("Stopping monitor...");
    monitor.stop();

    // Show the final display card
    println!();
    println!("Paired display:");
    for line in display.render().lines() {
        println!("  {line}");
    }

    // Final statistics
    println!();
    println!("{}", session_log.summary());
    println!();
    println!("Demo complete!");
}
