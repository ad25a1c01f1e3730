//! pulselink CLI
//!
//! Heart rate variability monitor with a paired in-process display.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use pulselink::{
    activity::DailySummary,
    config::{Config, SourceKind},
    core::{evaluate, HrvReading, SampleOrder, SampleWindow},
    display::DisplayState,
    link::PairedLink,
    payload::{MetricPayload, PayloadBuilder},
    session::{create_shared_log_with_persistence, SharedSessionLog},
    source::{
        ActivitySample, Monitor, ReplayMonitor, SensorSample, SimulatedConfig, SimulatedMonitor,
    },
    DISCLAIMER, VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "pulselink")]
#[command(version = VERSION)]
#[command(about = "Heart rate variability monitor with paired display", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring and sending to the paired display
    Run {
        /// Sample source to run (simulated or replay)
        #[arg(long, default_value = "simulated")]
        source: String,

        /// Recording consumed when the source is replay
        #[arg(long)]
        replay_file: Option<PathBuf>,

        /// Honor recorded timestamps when replaying
        #[arg(long)]
        paced: bool,

        /// Seconds between evaluations
        #[arg(long)]
        interval: Option<u64>,

        /// Most samples one evaluation consumes
        #[arg(long)]
        limit: Option<usize>,

        /// Look-back horizon in seconds
        #[arg(long)]
        lookback: Option<u64>,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Replay a recorded sample stream
    Replay {
        /// Recording to replay (JSONL of sensor samples)
        file: PathBuf,

        /// Honor recorded timestamps instead of draining the file at once
        #[arg(long)]
        paced: bool,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Pause monitoring
    Pause,

    /// Resume monitoring
    Resume,

    /// Show current monitoring status
    Status,

    /// Display the wellness disclaimer
    Disclaimer,

    /// Export sent payloads from past sessions
    Export {
        /// Output directory for reports
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Export format (json or jsonl)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Show configuration
    Config,
}

/// Everything a monitoring run needs beyond the saved configuration.
struct RunOptions {
    kind: SourceKind,
    replay_path: Option<PathBuf>,
    paced: bool,
    interval: Option<u64>,
    limit: Option<usize>,
    lookback: Option<u64>,
    duration: Option<u64>,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            replay_file,
            paced,
            interval,
            limit,
            lookback,
            duration,
        } => {
            let Some(kind) = SourceKind::from_name(&source) else {
                eprintln!("Error: Unknown source '{source}' (expected simulated or replay)");
                std::process::exit(1);
            };
            cmd_run(RunOptions {
                kind,
                replay_path: replay_file,
                paced,
                interval,
                limit,
                lookback,
                duration,
            });
        }
        Commands::Replay {
            file,
            paced,
            duration,
        } => {
            cmd_run(RunOptions {
                kind: SourceKind::Replay,
                replay_path: Some(file),
                paced,
                interval: None,
                limit: None,
                lookback: None,
                duration,
            });
        }
        Commands::Pause => {
            cmd_pause();
        }
        Commands::Resume => {
            cmd_resume();
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Disclaimer => {
            cmd_disclaimer();
        }
        Commands::Export { output, format } => {
            cmd_export(output, &format);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_run(opts: RunOptions) {
    println!("pulselink v{VERSION}");
    println!();

    // Load or create configuration, then apply command-line overrides
    let mut config = Config::load().unwrap_or_default();
    if let Some(secs) = opts.interval {
        config.send_interval = Duration::from_secs(secs);
    }
    if let Some(limit) = opts.limit {
        config.sample_limit = limit;
    }
    if let Some(lookback) = opts.lookback {
        config.lookback_secs = lookback;
    }
    config.source.kind = opts.kind;
    if opts.replay_path.is_some() {
        config.source.replay_path = opts.replay_path.clone();
    }
    config.source.paced_replay = opts.paced;

    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let mut monitor = match make_monitor(&config) {
        Ok(monitor) => monitor,
        Err(message) => {
            eprintln!("Error: {message}");
            std::process::exit(1);
        }
    };

    println!("Starting monitor...");
    match config.source.kind {
        SourceKind::Simulated => println!("  Source: simulated"),
        SourceKind::Replay => {
            let path = config.source.replay_path.as_deref().unwrap_or("?".as_ref());
            let pacing = if config.source.paced_replay {
                " (paced)"
            } else {
                ""
            };
            println!("  Source: replay {path:?}{pacing}");
        }
    }
    println!("  Send interval: {}s", config.send_interval.as_secs());
    println!("  Sample limit: {}", config.sample_limit);
    println!("  Look-back: {}s", config.lookback_secs);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Set up session log
    let session_log = create_shared_log_with_persistence(config.session_stats_path());

    // Create payload builder
    let session_id = format!("SESS-{}", Utc::now().timestamp_millis());
    let payload_builder = PayloadBuilder::new().with_session_id(session_id);
    println!("Instance ID: {}", payload_builder.instance_id());

    // Pipeline state
    let mut window = SampleWindow::new(config.sample_limit, config.lookback_secs);
    let mut activity: Vec<ActivitySample> = Vec::new();
    let mut sent_payloads: Vec<MetricPayload> = Vec::new();
    let mut last_sample_ts: Option<DateTime<Utc>> = None;

    // Both ends of the paired link live in this process; the device end
    // sends, the display end folds payloads into the rendered lines.
    let (device_link, display_link) = PairedLink::pair();
    let mut display = DisplayState::new();

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc_handler(r);

    // Support pause/resume from another process by polling the config file.
    // If paused at startup, wait until resumed before starting the source.
    let mut paused = config.paused;
    let mut last_config_check = Instant::now();

    if paused {
        println!("Monitoring is currently paused.");
        println!("Run `pulselink resume` to start monitoring.");
        println!();
    } else if let Err(e) = monitor.start() {
        eprintln!("Error starting source: {e}");
        std::process::exit(1);
    }

    // Main pipeline loop
    let receiver = monitor.receiver().clone();
    let started = Instant::now();
    let mut last_send = Instant::now();

    while running.load(Ordering::SeqCst) {
        // Periodically reload config so `pulselink pause/resume` can control
        // a running monitor.
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            if let Ok(cfg) = Config::load() {
                if cfg.paused != paused {
                    paused = cfg.paused;

                    if paused {
                        println!();
                        println!("Pausing monitoring...");
                        monitor.stop();

                        // Drop the partial window and any queued samples.
                        window.clear();
                        while receiver.try_recv().is_ok() {}
                    } else {
                        println!();
                        println!("Resuming monitoring...");
                        if let Err(e) = monitor.start() {
                            eprintln!("Error resuming source: {e}");
                            std::process::exit(1);
                        }
                    }
                }
            }
            last_config_check = Instant::now();
        }

        if let Some(limit) = opts.duration {
            if started.elapsed() >= Duration::from_secs(limit) {
                println!();
                println!("Run duration reached.");
                break;
            }
        }

        if paused {
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        // Process samples with timeout
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(SensorSample::HeartRate(sample)) => {
                session_log.record_heart_rate_sample();
                last_sample_ts = Some(sample.timestamp);
                window.push(sample);
            }
            Ok(SensorSample::Activity(sample)) => {
                session_log.record_activity_sample();
                activity.push(sample);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                if !monitor.is_running() && receiver.is_empty() {
                    println!();
                    println!("Source finished.");
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                eprintln!("Source disconnected unexpectedly");
                break;
            }
        }

        // Evaluate the window and send a payload on the configured cadence
        if last_send.elapsed() >= config.send_interval {
            let eval_now = eval_time(config.source.kind, last_sample_ts);
            evaluate_and_send(
                &window,
                eval_now,
                &payload_builder,
                &device_link,
                &session_log,
                &mut sent_payloads,
            );
            drain_display(&display_link, &mut display, &session_log);
            last_send = Instant::now();
        }
    }

    // Stop the source
    println!();
    println!("Stopping monitor...");
    monitor.stop();

    // One final evaluation of whatever the window still holds
    if !paused && !window.is_empty() {
        let eval_now = eval_time(config.source.kind, last_sample_ts);
        evaluate_and_send(
            &window,
            eval_now,
            &payload_builder,
            &device_link,
            &session_log,
            &mut sent_payloads,
        );
    }
    drain_display(&display_link, &mut display, &session_log);

    // Save session log
    if let Err(e) = session_log.save() {
        eprintln!("Warning: Could not save session log: {e}");
    }

    // Export sent payloads
    if !sent_payloads.is_empty() {
        let export_path = config.export_path.join(format!(
            "session_{}.json",
            Utc::now().format("%Y%m%d_%H%M%S")
        ));

        if let Some(parent) = export_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match serde_json::to_string_pretty(&sent_payloads) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&export_path, json) {
                    eprintln!("Error writing payloads: {e}");
                } else {
                    println!(
                        "Exported {} payloads to {:?}",
                        sent_payloads.len(),
                        export_path
                    );
                }
            }
            Err(e) => {
                eprintln!("Error serializing payloads: {e}");
            }
        }
    }

    // Final display card
    println!();
    println!("Paired display:");
    for line in display.render().lines() {
        println!("  {line}");
    }

    let daily = DailySummary::aggregate(&activity, Utc::now());
    println!();
    println!(
        "Today's activity: {} steps | {} | {}",
        daily.steps_text(),
        daily.calories_text(),
        daily.exercise_text()
    );

    // Final stats
    println!();
    println!("{}", session_log.summary());
}

/// The instant a window is judged against.
///
/// Replays are judged at stream time so old recordings stay inside the
/// look-back horizon; live sources are judged at wall-clock time so silence
/// ages samples out.
fn eval_time(kind: SourceKind, last_sample_ts: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match kind {
        SourceKind::Replay => last_sample_ts.unwrap_or_else(Utc::now),
        SourceKind::Simulated => Utc::now(),
    }
}

fn evaluate_and_send(
    window: &SampleWindow,
    eval_now: DateTime<Utc>,
    builder: &PayloadBuilder,
    device_link: &PairedLink,
    session_log: &SharedSessionLog,
    sent: &mut Vec<MetricPayload>,
) {
    let recent = window.recent(eval_now);
    session_log.record_window_evaluated();

    match evaluate(&recent, SampleOrder::NewestFirst) {
        HrvReading::Insufficient => {
            session_log.record_insufficient_window();
            println!(
                "[{}] Waiting for samples ({} in window)",
                Utc::now().format("%H:%M:%S"),
                recent.len()
            );
        }
        HrvReading::Scored(summary) => {
            let observed = recent.first().map(|s| s.timestamp).unwrap_or(eval_now);
            let payload = builder.build(&summary, observed);
            match device_link.send(&payload) {
                Ok(()) => {
                    session_log.record_payload_sent();
                    sent.push(payload);
                }
                Err(e) => eprintln!("Warning: payload not sent: {e}"),
            }
            println!(
                "[{}] RMSSD: {:.2} ms | SDNN: {:.2} ms | stress: {}/100 ({} samples)",
                Utc::now().format("%H:%M:%S"),
                summary.rmssd_ms,
                summary.sdnn_ms,
                summary.stress,
                summary.samples_used
            );
        }
    }
}

fn drain_display(link: &PairedLink, display: &mut DisplayState, session_log: &SharedSessionLog) {
    loop {
        match link.try_recv() {
            Ok(Some(payload)) => {
                display.apply(&payload);
                session_log.record_payload_displayed();
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("Warning: display receive failed: {e}");
                break;
            }
        }
    }
}

fn make_monitor(config: &Config) -> Result<Monitor, String> {
    match config.source.kind {
        SourceKind::Simulated => Ok(Monitor::Simulated(SimulatedMonitor::new(SimulatedConfig {
            tick: Duration::from_millis(config.source.sim_tick_ms),
            ..SimulatedConfig::default()
        }))),
        SourceKind::Replay => {
            let path = config
                .source
                .replay_path
                .clone()
                .ok_or_else(|| "Replay source requires --replay-file".to_string())?;
            Ok(Monitor::Replay(
                ReplayMonitor::new(path).with_pacing(config.source.paced_replay),
            ))
        }
    }
}

fn cmd_pause() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = true;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Monitoring paused. Use 'pulselink resume' to continue.");
}

fn cmd_resume() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = false;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Monitoring resumed.");
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("pulselink Status");
    println!("================");
    println!();

    // Show config
    println!("Configuration:");
    match config.source.kind {
        SourceKind::Simulated => println!("  Source: simulated"),
        SourceKind::Replay => println!(
            "  Source: replay {:?}",
            config.source.replay_path.as_deref().unwrap_or("?".as_ref())
        ),
    }
    println!("  Send interval: {}s", config.send_interval.as_secs());
    println!("  Sample limit: {}", config.sample_limit);
    println!("  Look-back: {}s", config.lookback_secs);
    println!("  Paused: {}", config.paused);
    println!();

    // Load and show session stats if available
    let stats_path = config.session_stats_path();
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                if let Some(samples) = stats.get("heart_rate_samples") {
                    println!("  Heart rate samples: {samples}");
                }
                if let Some(samples) = stats.get("activity_samples") {
                    println!("  Activity samples: {samples}");
                }
                if let Some(windows) = stats.get("windows_evaluated") {
                    println!("  Windows evaluated: {windows}");
                }
                if let Some(windows) = stats.get("insufficient_windows") {
                    println!("  Insufficient windows: {windows}");
                }
                if let Some(sent) = stats.get("payloads_sent") {
                    println!("  Payloads sent: {sent}");
                }
                if let Some(displayed) = stats.get("payloads_displayed") {
                    println!("  Payloads displayed: {displayed}");
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_disclaimer() {
    println!("{DISCLAIMER}");
}

fn cmd_export(output: Option<PathBuf>, format: &str) {
    let config = Config::load().unwrap_or_default();
    let export_dir = output.unwrap_or_else(|| config.export_path.clone());

    // Find all session files
    let session_files: Vec<PathBuf> = std::fs::read_dir(&export_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.extension().map(|e| e == "json").unwrap_or(false)
                        && p.file_name()
                            .and_then(|n| n.to_str())
                            .map(|n| n.starts_with("session_"))
                            .unwrap_or(false)
                })
                .collect()
        })
        .unwrap_or_default();

    if session_files.is_empty() {
        println!("No session data found in {export_dir:?}");
        println!("Run 'pulselink run' to begin monitoring.");
        return;
    }

    println!(
        "Found {} session file(s) in {:?}",
        session_files.len(),
        export_dir
    );

    // Combine all payloads
    let mut all_payloads: Vec<MetricPayload> = Vec::new();
    for file in &session_files {
        if let Ok(content) = std::fs::read_to_string(file) {
            if let Ok(payloads) = serde_json::from_str::<Vec<MetricPayload>>(&content) {
                all_payloads.extend(payloads);
            }
        }
    }

    println!("Total payloads: {}", all_payloads.len());

    // Export based on format
    let output_path = export_dir.join(format!(
        "export_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        if format == "jsonl" { "jsonl" } else { "json" }
    ));

    let result = if format == "jsonl" {
        // JSON Lines format
        let lines: Vec<String> = all_payloads
            .iter()
            .filter_map(|p| serde_json::to_string(p).ok())
            .collect();
        std::fs::write(&output_path, lines.join("\n"))
    } else {
        // Pretty JSON format
        match serde_json::to_string_pretty(&all_payloads) {
            Ok(json) => std::fs::write(&output_path, json),
            Err(e) => {
                eprintln!("Error serializing: {e}");
                return;
            }
        }
    };

    match result {
        Ok(_) => println!("Exported to {output_path:?}"),
        Err(e) => eprintln!("Error writing export: {e}"),
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
