//! pulselink - Wearable-style heart rate variability monitor.
//!
//! This library turns a stream of heart-rate samples into RR intervals,
//! time-domain HRV statistics, and a coarse stress score, and carries the
//! results over an in-process link to a paired display.
//!
//! # Scope
//!
//! - **Smoothed input**: sources report bpm readings, not raw beat times;
//!   every RR interval is the idealized spacing implied by one reading
//! - **Local only**: samples and derived metrics never leave the process
//! - **Wellness, not medicine**: scores are heuristics for self-awareness,
//!   never diagnostic measurements
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         pulselink                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │   Source    │──▶│   Window    │──▶│     HRV     │        │
//! │  │ (sim/replay)│   │ (10 in 5min)│   │ (rr/rmssd)  │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │   Session   │   │   Display   │◀──│   Payload   │        │
//! │  │     Log     │   │  (3 lines)  │   │ (HRV_RMSSD) │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pulselink::core::{evaluate, SampleOrder, SampleWindow};
//! use pulselink::source::{SimulatedConfig, SimulatedMonitor};
//!
//! let mut monitor = SimulatedMonitor::new(SimulatedConfig::default());
//! monitor.start().expect("Failed to start source");
//!
//! // Samples arrive on monitor.receiver(); push heart-rate samples into a
//! // SampleWindow and evaluate its recent() view each tick.
//! ```

pub mod activity;
pub mod config;
pub mod core;
pub mod display;
pub mod link;
pub mod payload;
pub mod session;
pub mod source;

// Re-export key types at crate root for convenience
pub use activity::DailySummary;
pub use config::{Config, SourceConfig, SourceKind};
pub use crate::core::{evaluate, HrvReading, HrvSummary, SampleOrder, SampleWindow};
pub use display::DisplayState;
pub use link::{LinkError, PairedLink};
pub use payload::{MetricPayload, PayloadBuilder};
pub use session::{SessionLog, SessionStats, SharedSessionLog};
pub use source::{HeartRateSample, Monitor, MonitorError, SensorSample};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Disclaimer that can be displayed to users.
pub const DISCLAIMER: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                    PULSELINK - DISCLAIMER                        ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This monitor derives wellness estimates from heart rate data.   ║
║                                                                  ║
║  ✓ WHAT IT COMPUTES:                                             ║
║    • RR intervals implied by smoothed heart rate readings        ║
║    • Time-domain variability (RMSSD, SDNN)                       ║
║    • A 0-100 stress score from a fixed linear heuristic          ║
║                                                                  ║
║  ✗ WHAT IT IS NOT:                                               ║
║    • Not a medical device                                        ║
║    • Not a diagnosis, and not a substitute for one               ║
║    • Not clinical-grade HRV (no raw beat-to-beat timing)         ║
║                                                                  ║
║  All data is processed locally. Raw samples are discarded        ║
║  once they fall out of the evaluation window.                    ║
║                                                                  ║
║  You can view session statistics anytime with:                   ║
║    pulselink status                                              ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
