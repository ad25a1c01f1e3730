//! Configuration for the pulselink monitor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How often a window is evaluated and a payload sent
    #[serde(with = "duration_serde")]
    pub send_interval: Duration,

    /// Most samples one evaluation consumes
    pub sample_limit: usize,

    /// Look-back horizon for the sample window (in seconds)
    pub lookback_secs: u64,

    /// Which sample source to run
    pub source: SourceConfig,

    /// Path for exporting session reports
    pub export_path: PathBuf,

    /// Path for storing state and session logs
    pub data_path: PathBuf,

    /// Whether monitoring is currently paused
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pulselink");

        Self {
            send_interval: Duration::from_secs(1),
            sample_limit: 10,
            lookback_secs: 300, // 5 minutes
            source: SourceConfig::default(),
            export_path: data_dir.join("exports"),
            data_path: data_dir,
            paused: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pulselink")
            .join("config.json")
    }

    /// Where session statistics persist between runs.
    pub fn session_stats_path(&self) -> PathBuf {
        self.data_path.join("session_stats.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Which sample source feeds the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Simulated,
    Replay,
}

impl SourceKind {
    /// Parse a source name as given on the command line.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "simulated" | "sim" => Some(SourceKind::Simulated),
            "replay" => Some(SourceKind::Replay),
            _ => None,
        }
    }
}

/// Configuration for the sample source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind to run
    pub kind: SourceKind,
    /// Recording consumed when the kind is `Replay`
    pub replay_path: Option<PathBuf>,
    /// Whether replays honor recorded timestamps
    pub paced_replay: bool,
    /// Milliseconds between simulated heart-rate samples
    pub sim_tick_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Simulated,
            replay_path: None,
            paced_replay: false,
            sim_tick_ms: 1000,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_parsing() {
        assert_eq!(SourceKind::from_name("simulated"), Some(SourceKind::Simulated));
        assert_eq!(SourceKind::from_name("SIM"), Some(SourceKind::Simulated));
        assert_eq!(SourceKind::from_name("replay"), Some(SourceKind::Replay));
        assert_eq!(SourceKind::from_name("healthkit"), None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.send_interval, Duration::from_secs(1));
        assert_eq!(config.sample_limit, 10);
        assert_eq!(config.lookback_secs, 300);
        assert_eq!(config.source.kind, SourceKind::Simulated);
        assert_eq!(config.source.sim_tick_ms, 1000);
        assert!(!config.paused);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"send_interval\":1"));

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.send_interval, config.send_interval);
        assert_eq!(parsed.sample_limit, config.sample_limit);
        assert_eq!(parsed.source.kind, config.source.kind);
    }
}
