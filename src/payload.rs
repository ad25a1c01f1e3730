//! Metric payload envelope for the paired display.
//!
//! Each evaluation that produces a score is packaged as one JSON payload.
//! The metric keys are a wire contract shared with display peers: peers look
//! them up by exact string, so the names here must never drift.

use crate::core::hrv::HrvSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The current payload format version.
pub const PAYLOAD_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "pulselink";

/// Metric key carrying RMSSD in milliseconds.
pub const KEY_RMSSD: &str = "HRV_RMSSD";

/// Metric key carrying SDNN in milliseconds.
pub const KEY_SDNN: &str = "HRV_SDNN";

/// Producer metadata attached to every payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadProducer {
    /// Name of the producing software
    pub name: String,
    /// Version of the producing software
    pub version: String,
    /// Unique instance identifier (UUID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// One scored evaluation, packaged for the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPayload {
    /// Payload format version (must be "1.0")
    pub payload_version: String,
    /// Unique payload identifier
    pub id: String,
    /// Identifier of the device that observed the samples
    pub device: String,
    /// When the newest contributing sample was observed (RFC3339)
    pub observed_at_utc: String,
    /// When this payload was computed (RFC3339)
    pub computed_at_utc: String,
    /// Producer metadata
    pub producer: PayloadProducer,
    /// Metric values keyed by wire name
    pub metrics: HashMap<String, f64>,
    /// Stress score mapped from RMSSD, 0..=100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress: Option<u8>,
    /// Additional metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, serde_json::Value>>,
}

impl MetricPayload {
    /// RMSSD in milliseconds, when present.
    pub fn rmssd_ms(&self) -> Option<f64> {
        self.metrics.get(KEY_RMSSD).copied()
    }

    /// SDNN in milliseconds, when present.
    pub fn sdnn_ms(&self) -> Option<f64> {
        self.metrics.get(KEY_SDNN).copied()
    }

    /// Serialize to compact JSON for the wire.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parse a payload received from a peer.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Builder for metric payloads.
///
/// Holds the identity fields that stay constant for the life of a session so
/// every payload it produces carries the same instance and device identity.
pub struct PayloadBuilder {
    instance_id: Uuid,
    device: String,
    session_id: Option<String>,
}

impl PayloadBuilder {
    /// Create a builder with a fresh instance ID and the local device name.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            device: device_name(),
            session_id: None,
        }
    }

    /// Set the session ID recorded in payload metadata.
    pub fn with_session_id(mut self, session_id: String) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Override the device identifier.
    pub fn with_device(mut self, device: String) -> Self {
        self.device = device;
        self
    }

    /// Get the instance ID.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Package a scored evaluation observed at the given time.
    pub fn build(&self, summary: &HrvSummary, observed: DateTime<Utc>) -> MetricPayload {
        let computed_at = Utc::now();

        let mut metrics = HashMap::new();
        metrics.insert(KEY_RMSSD.to_string(), summary.rmssd_ms);
        metrics.insert(KEY_SDNN.to_string(), summary.sdnn_ms);

        let mut meta = HashMap::new();
        meta.insert(
            "samples_used".to_string(),
            serde_json::Value::Number(serde_json::Number::from(summary.samples_used)),
        );
        meta.insert(
            "intervals_used".to_string(),
            serde_json::Value::Number(serde_json::Number::from(summary.intervals_used)),
        );
        if let Some(ref session_id) = self.session_id {
            meta.insert(
                "session_id".to_string(),
                serde_json::Value::String(session_id.clone()),
            );
        }

        MetricPayload {
            payload_version: PAYLOAD_VERSION.to_string(),
            id: Uuid::new_v4().to_string(),
            device: self.device.clone(),
            observed_at_utc: observed.to_rfc3339(),
            computed_at_utc: computed_at.to_rfc3339(),
            producer: PayloadProducer {
                name: PRODUCER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                instance_id: Some(self.instance_id.to_string()),
            },
            metrics,
            stress: Some(summary.stress),
            meta: Some(meta),
        }
    }

    /// Package a scored evaluation and serialize it in one step.
    pub fn build_json(&self, summary: &HrvSummary, observed: DateTime<Utc>) -> String {
        self.build(summary, observed).to_json()
    }
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn device_name() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown-device".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> HrvSummary {
        HrvSummary {
            rmssd_ms: 42.5,
            sdnn_ms: 31.0,
            stress: 15,
            samples_used: 10,
            intervals_used: 9,
        }
    }

    #[test]
    fn test_builder_instance_ids_differ() {
        let builder1 = PayloadBuilder::new();
        let builder2 = PayloadBuilder::new();
        assert_ne!(builder1.instance_id(), builder2.instance_id());
    }

    #[test]
    fn test_payload_carries_wire_keys() {
        let builder = PayloadBuilder::new();
        let payload = builder.build(&summary(), Utc::now());

        assert_eq!(payload.payload_version, PAYLOAD_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.metrics.get("HRV_RMSSD"), Some(&42.5));
        assert_eq!(payload.metrics.get("HRV_SDNN"), Some(&31.0));
        assert_eq!(payload.rmssd_ms(), Some(42.5));
        assert_eq!(payload.sdnn_ms(), Some(31.0));
        assert_eq!(payload.stress, Some(15));
    }

    #[test]
    fn test_payload_ids_are_unique() {
        let builder = PayloadBuilder::new();
        let a = builder.build(&summary(), Utc::now());
        let b = builder.build(&summary(), Utc::now());
        assert_ne!(a.id, b.id);
        assert_eq!(a.producer.instance_id, b.producer.instance_id);
    }

    #[test]
    fn test_json_round_trip() {
        let builder = PayloadBuilder::new().with_session_id("s-1".to_string());
        let observed = Utc::now();
        let json = builder.build_json(&summary(), observed);

        // The wire keys must appear as literal strings.
        assert!(json.contains("\"HRV_RMSSD\""));
        assert!(json.contains("\"HRV_SDNN\""));

        let parsed = MetricPayload::from_json(&json).unwrap();
        assert_eq!(parsed.rmssd_ms(), Some(42.5));
        assert_eq!(parsed.observed_at_utc, observed.to_rfc3339());
        let meta = parsed.meta.unwrap();
        assert_eq!(
            meta.get("session_id"),
            Some(&serde_json::Value::String("s-1".to_string()))
        );
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(MetricPayload::from_json("not json").is_err());
        assert!(MetricPayload::from_json("{}").is_err());
    }
}
