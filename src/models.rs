//! Response bodies of the price service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Values below this are epoch seconds, anything else epoch milliseconds.
///
/// Compatibility shim: the service does not document which unit it sends.
pub const EPOCH_MILLIS_THRESHOLD: f64 = 10_000_000_000.0;

/// Whatever JSON the service root returns; only reachability matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus(pub serde_json::Value);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub ready: bool,
    pub model_type: String,
    pub trained_at: f64,
    pub metrics: ModelMetrics,
    pub features: Vec<String>,
}

impl MetricsSnapshot {
    /// Training time, or `None` when the service reports no usable timestamp.
    pub fn trained_at_utc(&self) -> Option<DateTime<Utc>> {
        epoch_to_utc(self.trained_at)
    }
}

pub fn epoch_to_utc(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }
    let millis = if raw < EPOCH_MILLIS_THRESHOLD {
        raw * 1000.0
    } else {
        raw
    };
    DateTime::from_timestamp_millis(millis.round() as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
    /// Echo of the submitted payload, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_info: Option<serde_json::Value>,
}
