//! Dispatch configuration.

use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SkillError;

/// Scores must be strictly above this to be dispatched.
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.3;

/// How long a processing stage may run before the chain fails.
pub const DEFAULT_PROCESSING_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the [`crate::Dispatcher`].
///
/// Deserializes from JSON with every field optional:
///
/// ```json
/// { "acceptance_threshold": 0.5, "processing_timeout_ms": 2000 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Minimum score (exclusive) a match needs to be dispatched. Must lie
    /// in [0.0, 1.0].
    #[serde(deserialize_with = "unit_interval")]
    pub acceptance_threshold: f64,

    /// Timeout for the processing stage of the selected skill.
    #[serde(rename = "processing_timeout_ms", with = "millis")]
    pub processing_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            processing_timeout: DEFAULT_PROCESSING_TIMEOUT,
        }
    }
}

impl DispatchConfig {
    pub fn from_json(json: &str) -> Result<Self, SkillError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Clamped into [0.0, 1.0]; NaN falls back to the default.
    pub fn with_acceptance_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = if threshold.is_nan() {
            DEFAULT_ACCEPTANCE_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_processing_timeout(mut self, timeout: Duration) -> Self {
        self.processing_timeout = timeout;
        self
    }
}

fn unit_interval<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let threshold = f64::deserialize(deserializer)?;
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(D::Error::custom(format!(
            "acceptance_threshold {threshold} is outside [0, 1]"
        )))
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
