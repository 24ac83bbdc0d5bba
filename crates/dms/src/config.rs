//! DMS configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::DmsError;

/// DMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Eye aspect ratio below which a frame counts as "closing"
    pub low_threshold: f32,

    /// Consecutive low frames before the driver is considered drowsy
    pub required_consecutive_frames: u32,

    /// Minimum seconds between two actionable alerts
    pub alert_cooldown_secs: u64,

    /// Frames are resized to this width before landmark detection
    pub working_width: u32,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            low_threshold: 0.3,
            required_consecutive_frames: 48,
            alert_cooldown_secs: 60,
            working_width: 450,
        }
    }
}

impl DmsConfig {
    /// Create strict config (shorter streak, shorter cooldown)
    pub fn strict() -> Self {
        Self {
            required_consecutive_frames: 30,
            alert_cooldown_secs: 30,
            ..Default::default()
        }
    }

    /// Create lenient config (longer streak, longer cooldown)
    pub fn lenient() -> Self {
        Self {
            required_consecutive_frames: 72,
            alert_cooldown_secs: 120,
            ..Default::default()
        }
    }

    /// Alert cooldown as a duration
    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.alert_cooldown_secs)
    }

    /// Reject settings the state machine cannot work with
    pub fn validate(&self) -> Result<(), DmsError> {
        if !self.low_threshold.is_finite() || self.low_threshold <= 0.0 {
            return Err(DmsError::Config(format!(
                "low_threshold must be a positive number, got {}",
                self.low_threshold
            )));
        }
        if self.required_consecutive_frames == 0 {
            return Err(DmsError::Config(
                "required_consecutive_frames must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
