//! Drowsiness state machine
//!
//! Turns the per-frame eye aspect ratio into a debounced, cooldown-gated
//! alert. The visual "drowsy" indicator holds on every qualifying frame; the
//! actionable alert fires at most once per cooldown period.

use alerting::{Boundary, CooldownGate};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::DmsConfig;

/// Result of observing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrowsinessOutcome {
    /// Eyes open, or closing for fewer frames than required
    #[default]
    NoSignal,
    /// Sustained closure, but the alert is suppressed by the cooldown
    Drowsy,
    /// Sustained closure and the alert fired on this frame
    Alert,
}

impl DrowsinessOutcome {
    /// Whether the drowsy indicator should be shown for this frame
    pub fn is_drowsy(&self) -> bool {
        !matches!(self, DrowsinessOutcome::NoSignal)
    }
}

/// Driver state (tracked over time)
#[derive(Debug, Clone)]
pub struct DrowsinessState {
    /// Frames in the current low-openness streak
    pub consecutive_low_frames: u32,

    /// Rate limiter for actionable alerts
    alert_gate: CooldownGate,
}

impl DrowsinessState {
    fn new(config: &DmsConfig) -> Self {
        Self {
            consecutive_low_frames: 0,
            alert_gate: CooldownGate::new(config.alert_cooldown(), Boundary::Exclusive),
        }
    }

    /// When the last alert fired
    pub fn last_alert(&self) -> Option<Instant> {
        self.alert_gate.last_fired()
    }

    /// Total alerts fired since construction or reset
    pub fn alert_count(&self) -> u64 {
        self.alert_gate.fire_count()
    }
}

/// Debounced drowsiness detector
pub struct DrowsinessMonitor {
    config: DmsConfig,
    state: DrowsinessState,
}

impl DrowsinessMonitor {
    /// Create a monitor with the given thresholds
    pub fn new(config: DmsConfig) -> Self {
        Self {
            state: DrowsinessState::new(&config),
            config,
        }
    }

    /// Feed one frame's averaged eye aspect ratio
    pub fn observe(&mut self, ratio: f32, now: Instant) -> DrowsinessOutcome {
        if ratio.is_nan() || ratio >= self.config.low_threshold {
            if self.state.consecutive_low_frames > 0 {
                debug!(
                    "Eyes reopened after {} low frames",
                    self.state.consecutive_low_frames
                );
            }
            self.state.consecutive_low_frames = 0;
            return DrowsinessOutcome::NoSignal;
        }

        // Keeps counting through the cooldown so the indicator persists.
        self.state.consecutive_low_frames = self.state.consecutive_low_frames.saturating_add(1);
        if self.state.consecutive_low_frames < self.config.required_consecutive_frames {
            return DrowsinessOutcome::NoSignal;
        }

        if self.state.alert_gate.try_fire(now) {
            info!(
                "Drowsiness alert: {} consecutive frames below {:.2}",
                self.state.consecutive_low_frames, self.config.low_threshold
            );
            DrowsinessOutcome::Alert
        } else {
            DrowsinessOutcome::Drowsy
        }
    }

    /// Current state
    pub fn state(&self) -> &DrowsinessState {
        &self.state
    }

    /// Thresholds in use
    pub fn config(&self) -> &DmsConfig {
        &self.config
    }

    /// Reset state (on driver change)
    pub fn reset(&mut self) {
        self.state = DrowsinessState::new(&self.config);
    }
}
