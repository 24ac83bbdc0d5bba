//! Alert sinks

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Instant;
use tracing::{info, warn};

/// Audible tone parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Tone frequency in Hz
    pub frequency_hz: u32,
    /// Tone duration in milliseconds
    pub duration_ms: u64,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 2500,
            duration_ms: 2000,
        }
    }
}

/// An actionable drowsiness alert
#[derive(Debug, Clone)]
pub struct AlertEvent {
    /// Frame sequence the alert was raised on
    pub sequence: u32,
    /// Averaged eye aspect ratio of that frame
    pub ear: f32,
    /// Length of the low-openness streak when the alert fired
    pub consecutive_low_frames: u32,
    /// When the alert fired
    pub raised_at: Instant,
}

/// Something that makes an alert perceptible to the driver
pub trait AlertSink: Send {
    /// Raise the alert. Sinks never fail the caller.
    fn raise(&mut self, event: &AlertEvent);
}

/// Rings the terminal bell
pub struct BellSink {
    tone: ToneConfig,
    out: Box<dyn Write + Send>,
}

impl BellSink {
    /// Bell on standard error
    pub fn stderr(tone: ToneConfig) -> Self {
        Self::with_writer(tone, Box::new(std::io::stderr()))
    }

    /// Bell on an arbitrary writer
    pub fn with_writer(tone: ToneConfig, out: Box<dyn Write + Send>) -> Self {
        Self { tone, out }
    }

    /// Tone parameters this sink announces
    pub fn tone(&self) -> &ToneConfig {
        &self.tone
    }
}

impl AlertSink for BellSink {
    fn raise(&mut self, event: &AlertEvent) {
        info!(
            "Drowsiness alert on frame {} (ear={:.3}, streak={}): tone {}Hz for {}ms",
            event.sequence,
            event.ear,
            event.consecutive_low_frames,
            self.tone.frequency_hz,
            self.tone.duration_ms
        );

        let rung = self
            .out
            .write_all(b"\x07")
            .and_then(|_| self.out.flush());
        if let Err(e) = rung {
            warn!("Failed to ring alert bell: {}", e);
        }
    }
}
