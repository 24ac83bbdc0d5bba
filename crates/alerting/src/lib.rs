//! Alerting System
//!
//! Provides cooldown gating for repeated alerts and the sinks that make an
//! alert perceptible to the driver.

mod cooldown;
mod sink;

pub use cooldown::{Boundary, CooldownGate};
pub use sink::{AlertEvent, AlertSink, BellSink, ToneConfig};
