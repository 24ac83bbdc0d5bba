//! Cooldown gate for rate-limiting actionable alerts

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// How the cooldown period boundary is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    /// Fire only once strictly more than the period has elapsed
    Exclusive,
    /// Fire once at least the period has elapsed
    Inclusive,
}

/// Gate that lets an action through at most once per cooldown period.
///
/// Time is passed in by the caller so the gate works with irregular polling
/// and can be driven deterministically in tests.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    period: Duration,
    boundary: Boundary,
    last_fired: Option<Instant>,
    fire_count: u64,
}

impl CooldownGate {
    /// Create a new gate that has never fired
    pub fn new(period: Duration, boundary: Boundary) -> Self {
        Self {
            period,
            boundary,
            last_fired: None,
            fire_count: 0,
        }
    }

    /// Check whether the gate would let an action through at `now`
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => {
                // A `now` earlier than the last firing counts as zero elapsed.
                let elapsed = now.saturating_duration_since(last);
                match self.boundary {
                    Boundary::Exclusive => elapsed > self.period,
                    Boundary::Inclusive => elapsed >= self.period,
                }
            }
        }
    }

    /// Fire if ready, recording `now` as the last firing
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if !self.is_ready(now) {
            debug!(
                "Cooldown active: {:?} remaining",
                self.remaining(now)
            );
            return false;
        }
        self.last_fired = Some(now);
        self.fire_count += 1;
        true
    }

    /// Time left until the gate opens again (zero when ready)
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_fired {
            None => Duration::ZERO,
            Some(last) => self
                .period
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    /// When the gate last let an action through
    pub fn last_fired(&self) -> Option<Instant> {
        self.last_fired
    }

    /// Number of times the gate has fired
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// Configured cooldown period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Forget the last firing
    pub fn clear(&mut self) {
        self.last_fired = None;
        self.fire_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_fire_always_allowed() {
        let mut gate = CooldownGate::new(Duration::from_secs(60), Boundary::Exclusive);
        assert!(gate.try_fire(Instant::now()));
        assert_eq!(gate.fire_count(), 1);
    }

    #[test]
    fn test_exclusive_boundary() {
        let start = Instant::now();
        let mut gate = CooldownGate::new(Duration::from_secs(60), Boundary::Exclusive);
        assert!(gate.try_fire(start));

        // Exactly the period is not enough
        assert!(!gate.try_fire(start + Duration::from_secs(60)));
        assert!(gate.try_fire(start + Duration::from_millis(60_001)));
    }

    #[test]
    fn test_inclusive_boundary() {
        let start = Instant::now();
        let mut gate = CooldownGate::new(Duration::from_secs(60), Boundary::Inclusive);
        assert!(gate.try_fire(start));
        assert!(!gate.try_fire(start + Duration::from_secs(59)));
        assert!(gate.try_fire(start + Duration::from_secs(60)));
    }

    #[test]
    fn test_clock_going_backwards_counts_as_no_time() {
        let start = Instant::now() + Duration::from_secs(10);
        let mut gate = CooldownGate::new(Duration::from_secs(1), Boundary::Exclusive);
        assert!(gate.try_fire(start));
        assert!(!gate.is_ready(start - Duration::from_secs(5)));
        assert_eq!(gate.remaining(start - Duration::from_secs(5)), Duration::from_secs(1));
    }

    #[test]
    fn test_clear_resets() {
        let now = Instant::now();
        let mut gate = CooldownGate::new(Duration::from_secs(60), Boundary::Exclusive);
        gate.try_fire(now);
        gate.clear();
        assert!(gate.last_fired().is_none());
        assert!(gate.try_fire(now));
    }

    proptest! {
        #[test]
        fn prop_suppressed_fire_keeps_last_timestamp(offset_ms in 0u64..60_000) {
            let start = Instant::now();
            let mut gate = CooldownGate::new(Duration::from_secs(60), Boundary::Exclusive);
            gate.try_fire(start);
            prop_assert!(!gate.try_fire(start + Duration::from_millis(offset_ms)));
            prop_assert_eq!(gate.last_fired(), Some(start));
            prop_assert_eq!(gate.fire_count(), 1);
        }
    }
}
