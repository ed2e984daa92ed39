// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Write-rate throttle.
//!
//! Bounds how often an accepted snapshot may be persisted. Bursts of updates
//! inside one interval coalesce into a single eventual write carrying the
//! latest value of every field.

use std::time::{Duration, Instant};

/// Default minimum spacing between accepted writes.
pub const DEFAULT_WRITE_INTERVAL: Duration = Duration::from_secs(5);

/// Interval gate with consume-on-pass semantics.
///
/// `last_write` starts as `None` ("never written"), so the very first
/// consultation always passes.
#[derive(Debug, Clone)]
pub struct WriteGate {
    interval: Duration,
    last_write: Option<Instant>,
}

impl WriteGate {
    /// Create a gate with the given minimum write spacing.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_write: None,
        }
    }

    /// Consult the gate.
    ///
    /// Returns true iff no write has been accepted yet or at least the
    /// configured interval has elapsed since the last accepted write.
    /// Passing consumes the slot: `last_write` is set to `now` in the same
    /// call, with no rollback. Callers must only consult the gate when they
    /// intend to write.
    pub fn should_write(&mut self, now: Instant) -> bool {
        let due = match self.last_write {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        };

        if due {
            self.last_write = Some(now);
        }

        due
    }

    /// Configured minimum write spacing.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for WriteGate {
    fn default() -> Self {
        Self::new(DEFAULT_WRITE_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_consultation_always_passes() {
        let mut gate = WriteGate::new(Duration::from_secs(5));

        assert!(gate.should_write(Instant::now()));
    }

    #[test]
    fn test_within_interval_blocked() {
        let mut gate = WriteGate::new(Duration::from_secs(5));
        let t0 = Instant::now();

        assert!(gate.should_write(t0));
        assert!(!gate.should_write(t0 + Duration::from_secs(1)));
        assert!(!gate.should_write(t0 + Duration::from_secs(4)));
    }

    #[test]
    fn test_interval_boundary_passes() {
        let mut gate = WriteGate::new(Duration::from_secs(5));
        let t0 = Instant::now();

        assert!(gate.should_write(t0));
        assert!(gate.should_write(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_pass_consumes_slot() {
        let mut gate = WriteGate::new(Duration::from_secs(5));
        let t0 = Instant::now();

        assert!(gate.should_write(t0));
        assert!(gate.should_write(t0 + Duration::from_secs(7)));
        // The slot was consumed at t0+7, not t0+5.
        assert!(!gate.should_write(t0 + Duration::from_secs(11)));
        assert!(gate.should_write(t0 + Duration::from_secs(12)));
    }
}
