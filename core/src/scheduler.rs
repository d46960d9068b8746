//! Tick scheduling over virtual time.
//!
//! A TickScheduler owns one repeating schedule; a OneShot owns one
//! deadline. Neither touches the wall clock: hosts feed in millisecond
//! deltas and the scheduler reports how many ticks came due. Ticks from
//! one scheduler are strictly sequential — a batch of due ticks is
//! consumed in order by a single caller, so ticks never overlap.

use crate::{
    error::{SimError, SimResult},
    types::Millis,
};

/// A repeating tick schedule with an explicit start/stop lifecycle.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval_ms: Millis,
    /// Virtual time accrued since the last tick fired.
    accrued_ms:  Millis,
    active:      bool,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self { interval_ms: 0, accrued_ms: 0, active: false }
    }

    /// Arm the schedule. The first tick comes due `interval_ms` after start.
    pub fn start(&mut self, interval_ms: Millis) -> SimResult<()> {
        if self.active {
            return Err(SimError::AlreadyRunning);
        }
        if interval_ms == 0 {
            return Err(SimError::invalid_config("interval_ms must be > 0"));
        }
        self.interval_ms = interval_ms;
        self.accrued_ms = 0;
        self.active = true;
        Ok(())
    }

    /// Disarm the schedule. Idempotent; safe to call when not running.
    /// Accrued time is discarded — a stopped scheduler never reports a
    /// tick, including time already banked before the stop.
    pub fn stop(&mut self) {
        self.active = false;
        self.accrued_ms = 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance virtual time by `delta_ms` and return the number of whole
    /// ticks that came due. The remainder carries over to the next call.
    pub fn advance(&mut self, delta_ms: Millis) -> u64 {
        if !self.active || delta_ms == 0 {
            return 0;
        }
        self.accrued_ms += delta_ms;
        let due = self.accrued_ms / self.interval_ms;
        self.accrued_ms %= self.interval_ms;
        due
    }

    /// Fraction of the current interval already elapsed, in [0, 1).
    /// Drives the "next drop" progress bar without a second timer.
    pub fn progress(&self) -> f64 {
        if !self.active {
            return 0.0;
        }
        self.accrued_ms as f64 / self.interval_ms as f64
    }
}

impl Default for TickScheduler {
    fn default() -> Self { Self::new() }
}

/// A single deadline over virtual time. Fires at most once.
#[derive(Debug, Clone)]
pub struct OneShot {
    remaining_ms: Millis,
    armed:        bool,
}

impl OneShot {
    /// Arm a deadline `delay_ms` from now.
    pub fn after(delay_ms: Millis) -> SimResult<Self> {
        if delay_ms == 0 {
            return Err(SimError::invalid_config("delay_ms must be > 0"));
        }
        Ok(Self { remaining_ms: delay_ms, armed: true })
    }

    /// Advance virtual time. Returns true exactly once, on the call
    /// where the deadline passes.
    pub fn advance(&mut self, delta_ms: Millis) -> bool {
        if !self.armed {
            return false;
        }
        if delta_ms >= self.remaining_ms {
            self.armed = false;
            self.remaining_ms = 0;
            return true;
        }
        self.remaining_ms -= delta_ms;
        false
    }

    /// Disarm. Idempotent; a cancelled one-shot never fires.
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
