//! Revolving credit facility arithmetic for the financing tab.
//!
//! No timers here — just the utilization and buying-power math the
//! screen displays.

use crate::error::{SimError, SimResult};

/// Leverage slider bounds.
pub const MIN_LEVERAGE: f64 = 1.0;
pub const MAX_LEVERAGE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditFacility {
    limit: u64,
    drawn: u64,
}

impl CreditFacility {
    pub fn new(limit: u64, drawn: u64) -> SimResult<Self> {
        if drawn > limit {
            return Err(SimError::invalid_config("drawn must be <= limit"));
        }
        Ok(Self { limit, drawn })
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn drawn(&self) -> u64 {
        self.drawn
    }

    /// Headroom left to draw against.
    pub fn available(&self) -> u64 {
        self.limit - self.drawn
    }

    /// Utilization ratio in [0, 1].
    pub fn utilization(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        self.drawn as f64 / self.limit as f64
    }

    /// Projected buying power at the given leverage. The slider only
    /// offers 1x–5x, so out-of-range values clamp.
    pub fn buying_power(&self, leverage: f64) -> u64 {
        let leverage = leverage.clamp(MIN_LEVERAGE, MAX_LEVERAGE);
        (self.available() as f64 * leverage).round() as u64
    }

    /// Draw down against the facility.
    pub fn draw(&mut self, amount: u64) -> SimResult<()> {
        if amount > self.available() {
            return Err(SimError::invalid_config("draw exceeds available credit"));
        }
        self.drawn += amount;
        Ok(())
    }

    /// Pay down the outstanding balance. Over-repayment clears to zero.
    pub fn repay(&mut self, amount: u64) {
        self.drawn = self.drawn.saturating_sub(amount);
    }
}
