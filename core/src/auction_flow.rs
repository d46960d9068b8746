//! The Dutch-auction flow behind the supply marketplace screen.
//!
//! Each tick the listed price drops by a random amount drawn from the
//! configured range while simulated demand depletes the stock. Both
//! values clamp at their floors and the auction settles on its own once
//! either floor is reached. The buyer can close early at the current
//! price with `lock_price` — the marketplace's LOCK PRICE & BUY NOW
//! action.

use crate::{
    error::{SimError, SimResult},
    event::{SettleReason, SimEvent},
    rng::JitterRng,
    simulation::{Phase, Simulation, SimulationConfig},
    types::{Millis, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct AuctionConfig {
    pub start_price: u64,
    pub floor_price: u64,
    pub start_stock: u64,
    pub floor_stock: u64,
    /// Inclusive bounds of the per-tick price drop. Pin both ends to the
    /// same value for a deterministic drop.
    pub drop_range:  (u64, u64),
    pub interval_ms: Millis,
}

impl Default for AuctionConfig {
    /// The bulk-deal listing the demo ships with.
    fn default() -> Self {
        Self {
            start_price: 150_000,
            floor_price: 120_000,
            start_stock: 42,
            floor_stock: 5,
            drop_range:  (1000, 3000),
            interval_ms: 3000,
        }
    }
}

impl AuctionConfig {
    fn validate(&self) -> SimResult<()> {
        if self.floor_price > self.start_price {
            return Err(SimError::invalid_config("floor_price must be <= start_price"));
        }
        if self.floor_stock > self.start_stock {
            return Err(SimError::invalid_config("floor_stock must be <= start_stock"));
        }
        let (lo, hi) = self.drop_range;
        if lo == 0 || lo > hi {
            return Err(SimError::invalid_config("drop_range must satisfy 1 <= lo <= hi"));
        }
        if self.interval_ms == 0 {
            return Err(SimError::invalid_config("interval_ms must be > 0"));
        }
        Ok(())
    }
}

/// One tick's worth of auction state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuctionQuote {
    pub price: u64,
    pub stock: u64,
}

pub struct AuctionSim {
    inner:           Simulation<AuctionQuote>,
    config:          AuctionConfig,
    locked:          bool,
    settle_reported: bool,
}

impl AuctionSim {
    pub fn new(config: AuctionConfig, rng: JitterRng) -> SimResult<Self> {
        config.validate()?;
        let cfg = config;
        let inner = Simulation::new(
            SimulationConfig {
                interval_ms:  cfg.interval_ms,
                compute_next: Box::new(move |history: &[AuctionQuote], rng| {
                    let (price, stock) = history
                        .last()
                        .map(|q| (q.price, q.stock))
                        .unwrap_or((cfg.start_price, cfg.start_stock));
                    let drop = rng.next_range(cfg.drop_range.0, cfg.drop_range.1);
                    AuctionQuote {
                        price: price.saturating_sub(drop).max(cfg.floor_price),
                        stock: stock.saturating_sub(1).max(cfg.floor_stock),
                    }
                }),
                is_terminal: Box::new(move |history| {
                    history.last().is_some_and(|q| {
                        q.price <= cfg.floor_price || q.stock <= cfg.floor_stock
                    })
                }),
                on_tick:   None,
                on_settle: None,
            },
            rng,
        )?;
        Ok(Self { inner, config, locked: false, settle_reported: false })
    }

    pub fn start(&mut self) -> SimResult<Vec<SimEvent>> {
        self.inner.start()?;
        log::info!("auction: live at {} with {} in stock", self.price(), self.stock());
        Ok(vec![SimEvent::FlowStarted { flow: "auction".to_string() }])
    }

    /// Advance virtual time and report what happened: one QuoteDropped
    /// per tick, plus AuctionSettled if a floor closed the auction.
    pub fn advance(&mut self, delta_ms: Millis) -> Vec<SimEvent> {
        let before = self.inner.history().len();
        self.inner.advance(delta_ms);

        let mut events = Vec::new();
        for (i, quote) in self.inner.history().iter().enumerate().skip(before) {
            events.push(SimEvent::QuoteDropped {
                tick:  (i + 1) as Tick,
                price: quote.price,
                stock: quote.stock,
            });
        }
        if self.inner.phase() == Phase::Settled && !self.settle_reported {
            self.settle_reported = true;
            // Price floor takes precedence when both floors land on the
            // same tick.
            let reason = if self.price() <= self.config.floor_price {
                SettleReason::PriceFloor
            } else {
                SettleReason::StockFloor
            };
            log::info!("auction: settled at {} ({:?})", self.price(), reason);
            events.push(SimEvent::AuctionSettled {
                tick:   self.tick(),
                price:  self.price(),
                stock:  self.stock(),
                reason,
            });
        }
        events
    }

    /// Close the deal at the current price. NotRunning before start;
    /// a repeat lock on a settled auction reports nothing.
    pub fn lock_price(&mut self) -> SimResult<Vec<SimEvent>> {
        if self.inner.phase() == Phase::Settled {
            return Ok(Vec::new());
        }
        self.inner.force_settle()?;
        self.locked = true;
        self.settle_reported = true;
        let (tick, price, stock) = (self.tick(), self.price(), self.stock());
        log::info!("auction: price locked at {price}");
        Ok(vec![
            SimEvent::PriceLocked { tick, price },
            SimEvent::AuctionSettled { tick, price, stock, reason: SettleReason::Locked },
        ])
    }

    pub fn teardown(&mut self) {
        // A torn-down auction reports nothing, including the settle.
        self.settle_reported = true;
        self.inner.teardown();
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Current listed price; the opening price before the first drop.
    pub fn price(&self) -> u64 {
        self.inner.current().map(|q| q.price).unwrap_or(self.config.start_price)
    }

    /// Remaining stock; the opening stock before the first drop.
    pub fn stock(&self) -> u64 {
        self.inner.current().map(|q| q.stock).unwrap_or(self.config.start_stock)
    }

    pub fn quotes(&self) -> &[AuctionQuote] {
        self.inner.history()
    }

    fn tick(&self) -> Tick {
        self.inner.history().len() as Tick
    }

    /// Fraction of the round remaining before the next drop, in (0, 1].
    /// Drives the Next Drop bar without a second timer.
    pub fn next_drop_remaining(&self) -> f64 {
        1.0 - self.inner.interval_progress()
    }
}
