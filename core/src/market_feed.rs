//! The live market ticker behind the dashboard marketplace tab.
//!
//! A random-walk price over a fixed sliding window, plus the static
//! supplier book the screen ranks. The feed never settles on its own —
//! it runs until the hosting screen goes away.

use crate::{
    error::{SimError, SimResult},
    event::{SimEvent, Trend},
    rng::JitterRng,
    simulation::{Phase, Simulation, SimulationConfig},
    types::{Millis, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct MarketFeedConfig {
    /// Price the seeded window scatters around.
    pub base_price:  f64,
    /// Amplitude of the seed scatter.
    pub seed_jitter: f64,
    /// Amplitude of each walk step.
    pub step:        f64,
    /// Number of points the chart shows.
    pub window:      usize,
    pub interval_ms: Millis,
}

impl Default for MarketFeedConfig {
    fn default() -> Self {
        Self {
            base_price:  1450.0,
            seed_jitter: 50.0,
            step:        10.0,
            window:      24,
            interval_ms: 2000,
        }
    }
}

/// A supplier's standing offer for the tracked product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierOffer {
    pub name:          String,
    /// Unit price per pack.
    pub price:         f64,
    pub delivery_fee:  f64,
    pub distance_km:   f64,
    pub rating:        f64,
    pub orders_filled: u64,
}

/// Cheapest unit price wins; ties go to the earlier entry. The screen's
/// BEST PRICE badge is this comparison, made explicit.
pub fn best_offer(offers: &[SupplierOffer]) -> Option<&SupplierOffer> {
    offers.iter().fold(None, |best: Option<&SupplierOffer>, offer| match best {
        Some(current) if current.price <= offer.price => Some(current),
        _ => Some(offer),
    })
}

pub struct MarketFeed {
    inner:       Simulation<f64>,
    seed_window: Vec<f64>,
    window:      usize,
}

impl MarketFeed {
    pub fn new(config: MarketFeedConfig, mut rng: JitterRng) -> SimResult<Self> {
        if config.window == 0 {
            return Err(SimError::invalid_config("window must be > 0"));
        }
        if !config.base_price.is_finite() || config.base_price <= 0.0 {
            return Err(SimError::invalid_config("base_price must be positive"));
        }

        // Seed the chart the way the screen does on mount: a full window
        // scattered around the base price.
        let seed_window: Vec<f64> = (0..config.window)
            .map(|_| config.base_price + rng.jitter(config.seed_jitter))
            .collect();
        let seed_last = *seed_window.last().unwrap_or(&config.base_price);

        let step = config.step;
        let inner = Simulation::new(
            SimulationConfig {
                interval_ms:  config.interval_ms,
                compute_next: Box::new(move |history: &[f64], rng: &mut JitterRng| {
                    let last = history.last().copied().unwrap_or(seed_last);
                    last + rng.jitter(step)
                }),
                // The feed only stops when the screen does.
                is_terminal: Box::new(|_| false),
                on_tick:     None,
                on_settle:   None,
            },
            rng,
        )?;
        Ok(Self { inner, seed_window, window: config.window })
    }

    pub fn start(&mut self) -> SimResult<Vec<SimEvent>> {
        self.inner.start()?;
        Ok(vec![SimEvent::FlowStarted { flow: "market_feed".to_string() }])
    }

    /// Advance virtual time: one MarketTicked per due tick.
    pub fn advance(&mut self, delta_ms: Millis) -> Vec<SimEvent> {
        let before = self.inner.history().len();
        self.inner.advance(delta_ms);

        let mut events = Vec::new();
        for i in before..self.inner.history().len() {
            let price = self.inner.history()[i];
            let prev = if i == 0 {
                *self.seed_window.last().unwrap_or(&price)
            } else {
                self.inner.history()[i - 1]
            };
            events.push(SimEvent::MarketTicked {
                tick:  (i + 1) as Tick,
                price,
                trend: if price > prev { Trend::Up } else { Trend::Down },
            });
        }
        events
    }

    pub fn teardown(&mut self) {
        self.inner.teardown();
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase()
    }

    /// The chart contents: always exactly `window` points, oldest first.
    pub fn window(&self) -> Vec<f64> {
        let history = self.inner.history();
        if history.len() >= self.window {
            history[history.len() - self.window..].to_vec()
        } else {
            let from_seed = self.window - history.len();
            let mut points =
                self.seed_window[self.seed_window.len() - from_seed..].to_vec();
            points.extend_from_slice(history);
            points
        }
    }

    pub fn current_price(&self) -> f64 {
        *self.window().last().unwrap_or(&0.0)
    }

    /// Direction of the latest step; flat reads as Down, like the screen.
    pub fn trend(&self) -> Trend {
        let window = self.window();
        match window.len() {
            0 | 1 => Trend::Down,
            n if window[n - 1] > window[n - 2] => Trend::Up,
            _ => Trend::Down,
        }
    }
}
