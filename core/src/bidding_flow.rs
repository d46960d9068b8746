//! The loan-bidding flow behind the financing screen.
//!
//! Lenders have already priced the request; the flow reveals their bids
//! one per tick, in book order, and settles when the book is exhausted.
//! The winner is chosen by an explicit rule — earlier builds of the
//! screen crowned whichever bid arrived last, which matched the lowest
//! rate only because of how the book happened to be ordered. Both
//! readings are selectable; LowestRate is the business rule and the
//! default.

use crate::{
    error::{SimError, SimResult},
    event::SimEvent,
    rng::JitterRng,
    simulation::{Phase, Simulation, SimulationConfig},
    types::{EntityId, Millis, Tick},
};
use serde::{Deserialize, Serialize};

/// A single lender's sealed bid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankBid {
    pub bank_id: EntityId,
    pub name:    String,
    /// Monthly interest rate, in percent.
    pub rate:    f64,
}

/// How the winning bid is chosen once the reveal ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinnerRule {
    /// Lowest rate wins. Ties go to the earlier bid.
    LowestRate,
    /// Whatever bid was revealed last wins.
    LastRevealed,
}

pub struct BiddingConfig {
    pub book:        Vec<BankBid>,
    pub interval_ms: Millis,
    pub winner_rule: WinnerRule,
}

pub struct BiddingSim {
    inner:           Simulation<BankBid>,
    winner_rule:     WinnerRule,
    settle_reported: bool,
}

impl BiddingSim {
    pub fn new(config: BiddingConfig, rng: JitterRng) -> SimResult<Self> {
        if config.book.is_empty() {
            return Err(SimError::invalid_config("bid book must not be empty"));
        }
        let book = config.book;
        let book_len = book.len();
        let inner = Simulation::new(
            SimulationConfig {
                interval_ms:  config.interval_ms,
                compute_next: Box::new(move |history: &[BankBid], _rng: &mut JitterRng| {
                    // One bid per tick, in book order. is_terminal keeps
                    // the index in bounds.
                    book[history.len()].clone()
                }),
                is_terminal: Box::new(move |history| history.len() >= book_len),
                on_tick:     None,
                on_settle:   None,
            },
            rng,
        )?;
        Ok(Self { inner, winner_rule: config.winner_rule, settle_reported: false })
    }

    pub fn start(&mut self) -> SimResult<Vec<SimEvent>> {
        self.inner.start()?;
        log::info!("bidding: reveal started");
        Ok(vec![SimEvent::FlowStarted { flow: "bidding".to_string() }])
    }

    /// Advance virtual time: one BidRevealed per tick, then
    /// BiddingSettled once the book runs dry.
    pub fn advance(&mut self, delta_ms: Millis) -> Vec<SimEvent> {
        let before = self.inner.history().len();
        self.inner.advance(delta_ms);

        let mut events = Vec::new();
        for (i, bid) in self.inner.history().iter().enumerate().skip(before) {
            events.push(SimEvent::BidRevealed {
                tick:    (i + 1) as Tick,
                bank_id: bid.bank_id.clone(),
                rate:    bid.rate,
            });
        }
        events.extend(self.settle_event());
        events
    }

    /// Stop waiting for further bids and judge what has been revealed.
    /// NotRunning before start; a no-op once settled.
    pub fn close_early(&mut self) -> SimResult<Vec<SimEvent>> {
        if self.inner.phase() == Phase::Settled {
            return Ok(Vec::new());
        }
        self.inner.force_settle()?;
        Ok(self.settle_event())
    }

    pub fn teardown(&mut self) {
        // A torn-down reveal reports nothing, including the settle.
        self.settle_reported = true;
        self.inner.teardown();
    }

    fn settle_event(&mut self) -> Vec<SimEvent> {
        if self.inner.phase() != Phase::Settled || self.settle_reported {
            return Vec::new();
        }
        self.settle_reported = true;
        match self.winner() {
            Some(winner) => {
                log::info!("bidding: settled, {} wins at {:.1}%", winner.name, winner.rate);
                vec![SimEvent::BiddingSettled {
                    tick:           self.inner.history().len() as Tick,
                    winner_bank_id: winner.bank_id.clone(),
                    winner_rate:    winner.rate,
                }]
            }
            // Settled before any reveal: nothing to crown.
            None => Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase()
    }

    /// Bids revealed so far, in reveal order.
    pub fn revealed(&self) -> &[BankBid] {
        self.inner.history()
    }

    /// Rate of the most recent reveal — the headline ticker.
    pub fn latest_rate(&self) -> Option<f64> {
        self.inner.current().map(|b| b.rate)
    }

    /// Lowest rate revealed so far, regardless of winner rule.
    pub fn best_rate(&self) -> Option<f64> {
        self.inner
            .history()
            .iter()
            .map(|b| b.rate)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// The winning bid. Defined only once settled.
    pub fn winner(&self) -> Option<&BankBid> {
        if self.inner.phase() != Phase::Settled {
            return None;
        }
        match self.winner_rule {
            WinnerRule::LowestRate => {
                self.inner.history().iter().fold(None, |best: Option<&BankBid>, bid| {
                    match best {
                        Some(current) if current.rate <= bid.rate => Some(current),
                        _ => Some(bid),
                    }
                })
            }
            WinnerRule::LastRevealed => self.inner.current(),
        }
    }
}
