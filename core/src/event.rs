//! The event vocabulary — everything a flow reports to its host.
//!
//! RULE: Flows communicate outward ONLY through events.
//! A host never reaches into a flow's internal state to find out what
//! happened on a tick; `advance` returns the events and that is the
//! whole story.

use crate::types::{EntityId, RunId, Tick};
use serde::{Deserialize, Serialize};

/// Every event emitted during a demo run.
/// Variants are added per flow — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Run events ─────────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    FlowStarted {
        flow: String,
    },

    // ── Auction events ─────────────────────────────
    QuoteDropped {
        tick: Tick,
        price: u64,
        stock: u64,
    },
    PriceLocked {
        tick: Tick,
        price: u64,
    },
    AuctionSettled {
        tick: Tick,
        price: u64,
        stock: u64,
        reason: SettleReason,
    },

    // ── Bidding events ─────────────────────────────
    BidRevealed {
        tick: Tick,
        bank_id: EntityId,
        rate: f64,
    },
    BiddingSettled {
        tick: Tick,
        winner_bank_id: EntityId,
        winner_rate: f64,
    },

    // ── Credit-analysis events ─────────────────────
    AnalysisStarted,
    ScoreAnimationStarted {
        target: u64,
    },
    CreditScoreComputed {
        score: u64,
        band: ScoreBand,
    },
    AnalysisCompleted,

    // ── Market-feed events ─────────────────────────
    MarketTicked {
        tick: Tick,
        price: f64,
        trend: Trend,
    },

    // ── Mandate events ─────────────────────────────
    MandateAuthorized,
    MandateActive,
}

impl SimEvent {
    /// Stable string name for the event_log event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. }        => "run_initialized",
            Self::FlowStarted { .. }           => "flow_started",
            Self::QuoteDropped { .. }          => "quote_dropped",
            Self::PriceLocked { .. }           => "price_locked",
            Self::AuctionSettled { .. }        => "auction_settled",
            Self::BidRevealed { .. }           => "bid_revealed",
            Self::BiddingSettled { .. }        => "bidding_settled",
            Self::AnalysisStarted              => "analysis_started",
            Self::ScoreAnimationStarted { .. } => "score_animation_started",
            Self::CreditScoreComputed { .. }   => "credit_score_computed",
            Self::AnalysisCompleted            => "analysis_completed",
            Self::MarketTicked { .. }          => "market_ticked",
            Self::MandateAuthorized            => "mandate_authorized",
            Self::MandateActive                => "mandate_active",
        }
    }
}

/// Why an auction closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettleReason {
    /// The buyer locked the current price.
    Locked,
    /// The price reached its configured floor.
    PriceFloor,
    /// The stock reached its configured floor.
    StockFloor,
}

/// Direction of the latest market-feed step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
}

/// Credit-score band, thresholds matching the score gauge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// Above 700.
    Excellent,
    /// Above 500.
    Fair,
    /// 500 and below.
    Watch,
}

impl ScoreBand {
    pub fn for_score(score: u64) -> Self {
        if score > 700 {
            Self::Excellent
        } else if score > 500 {
            Self::Fair
        } else {
            Self::Watch
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub tick: Tick,
    pub flow: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
