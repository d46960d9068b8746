//! demo-runner: headless scripted session for DFH Terminal.
//!
//! Drives the full demo against virtual time — credit analysis, then the
//! supply auction, then the loan bidding reveal, then the repayment
//! mandate — recording every event, and prints an end-of-run summary.
//!
//! Usage:
//!   demo-runner --seed 12345
//!   demo-runner --seed 12345 --db run.db --lock-after 4

use anyhow::Result;
use dfh_core::{
    auction_flow::{AuctionConfig, AuctionSim},
    bidding_flow::{BankBid, BiddingConfig, BiddingSim, WinnerRule},
    credit_flow::{CreditAnalysis, CreditAnalysisConfig},
    credit_line::CreditFacility,
    event::SimEvent,
    mandate_flow::{MandateConfig, MandateFlow},
    market_feed::{best_offer, MarketFeed, MarketFeedConfig, SupplierOffer},
    recorder::EventRecorder,
    rng::{RngBank, StreamSlot},
    store::SimStore,
    types::Tick,
};
use std::env;

/// Virtual time step between host frames.
const FRAME_MS: u64 = 250;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let lock_after = parse_arg(&args, "--lock-after", 4u64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");

    println!("DFH Terminal — demo-runner");
    println!("  seed:       {seed}");
    println!("  db:         {db}");
    println!("  lock after: {lock_after} drops");
    println!();

    let store = if db == ":memory:" {
        SimStore::in_memory()?
    } else {
        SimStore::open(db)?
    };
    store.migrate()?;
    let recorder = EventRecorder::begin_run(&store, seed)?;
    let bank = RngBank::new(seed);

    run_credit_analysis(&recorder)?;
    let locked_price = run_auction(&recorder, &bank, lock_after)?;
    let winner_rate = run_bidding(&recorder, &bank)?;
    run_market_feed(&recorder, &bank)?;
    run_mandate(&recorder)?;
    print_facility(locked_price);

    print_summary(&store, recorder.run_id(), locked_price, winner_rate)?;
    Ok(())
}

fn run_credit_analysis(recorder: &EventRecorder) -> Result<()> {
    let mut analysis = CreditAnalysis::new(CreditAnalysisConfig::default())?;
    let mut clock: u64 = 0;

    record(recorder, "credit_analysis", 0, analysis.begin()?)?;
    while !analysis.is_complete() {
        clock += FRAME_MS;
        let events = analysis.advance(FRAME_MS);
        record(recorder, "credit_analysis", clock / 1000, events)?;
    }

    println!("=== CREDIT ANALYSIS ===");
    println!("  score: {} ({:?})", analysis.score(), analysis.band());
    println!();
    Ok(())
}

fn run_auction(recorder: &EventRecorder, bank: &RngBank, lock_after: u64) -> Result<u64> {
    let mut auction = AuctionSim::new(
        AuctionConfig::default(),
        bank.for_stream(StreamSlot::Auction),
    )?;
    record(recorder, "auction", 0, auction.start()?)?;

    // Watch the drops and lock once enough have gone by.
    let mut drops: u64 = 0;
    while auction.phase() != dfh_core::simulation::Phase::Settled {
        let events = auction.advance(FRAME_MS);
        for event in &events {
            if let SimEvent::QuoteDropped { tick, price, stock } = event {
                drops = *tick;
                println!("  drop {tick}: price {price}, stock {stock}");
            }
        }
        record(recorder, "auction", drops, events)?;
        if drops >= lock_after {
            let events = auction.lock_price()?;
            record(recorder, "auction", drops, events)?;
        }
    }

    println!("=== AUCTION ===");
    println!(
        "  settled at {} with {} in stock (locked: {})",
        auction.price(),
        auction.stock(),
        auction.is_locked()
    );
    println!();
    Ok(auction.price())
}

fn run_bidding(recorder: &EventRecorder, bank: &RngBank) -> Result<f64> {
    let mut bidding = BiddingSim::new(
        BiddingConfig {
            book: vec![
                BankBid { bank_id: "access".into(), name: "Access Bank".into(), rate: 4.5 },
                BankBid { bank_id: "sterling".into(), name: "Sterling Bank".into(), rate: 3.8 },
                BankBid { bank_id: "wema".into(), name: "Wema Bank".into(), rate: 3.2 },
            ],
            interval_ms: 2000,
            winner_rule: WinnerRule::LowestRate,
        },
        bank.for_stream(StreamSlot::Bidding),
    )?;
    record(recorder, "bidding", 0, bidding.start()?)?;

    let mut tick: Tick = 0;
    while bidding.phase() != dfh_core::simulation::Phase::Settled {
        let events = bidding.advance(FRAME_MS);
        for event in &events {
            if let SimEvent::BidRevealed { tick: t, bank_id, rate } = event {
                tick = *t;
                println!("  bid {t}: {bank_id} at {rate}%");
            }
        }
        record(recorder, "bidding", tick, events)?;
    }

    let (winner_name, winner_rate) = bidding
        .winner()
        .map(|w| (w.name.clone(), w.rate))
        .unwrap_or_default();
    println!("=== BIDDING ===");
    println!("  winner: {winner_name} at {winner_rate}%");
    println!();
    Ok(winner_rate)
}

fn run_market_feed(recorder: &EventRecorder, bank: &RngBank) -> Result<()> {
    let mut feed = MarketFeed::new(
        MarketFeedConfig::default(),
        bank.for_stream(StreamSlot::MarketFeed),
    )?;
    record(recorder, "market_feed", 0, feed.start()?)?;

    // A minute of ticker, then the screen goes away.
    let events = feed.advance(60_000);
    let ticks = events.len() as Tick;
    record(recorder, "market_feed", ticks, events)?;
    let suppliers = demo_suppliers();
    let best = best_offer(&suppliers);

    println!("=== MARKET ===");
    println!("  current price: {:.2} ({:?})", feed.current_price(), feed.trend());
    if let Some(best) = best {
        println!("  best offer:    {} at {:.0}/pack", best.name, best.price);
    }
    println!();
    feed.teardown();
    Ok(())
}

fn run_mandate(recorder: &EventRecorder) -> Result<()> {
    let mut mandate = MandateFlow::new(MandateConfig::default())?;
    mandate.slide_to(260.0);
    record(recorder, "mandate", 0, mandate.release()?)?;
    let mut clock: u64 = 0;
    while mandate.phase() != dfh_core::mandate_flow::MandatePhase::Active {
        clock += FRAME_MS;
        let events = mandate.advance(FRAME_MS);
        record(recorder, "mandate", clock / 1000, events)?;
    }

    println!("=== MANDATE ===");
    println!("  repayment mandate active");
    println!();
    Ok(())
}

fn print_facility(locked_price: u64) {
    let mut facility = match CreditFacility::new(5_000_000, 1_250_000) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("facility setup failed: {e}");
            return;
        }
    };
    let drawn = facility.draw(locked_price).is_ok();

    println!("=== FACILITY ===");
    println!("  limit:        {}", facility.limit());
    println!("  drawn:        {} (stock purchase: {drawn})", facility.drawn());
    println!("  available:    {}", facility.available());
    println!("  utilization:  {:.1}%", facility.utilization() * 100.0);
    println!("  buying power: {} at 2.5x", facility.buying_power(2.5));
    println!();
}

fn print_summary(store: &SimStore, run_id: &str, locked_price: u64, winner_rate: f64) -> Result<()> {
    let total = store.event_count(run_id)?;
    let drops = store.count_by_type(run_id, "quote_dropped")?;
    let bids = store.count_by_type(run_id, "bid_revealed")?;
    let market_ticks = store.count_by_type(run_id, "market_ticked")?;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {run_id}");
    println!("  total events:  {total}");
    println!("  price drops:   {drops}");
    println!("  bids revealed: {bids}");
    println!("  market ticks:  {market_ticks}");
    println!("  deal price:    {locked_price}");
    println!("  loan rate:     {winner_rate}%");
    Ok(())
}

fn record(
    recorder: &EventRecorder,
    flow: &str,
    tick: Tick,
    events: Vec<SimEvent>,
) -> Result<()> {
    recorder.record(flow, tick, &events)?;
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn demo_suppliers() -> Vec<SupplierOffer> {
    vec![
        SupplierOffer {
            name: "Fidson Healthcare".into(),
            price: 1450.0,
            delivery_fee: 1500.0,
            distance_km: 5.2,
            rating: 4.8,
            orders_filled: 1240,
        },
        SupplierOffer {
            name: "Emzor Pharma".into(),
            price: 1480.0,
            delivery_fee: 2500.0,
            distance_km: 12.5,
            rating: 4.6,
            orders_filled: 850,
        },
        SupplierOffer {
            name: "May & Baker".into(),
            price: 1520.0,
            delivery_fee: 4500.0,
            distance_km: 28.0,
            rating: 4.9,
            orders_filled: 2100,
        },
    ]
}
