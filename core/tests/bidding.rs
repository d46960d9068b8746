use dfh_core::bidding_flow::{BankBid, BiddingConfig, BiddingSim, WinnerRule};
use dfh_core::error::SimError;
use dfh_core::event::SimEvent;
use dfh_core::rng::{JitterRng, RngBank, StreamSlot};
use dfh_core::simulation::Phase;

fn bidding_rng(seed: u64) -> JitterRng {
    RngBank::new(seed).for_stream(StreamSlot::Bidding)
}

fn demo_book() -> Vec<BankBid> {
    vec![
        BankBid { bank_id: "access".into(), name: "Access Bank".into(), rate: 4.5 },
        BankBid { bank_id: "sterling".into(), name: "Sterling Bank".into(), rate: 3.8 },
        BankBid { bank_id: "wema".into(), name: "Wema Bank".into(), rate: 3.2 },
    ]
}

fn demo_sim(rule: WinnerRule) -> BiddingSim {
    BiddingSim::new(
        BiddingConfig { book: demo_book(), interval_ms: 2000, winner_rule: rule },
        bidding_rng(42),
    )
    .expect("config")
}

#[test]
fn reveals_the_book_in_order_then_settles() {
    let mut bidding = demo_sim(WinnerRule::LowestRate);
    bidding.start().expect("start");

    bidding.advance(2000);
    assert_eq!(bidding.revealed().len(), 1);
    assert_eq!(bidding.phase(), Phase::Running);

    bidding.advance(2000 * 10);
    assert_eq!(bidding.phase(), Phase::Settled);
    // Exactly N ticks for a book of N, in book order.
    assert_eq!(bidding.revealed(), demo_book().as_slice());
}

#[test]
fn lowest_rate_wins_regardless_of_reveal_order() {
    let mut book = demo_book();
    book.reverse(); // best bid first, worst last
    let mut bidding = BiddingSim::new(
        BiddingConfig { book, interval_ms: 2000, winner_rule: WinnerRule::LowestRate },
        bidding_rng(42),
    )
    .expect("config");
    bidding.start().expect("start");
    bidding.advance(6000);

    let winner = bidding.winner().expect("settled");
    assert_eq!(winner.bank_id, "wema");
    assert_eq!(winner.rate, 3.2);
}

#[test]
fn demo_book_winner_is_the_three_two_bid() {
    let mut bidding = demo_sim(WinnerRule::LowestRate);
    bidding.start().expect("start");
    let events: Vec<_> = (0..3).flat_map(|_| bidding.advance(2000)).collect();

    let winner = bidding.winner().expect("settled");
    assert_eq!(winner.rate, 3.2);
    assert!(events.contains(&SimEvent::BiddingSettled {
        tick:           3,
        winner_bank_id: "wema".into(),
        winner_rate:    3.2,
    }));
}

#[test]
fn last_revealed_rule_matches_the_old_screen_behavior() {
    let mut book = demo_book();
    book.reverse(); // now 3.2, 3.8, 4.5 — last revealed is the worst rate
    let mut bidding = BiddingSim::new(
        BiddingConfig { book, interval_ms: 2000, winner_rule: WinnerRule::LastRevealed },
        bidding_rng(42),
    )
    .expect("config");
    bidding.start().expect("start");
    bidding.advance(6000);

    assert_eq!(bidding.winner().expect("settled").rate, 4.5);
}

#[test]
fn winner_is_undefined_until_settled() {
    let mut bidding = demo_sim(WinnerRule::LowestRate);
    bidding.start().expect("start");
    bidding.advance(2000);
    assert!(bidding.winner().is_none());
}

#[test]
fn latest_and_best_rate_diverge_on_non_monotone_books() {
    let book = vec![
        BankBid { bank_id: "a".into(), name: "A".into(), rate: 3.0 },
        BankBid { bank_id: "b".into(), name: "B".into(), rate: 4.0 },
    ];
    let mut bidding = BiddingSim::new(
        BiddingConfig { book, interval_ms: 1000, winner_rule: WinnerRule::LowestRate },
        bidding_rng(1),
    )
    .expect("config");
    bidding.start().expect("start");
    bidding.advance(2000);

    assert_eq!(bidding.latest_rate(), Some(4.0));
    assert_eq!(bidding.best_rate(), Some(3.0));
}

#[test]
fn ties_go_to_the_earlier_bid() {
    let book = vec![
        BankBid { bank_id: "first".into(), name: "First".into(), rate: 3.5 },
        BankBid { bank_id: "second".into(), name: "Second".into(), rate: 3.5 },
    ];
    let mut bidding = BiddingSim::new(
        BiddingConfig { book, interval_ms: 1000, winner_rule: WinnerRule::LowestRate },
        bidding_rng(1),
    )
    .expect("config");
    bidding.start().expect("start");
    bidding.advance(2000);

    assert_eq!(bidding.winner().expect("settled").bank_id, "first");
}

#[test]
fn close_early_judges_only_the_revealed_bids() {
    let mut bidding = demo_sim(WinnerRule::LowestRate);
    bidding.start().expect("start");
    bidding.advance(4000); // 4.5 and 3.8 revealed, 3.2 still sealed

    let events = bidding.close_early().expect("close");
    assert_eq!(bidding.winner().expect("settled").rate, 3.8);
    assert!(matches!(events.last(), Some(SimEvent::BiddingSettled { .. })));

    // Repeat close reports nothing new.
    assert!(bidding.close_early().expect("repeat").is_empty());
}

#[test]
fn close_early_before_start_is_not_running() {
    let mut bidding = demo_sim(WinnerRule::LowestRate);
    assert!(matches!(bidding.close_early(), Err(SimError::NotRunning)));
}

#[test]
fn empty_book_is_invalid_config() {
    let result = BiddingSim::new(
        BiddingConfig { book: vec![], interval_ms: 2000, winner_rule: WinnerRule::LowestRate },
        bidding_rng(1),
    );
    assert!(matches!(result, Err(SimError::InvalidConfig { .. })));
}

#[test]
fn teardown_stops_the_reveal() {
    let mut bidding = demo_sim(WinnerRule::LowestRate);
    bidding.start().expect("start");
    bidding.advance(2000);

    bidding.teardown();
    assert!(bidding.advance(60_000).is_empty());
    assert_eq!(bidding.revealed().len(), 1);
}
