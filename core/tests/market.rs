use dfh_core::error::SimError;
use dfh_core::event::{SimEvent, Trend};
use dfh_core::market_feed::{best_offer, MarketFeed, MarketFeedConfig, SupplierOffer};
use dfh_core::rng::{JitterRng, RngBank, StreamSlot};
use dfh_core::simulation::Phase;

fn feed_rng(seed: u64) -> JitterRng {
    RngBank::new(seed).for_stream(StreamSlot::MarketFeed)
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

#[test]
fn window_length_is_invariant_under_advancement() {
    let mut feed =
        MarketFeed::new(MarketFeedConfig::default(), feed_rng(42)).expect("config");
    assert_eq!(feed.window().len(), 24);

    feed.start().expect("start");
    for _ in 0..10 {
        feed.advance(2000 * 7);
        assert_eq!(feed.window().len(), 24);
    }
}

#[test]
fn the_feed_never_settles_on_its_own() {
    let mut feed =
        MarketFeed::new(MarketFeedConfig::default(), feed_rng(42)).expect("config");
    feed.start().expect("start");
    feed.advance(2000 * 1000);
    assert_eq!(feed.phase(), Phase::Running);
}

#[test]
fn each_tick_reports_price_and_trend() {
    let mut feed =
        MarketFeed::new(MarketFeedConfig::default(), feed_rng(42)).expect("config");
    feed.start().expect("start");

    let events = feed.advance(2000 * 5);
    assert_eq!(events.len(), 5);
    for event in &events {
        match event {
            SimEvent::MarketTicked { price, .. } => assert!(price.is_finite()),
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[test]
fn trend_matches_the_latest_step() {
    let mut feed =
        MarketFeed::new(MarketFeedConfig::default(), feed_rng(7)).expect("config");
    feed.start().expect("start");

    let events = feed.advance(2000 * 8);
    let last_trend = match events.last().expect("events") {
        SimEvent::MarketTicked { trend, .. } => *trend,
        other => panic!("unexpected event {other:?}"),
    };
    assert_eq!(feed.trend(), last_trend);

    let window = feed.window();
    let expected = if window[23] > window[22] { Trend::Up } else { Trend::Down };
    assert_eq!(last_trend, expected);
}

#[test]
fn walk_steps_stay_within_the_configured_amplitude() {
    let config = MarketFeedConfig { step: 10.0, ..MarketFeedConfig::default() };
    let mut feed = MarketFeed::new(config, feed_rng(99)).expect("config");
    feed.start().expect("start");
    feed.advance(2000 * 200);

    let window = feed.window();
    assert!(window.windows(2).all(|w| (w[1] - w[0]).abs() <= 10.0));
}

#[test]
fn same_seed_reproduces_the_walk() {
    let mut feed_a =
        MarketFeed::new(MarketFeedConfig::default(), feed_rng(1234)).expect("config");
    let mut feed_b =
        MarketFeed::new(MarketFeedConfig::default(), feed_rng(1234)).expect("config");
    feed_a.start().expect("start");
    feed_b.start().expect("start");

    feed_a.advance(2000 * 50);
    feed_b.advance(2000 * 50);
    assert_eq!(feed_a.window(), feed_b.window());
}

#[test]
fn teardown_freezes_the_window() {
    let mut feed =
        MarketFeed::new(MarketFeedConfig::default(), feed_rng(5)).expect("config");
    feed.start().expect("start");
    feed.advance(2000 * 3);
    let frozen = feed.window();

    feed.teardown();
    assert!(feed.advance(2000 * 100).is_empty());
    assert_eq!(feed.window(), frozen);
}

#[test]
fn zero_window_is_invalid_config() {
    let config = MarketFeedConfig { window: 0, ..MarketFeedConfig::default() };
    assert!(matches!(
        MarketFeed::new(config, feed_rng(1)),
        Err(SimError::InvalidConfig { .. })
    ));
}

#[test]
fn best_offer_is_the_cheapest_unit_price() {
    let suppliers = demo_suppliers();
    let best = best_offer(&suppliers).expect("non-empty");
    assert_eq!(best.name, "Fidson Healthcare");
    assert_eq!(best.price, 1450.0);
}

#[test]
fn best_offer_ties_go_to_the_earlier_entry() {
    let mut suppliers = demo_suppliers();
    suppliers[1].price = 1450.0;
    assert_eq!(best_offer(&suppliers).expect("non-empty").name, "Fidson Healthcare");
}

#[test]
fn best_offer_of_nothing_is_none() {
    assert!(best_offer(&[]).is_none());
}
