use dfh_core::credit_flow::{AnalysisPhase, CreditAnalysis, CreditAnalysisConfig};
use dfh_core::error::SimError;
use dfh_core::event::{ScoreBand, SimEvent};

#[test]
fn full_flow_runs_analyzing_scoring_holding_done() {
    let mut analysis = CreditAnalysis::new(CreditAnalysisConfig::default()).expect("config");
    assert_eq!(analysis.phase(), AnalysisPhase::Linking);

    let events = analysis.begin().expect("begin");
    assert_eq!(events, vec![SimEvent::AnalysisStarted]);
    assert_eq!(analysis.phase(), AnalysisPhase::Analyzing);
    assert_eq!(analysis.score(), 0);

    // The analyzing wait ends; the count-up arms.
    let events = analysis.advance(3000);
    assert_eq!(events, vec![SimEvent::ScoreAnimationStarted { target: 780 }]);
    assert_eq!(analysis.phase(), AnalysisPhase::Scoring);

    // Partway through the count-up the score is strictly between 0 and 780.
    analysis.advance(1000);
    let midway = analysis.score();
    assert!(midway > 0 && midway < 780, "midway score was {midway}");

    // The count-up lands exactly on the target.
    let events = analysis.advance(1000);
    assert_eq!(
        events,
        vec![SimEvent::CreditScoreComputed { score: 780, band: ScoreBand::Excellent }]
    );
    assert_eq!(analysis.score(), 780);
    assert_eq!(analysis.phase(), AnalysisPhase::Holding);

    // The hold elapses and the flow completes.
    let events = analysis.advance(1500);
    assert_eq!(events, vec![SimEvent::AnalysisCompleted]);
    assert!(analysis.is_complete());
}

#[test]
fn score_counts_up_monotonically() {
    let mut analysis = CreditAnalysis::new(CreditAnalysisConfig::default()).expect("config");
    analysis.begin().expect("begin");
    analysis.advance(3000);

    let mut last = 0;
    for _ in 0..20 {
        analysis.advance(100);
        let score = analysis.score();
        assert!(score >= last);
        assert!(score <= 780);
        last = score;
    }
    assert_eq!(last, 780);
}

#[test]
fn begin_twice_is_already_running() {
    let mut analysis = CreditAnalysis::new(CreditAnalysisConfig::default()).expect("config");
    analysis.begin().expect("begin");
    assert!(matches!(analysis.begin(), Err(SimError::AlreadyRunning)));
}

#[test]
fn advance_before_begin_does_nothing() {
    let mut analysis = CreditAnalysis::new(CreditAnalysisConfig::default()).expect("config");
    assert!(analysis.advance(60_000).is_empty());
    assert_eq!(analysis.phase(), AnalysisPhase::Linking);
}

#[test]
fn teardown_mid_count_up_goes_silent() {
    let mut analysis = CreditAnalysis::new(CreditAnalysisConfig::default()).expect("config");
    analysis.begin().expect("begin");
    analysis.advance(3000);
    analysis.advance(500);
    let frozen = analysis.score();

    analysis.teardown();
    assert!(analysis.advance(60_000).is_empty());
    assert_eq!(analysis.score(), frozen);
}

#[test]
fn band_thresholds_match_the_gauge() {
    assert_eq!(ScoreBand::for_score(780), ScoreBand::Excellent);
    assert_eq!(ScoreBand::for_score(701), ScoreBand::Excellent);
    assert_eq!(ScoreBand::for_score(700), ScoreBand::Fair);
    assert_eq!(ScoreBand::for_score(501), ScoreBand::Fair);
    assert_eq!(ScoreBand::for_score(500), ScoreBand::Watch);
    assert_eq!(ScoreBand::for_score(0), ScoreBand::Watch);
}

#[test]
fn fair_band_target_reports_fair() {
    let config = CreditAnalysisConfig { score_target: 620, ..CreditAnalysisConfig::default() };
    let mut analysis = CreditAnalysis::new(config).expect("config");
    analysis.begin().expect("begin");
    analysis.advance(3000);
    let events = analysis.advance(2000);
    assert_eq!(
        events,
        vec![SimEvent::CreditScoreComputed { score: 620, band: ScoreBand::Fair }]
    );
}

#[test]
fn target_above_the_gauge_is_invalid_config() {
    let config = CreditAnalysisConfig { score_target: 900, ..CreditAnalysisConfig::default() };
    assert!(matches!(
        CreditAnalysis::new(config),
        Err(SimError::InvalidConfig { .. })
    ));
}

#[test]
fn zero_stage_duration_is_invalid_config() {
    let config = CreditAnalysisConfig { analyzing_ms: 0, ..CreditAnalysisConfig::default() };
    assert!(matches!(
        CreditAnalysis::new(config),
        Err(SimError::InvalidConfig { .. })
    ));
}
