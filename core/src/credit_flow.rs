//! The credit-analysis flow behind the onboarding screen.
//!
//! After the applicant links a bank, the screen shows a fixed
//! "analyzing transactions" wait, then counts the credit score up from
//! zero to the assessed target with a cubic ease-out, holds the result
//! briefly, and hands control back to the host. The scoring itself is
//! simulated — the target is an input, not a computation.
//!
//! Stage boundaries consume the remainder of the advance call that
//! crosses them; the next call drives the new stage. Hosts pump frames
//! far smaller than any stage, so the coarseness never shows.

use crate::{
    animator::{cubic_ease_out, AnimatorConfig, ValueAnimator},
    error::{SimError, SimResult},
    event::{ScoreBand, SimEvent},
    scheduler::OneShot,
    types::Millis,
};

/// The score gauge tops out here, like the dial on the screen.
pub const SCORE_GAUGE_MAX: u64 = 850;

#[derive(Debug, Clone, Copy)]
pub struct CreditAnalysisConfig {
    /// The assessed score the count-up lands on.
    pub score_target:      u64,
    /// "Analyzing transactions" wait before the count-up.
    pub analyzing_ms:      Millis,
    /// Duration of the score count-up.
    pub score_duration_ms: Millis,
    /// How long the finished gauge holds before completion.
    pub hold_ms:           Millis,
}

impl Default for CreditAnalysisConfig {
    fn default() -> Self {
        Self {
            score_target:      780,
            analyzing_ms:      3000,
            score_duration_ms: 2000,
            hold_ms:           1500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    /// Waiting for the applicant to link a bank.
    Linking,
    /// Transactions under review (fixed wait).
    Analyzing,
    /// Score counting up.
    Scoring,
    /// Final score showing, completion pending.
    Holding,
    Done,
}

pub struct CreditAnalysis {
    config:    CreditAnalysisConfig,
    phase:     AnalysisPhase,
    analyzing: Option<OneShot>,
    animator:  Option<ValueAnimator>,
    hold:      Option<OneShot>,
}

impl CreditAnalysis {
    pub fn new(config: CreditAnalysisConfig) -> SimResult<Self> {
        if config.score_target > SCORE_GAUGE_MAX {
            return Err(SimError::invalid_config("score_target must fit the gauge"));
        }
        if config.analyzing_ms == 0 || config.score_duration_ms == 0 || config.hold_ms == 0 {
            return Err(SimError::invalid_config("all stage durations must be > 0"));
        }
        Ok(Self {
            config,
            phase: AnalysisPhase::Linking,
            analyzing: None,
            animator: None,
            hold: None,
        })
    }

    /// The applicant connected a bank: begin the analysis wait.
    pub fn begin(&mut self) -> SimResult<Vec<SimEvent>> {
        if self.phase != AnalysisPhase::Linking {
            return Err(SimError::AlreadyRunning);
        }
        self.analyzing = Some(OneShot::after(self.config.analyzing_ms)?);
        self.phase = AnalysisPhase::Analyzing;
        log::info!("credit: analyzing transactions");
        Ok(vec![SimEvent::AnalysisStarted])
    }

    /// Advance virtual time through whichever stage is active.
    pub fn advance(&mut self, delta_ms: Millis) -> Vec<SimEvent> {
        let mut events = Vec::new();
        match self.phase {
            AnalysisPhase::Linking | AnalysisPhase::Done => {}
            AnalysisPhase::Analyzing => {
                if self.analyzing.as_mut().is_some_and(|t| t.advance(delta_ms)) {
                    self.analyzing = None;
                    if self.arm_score_animation() {
                        self.phase = AnalysisPhase::Scoring;
                        events.push(SimEvent::ScoreAnimationStarted {
                            target: self.config.score_target,
                        });
                    }
                }
            }
            AnalysisPhase::Scoring => {
                let landed = match self.animator.as_mut() {
                    Some(animator) => {
                        animator.advance(delta_ms);
                        animator.is_complete()
                    }
                    None => false,
                };
                if landed {
                    let score = self.score();
                    events.push(SimEvent::CreditScoreComputed {
                        score,
                        band: ScoreBand::for_score(score),
                    });
                    log::info!("credit: score {score}");
                    match OneShot::after(self.config.hold_ms) {
                        Ok(hold) => {
                            self.hold = Some(hold);
                            self.phase = AnalysisPhase::Holding;
                        }
                        // Durations were validated in new(); unreachable in
                        // practice, but fail closed rather than hang.
                        Err(_) => self.phase = AnalysisPhase::Done,
                    }
                }
            }
            AnalysisPhase::Holding => {
                if self.hold.as_mut().is_some_and(|t| t.advance(delta_ms)) {
                    self.hold = None;
                    self.phase = AnalysisPhase::Done;
                    events.push(SimEvent::AnalysisCompleted);
                }
            }
        }
        events
    }

    /// Screen unmount: cancel whatever is pending. No further events.
    pub fn teardown(&mut self) {
        if let Some(timer) = self.analyzing.as_mut() {
            timer.cancel();
        }
        if let Some(animator) = self.animator.as_mut() {
            animator.cancel();
        }
        if let Some(timer) = self.hold.as_mut() {
            timer.cancel();
        }
        self.phase = AnalysisPhase::Done;
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    /// The score as currently displayed: floored while counting up,
    /// exactly the target once the count-up lands.
    pub fn score(&self) -> u64 {
        self.animator.as_ref().map(|a| a.value().floor() as u64).unwrap_or(0)
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_score(self.score())
    }

    pub fn is_complete(&self) -> bool {
        self.phase == AnalysisPhase::Done
    }

    fn arm_score_animation(&mut self) -> bool {
        let animator = ValueAnimator::new(AnimatorConfig {
            start_value: 0.0,
            end_value:   self.config.score_target as f64,
            duration_ms: self.config.score_duration_ms,
            ease:        cubic_ease_out,
        })
        .and_then(|mut a| {
            a.run(|_| {}, || {})?;
            Ok(a)
        });
        match animator {
            Ok(a) => {
                self.animator = Some(a);
                true
            }
            Err(e) => {
                log::warn!("credit: score animation failed to arm: {e}");
                self.phase = AnalysisPhase::Done;
                false
            }
        }
    }
}
