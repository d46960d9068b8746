//! The direct-debit mandate flow behind the repayment screen.
//!
//! Slide-to-authorize: the handle tracks the pointer along a fixed
//! track; releasing past the threshold authorizes the standing
//! instruction and, after a short activation wait, the mandate goes
//! active. Releasing short of the threshold springs the handle back.

use crate::{
    error::{SimError, SimResult},
    event::SimEvent,
    scheduler::OneShot,
    types::Millis,
};

#[derive(Debug, Clone, Copy)]
pub struct MandateConfig {
    /// Length of the slide track, in screen units.
    pub track_len:           f64,
    /// Release at or past this point authorizes.
    pub authorize_threshold: f64,
    /// Wait between authorization and the mandate going active.
    pub activation_ms:       Millis,
}

impl Default for MandateConfig {
    fn default() -> Self {
        Self {
            track_len:           260.0,
            authorize_threshold: 200.0,
            activation_ms:       3000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatePhase {
    AwaitingSlide,
    Authorized,
    Active,
}

pub struct MandateFlow {
    config:     MandateConfig,
    phase:      MandatePhase,
    position:   f64,
    activation: Option<OneShot>,
}

impl MandateFlow {
    pub fn new(config: MandateConfig) -> SimResult<Self> {
        if config.track_len <= 0.0 || config.authorize_threshold <= 0.0 {
            return Err(SimError::invalid_config("track and threshold must be positive"));
        }
        if config.authorize_threshold > config.track_len {
            return Err(SimError::invalid_config("authorize_threshold must be <= track_len"));
        }
        if config.activation_ms == 0 {
            return Err(SimError::invalid_config("activation_ms must be > 0"));
        }
        Ok(Self {
            config,
            phase: MandatePhase::AwaitingSlide,
            position: 0.0,
            activation: None,
        })
    }

    /// Track the drag. Position clamps to the track; ignored once the
    /// slide has been released past the threshold.
    pub fn slide_to(&mut self, x: f64) {
        if self.phase == MandatePhase::AwaitingSlide {
            self.position = x.clamp(0.0, self.config.track_len);
        }
    }

    /// The pointer let go. Past the threshold: authorize, snap the
    /// handle to the end, arm the activation wait. Short of it: spring
    /// back to the start.
    pub fn release(&mut self) -> SimResult<Vec<SimEvent>> {
        if self.phase != MandatePhase::AwaitingSlide {
            return Ok(Vec::new());
        }
        if self.position < self.config.authorize_threshold {
            self.position = 0.0;
            return Ok(Vec::new());
        }
        self.position = self.config.track_len;
        self.activation = Some(OneShot::after(self.config.activation_ms)?);
        self.phase = MandatePhase::Authorized;
        log::info!("mandate: authorized, activation pending");
        Ok(vec![SimEvent::MandateAuthorized])
    }

    /// Advance virtual time through the activation wait.
    pub fn advance(&mut self, delta_ms: Millis) -> Vec<SimEvent> {
        if self.phase != MandatePhase::Authorized {
            return Vec::new();
        }
        if self.activation.as_mut().is_some_and(|t| t.advance(delta_ms)) {
            self.activation = None;
            self.phase = MandatePhase::Active;
            log::info!("mandate: active");
            return vec![SimEvent::MandateActive];
        }
        Vec::new()
    }

    /// Screen unmount: cancel the pending activation.
    pub fn teardown(&mut self) {
        if let Some(timer) = self.activation.as_mut() {
            timer.cancel();
        }
    }

    pub fn phase(&self) -> MandatePhase {
        self.phase
    }

    pub fn position(&self) -> f64 {
        self.position
    }
}
