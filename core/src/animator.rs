//! Eased numeric interpolation over a fixed duration.
//!
//! Independent of the tick scheduler: an animator is frame-driven, and
//! hosts pump frames as fast as they like rather than on a schedule.
//! The numeric contract is strict — frames never leave the
//! [start_value, end_value] envelope even for easing curves that
//! overshoot, and on completion the value is pinned to end_value
//! exactly, with no floating-point drift.

use crate::{
    error::{SimError, SimResult},
    types::Millis,
};

/// A monotonic mapping from elapsed-time ratio to progress ratio.
pub type EaseFn = fn(f64) -> f64;

pub fn linear(t: f64) -> f64 {
    t
}

/// The default curve: fast start, gentle landing.
pub fn cubic_ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

pub type FrameHook = Box<dyn FnMut(f64) + Send>;
pub type CompleteHook = Box<dyn FnMut() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnimState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

#[derive(Clone, Copy)]
pub struct AnimatorConfig {
    pub start_value: f64,
    pub end_value:   f64,
    pub duration_ms: Millis,
    pub ease:        EaseFn,
}

pub struct ValueAnimator {
    config:      AnimatorConfig,
    elapsed_ms:  Millis,
    value:       f64,
    state:       AnimState,
    on_frame:    Option<FrameHook>,
    on_complete: Option<CompleteHook>,
}

impl ValueAnimator {
    pub fn new(config: AnimatorConfig) -> SimResult<Self> {
        if config.duration_ms == 0 {
            return Err(SimError::invalid_config("duration_ms must be > 0"));
        }
        if !config.start_value.is_finite() || !config.end_value.is_finite() {
            return Err(SimError::invalid_config("animation bounds must be finite"));
        }
        Ok(Self {
            value: config.start_value,
            config,
            elapsed_ms: 0,
            state: AnimState::Idle,
            on_frame: None,
            on_complete: None,
        })
    }

    /// Arm the animation. Frames begin flowing on the next `advance`.
    pub fn run(
        &mut self,
        on_frame: impl FnMut(f64) + Send + 'static,
        on_complete: impl FnMut() + Send + 'static,
    ) -> SimResult<()> {
        if self.state != AnimState::Idle {
            return Err(SimError::AlreadyRunning);
        }
        self.on_frame = Some(Box::new(on_frame));
        self.on_complete = Some(Box::new(on_complete));
        self.state = AnimState::Running;
        Ok(())
    }

    /// Advance virtual time and emit one frame. On the frame where the
    /// elapsed ratio reaches 1 the value is pinned to end_value exactly
    /// and the completion hook fires, exactly once.
    pub fn advance(&mut self, delta_ms: Millis) {
        if self.state != AnimState::Running {
            return;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);

        let finished = self.elapsed_ms >= self.config.duration_ms;
        self.value = if finished {
            self.config.end_value
        } else {
            let ratio = self.elapsed_ms as f64 / self.config.duration_ms as f64;
            let eased = (self.config.ease)(ratio).clamp(0.0, 1.0);
            self.config.start_value + (self.config.end_value - self.config.start_value) * eased
        };

        if let Some(hook) = self.on_frame.as_mut() {
            hook(self.value);
        }
        if finished {
            self.state = AnimState::Completed;
            self.on_frame = None;
            if let Some(mut hook) = self.on_complete.take() {
                hook();
            }
        }
    }

    /// Stop immediately. Idempotent; the completion hook never fires
    /// after a cancel, even if the deadline had already accrued.
    pub fn cancel(&mut self) {
        if self.state == AnimState::Completed {
            return;
        }
        self.state = AnimState::Cancelled;
        self.on_frame = None;
        self.on_complete = None;
    }

    /// Current eased value; start_value before the first frame.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Elapsed ratio in [0, 1]. Monotonically non-decreasing.
    pub fn elapsed_ratio(&self) -> f64 {
        if self.elapsed_ms >= self.config.duration_ms {
            1.0
        } else {
            self.elapsed_ms as f64 / self.config.duration_ms as f64
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == AnimState::Running
    }

    pub fn is_complete(&self) -> bool {
        self.state == AnimState::Completed
    }
}
