//! The simulation state machine — the heart of the engine.
//!
//! PHASES (fixed, documented, never reordered):
//!   idle → running → settled
//!
//! RULES:
//!   - A simulation cannot be un-started: running never returns to idle.
//!   - Settled is terminal. A screen re-instantiates a fresh machine to
//!     repeat a simulation (the remount-resets pattern).
//!   - History grows only while running; once settled it is frozen.
//!   - All randomness flows through the injected JitterRng.
//!   - The settle hook fires at most once, ever.

use crate::{
    error::{SimError, SimResult},
    rng::JitterRng,
    scheduler::TickScheduler,
    types::Millis,
};

/// Lifecycle phase of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Settled,
}

/// Produces the next payload from the history so far. The history slice
/// holds everything emitted before this tick, in emission order.
pub type ComputeFn<P> = Box<dyn FnMut(&[P], &mut JitterRng) -> P + Send>;

/// Decides whether the simulation has reached its terminal condition.
/// Checked after each payload is appended.
pub type TerminalFn<P> = Box<dyn Fn(&[P]) -> bool + Send>;

/// Observes each payload as it is emitted.
pub type TickHook<P> = Box<dyn FnMut(&P) + Send>;

/// Observes the frozen history on settle. Invoked at most once.
pub type SettleHook<P> = Box<dyn FnMut(&[P]) + Send>;

/// Everything a simulation needs, supplied by the hosting screen.
pub struct SimulationConfig<P> {
    pub interval_ms:  Millis,
    pub compute_next: ComputeFn<P>,
    pub is_terminal:  TerminalFn<P>,
    pub on_tick:      Option<TickHook<P>>,
    pub on_settle:    Option<SettleHook<P>>,
}

/// A generic timed simulation over payload type `P`.
///
/// One logical owner drives the whole lifecycle: `start()`, then
/// `advance(delta_ms)` as virtual time passes, with `force_settle()` for
/// user actions that close the simulation early and `teardown()` when the
/// hosting screen goes away. `&mut self` discipline makes overlapping
/// ticks unrepresentable.
pub struct Simulation<P> {
    phase:        Phase,
    history:      Vec<P>,
    scheduler:    TickScheduler,
    interval_ms:  Millis,
    compute_next: ComputeFn<P>,
    is_terminal:  TerminalFn<P>,
    on_tick:      Option<TickHook<P>>,
    on_settle:    Option<SettleHook<P>>,
    rng:          JitterRng,
}

impl<P> Simulation<P> {
    /// Validate the config and build an idle simulation.
    pub fn new(config: SimulationConfig<P>, rng: JitterRng) -> SimResult<Self> {
        if config.interval_ms == 0 {
            return Err(SimError::invalid_config("interval_ms must be > 0"));
        }
        Ok(Self {
            phase:        Phase::Idle,
            history:      Vec::new(),
            scheduler:    TickScheduler::new(),
            interval_ms:  config.interval_ms,
            compute_next: config.compute_next,
            is_terminal:  config.is_terminal,
            on_tick:      config.on_tick,
            on_settle:    config.on_settle,
            rng,
        })
    }

    /// idle → running. Arms the tick scheduler.
    pub fn start(&mut self) -> SimResult<()> {
        if self.phase != Phase::Idle {
            return Err(SimError::AlreadyRunning);
        }
        self.scheduler.start(self.interval_ms)?;
        self.phase = Phase::Running;
        Ok(())
    }

    /// Advance virtual time. Each due tick appends one payload, fires the
    /// tick hook, then checks the terminal condition; settling discards
    /// any remaining due ticks from the same batch. Returns the number of
    /// ticks applied by this call.
    pub fn advance(&mut self, delta_ms: Millis) -> u64 {
        if self.phase != Phase::Running {
            return 0;
        }
        let due = self.scheduler.advance(delta_ms);
        let mut applied = 0;
        for _ in 0..due {
            let payload = (self.compute_next)(&self.history, &mut self.rng);
            self.history.push(payload);
            applied += 1;
            if let (Some(hook), Some(last)) = (self.on_tick.as_mut(), self.history.last()) {
                hook(last);
            }
            if (self.is_terminal)(&self.history) {
                self.settle();
                break;
            }
        }
        applied
    }

    /// Close the simulation now (the "lock price" / "drag to authorize"
    /// action). Errors with NotRunning before start; a repeat call on a
    /// settled simulation is a no-op — the scheduler stops once and the
    /// settle hook fires once.
    pub fn force_settle(&mut self) -> SimResult<()> {
        match self.phase {
            Phase::Idle => Err(SimError::NotRunning),
            Phase::Running => {
                self.settle();
                Ok(())
            }
            Phase::Settled => Ok(()),
        }
    }

    /// Unconditional shutdown for screen unmount. Stops the scheduler and
    /// drops both hooks, so no callback can ever fire again. This is not
    /// a settle: the settle hook does not run.
    pub fn teardown(&mut self) {
        self.scheduler.stop();
        self.on_tick = None;
        self.on_settle = None;
        self.phase = Phase::Settled;
    }

    fn settle(&mut self) {
        self.scheduler.stop();
        self.phase = Phase::Settled;
        if let Some(mut hook) = self.on_settle.take() {
            hook(&self.history);
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every payload emitted so far, in emission order.
    pub fn history(&self) -> &[P] {
        &self.history
    }

    /// The latest payload, or None while idle.
    pub fn current(&self) -> Option<&P> {
        self.history.last()
    }

    /// Fraction of the current tick interval already elapsed, in [0, 1).
    pub fn interval_progress(&self) -> f64 {
        self.scheduler.progress()
    }
}
