//! Idle-triggered convergence / explosion cycle.
//!
//! ```text
//! normal --(idle, revealed, unlatched)--> converging --(strength 1, +500ms)--> exploding
//!    ^          |  pointer move                                                    |
//!    +----------+                       normal <--(strength 1, +200ms)-------------+
//!                                          latch released 30s later
//! ```
//!
//! Delays are deferred tasks owned by the machine, so [`ConvergenceMachine::teardown`]
//! (or dropping it) cancels them.

use crate::analytics::{easter_egg, AnalyticsSink};
use crate::config::ParticleConfig;
use crate::schedule::{Deferred, TaskId};

pub const EASTER_EGG_ID: &str = "particle_convergence";

/// There is deliberately no separate `idle` phase: idleness is a condition
/// checked while `Normal`, never a state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normal,
    Converging,
    Exploding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Explode,
    Settle,
    Release,
}

#[derive(Debug)]
pub struct ConvergenceMachine {
    cfg: ParticleConfig,
    phase: Phase,
    latched: bool,
    last_pointer_ms: f64,
    convergence: f64,
    explosion: f64,
    timers: Deferred<Transition>,
    pending_explode: Option<TaskId>,
    pending_settle: Option<TaskId>,
    stopped: bool,
}

impl ConvergenceMachine {
    pub fn new(cfg: ParticleConfig, now_ms: f64) -> Self {
        Self {
            cfg,
            phase: Phase::Normal,
            latched: false,
            last_pointer_ms: now_ms,
            convergence: 0.0,
            explosion: 0.0,
            timers: Deferred::new(),
            pending_explode: None,
            pending_settle: None,
            stopped: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn convergence(&self) -> f64 {
        self.convergence
    }

    pub fn explosion(&self) -> f64 {
        self.explosion
    }

    /// Set while a cycle has fired and its cooldown has not elapsed.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn pending_tasks(&self) -> usize {
        self.timers.len()
    }

    pub fn idle_seconds(&self, now_ms: f64) -> f64 {
        (now_ms - self.last_pointer_ms) / 1000.0
    }

    /// Pointer activity. Interrupts a convergence in progress; the latch
    /// stays set.
    pub fn pointer_moved(&mut self, now_ms: f64) {
        self.last_pointer_ms = now_ms;
        if self.phase == Phase::Converging {
            log::debug!("convergence interrupted by pointer");
            self.phase = Phase::Normal;
            self.convergence = 0.0;
            if let Some(id) = self.pending_explode.take() {
                self.timers.cancel(id);
            }
        }
    }

    /// Advances one rendered frame. `reveal` is the scroll signal of the
    /// section hosting the field.
    pub fn tick(&mut self, now_ms: f64, reveal: f64, sink: &dyn AnalyticsSink) -> Phase {
        if self.stopped {
            return self.phase;
        }
        for task in self.timers.drain_due(now_ms) {
            self.apply(task, now_ms);
        }

        if self.phase == Phase::Normal
            && !self.latched
            && reveal > self.cfg.scroll_gate
            && self.idle_seconds(now_ms) >= self.cfg.idle_secs
        {
            log::info!("particle convergence triggered");
            self.phase = Phase::Converging;
            self.latched = true;
            sink.capture(easter_egg(EASTER_EGG_ID));
        }

        match self.phase {
            Phase::Converging => {
                self.convergence = (self.convergence + self.cfg.converge_step).min(1.0);
                if self.convergence >= 1.0 && self.pending_explode.is_none() {
                    let id = self.timers.schedule(now_ms, self.cfg.explode_delay_ms, Transition::Explode);
                    self.pending_explode = Some(id);
                }
            }
            Phase::Exploding => {
                self.explosion = (self.explosion + self.cfg.explode_step).min(1.0);
                if self.explosion >= 1.0 && self.pending_settle.is_none() {
                    let id = self.timers.schedule(now_ms, self.cfg.settle_delay_ms, Transition::Settle);
                    self.pending_settle = Some(id);
                }
            }
            Phase::Normal => {
                self.convergence = decay(self.convergence, self.cfg.converge_decay, self.cfg.snap_epsilon);
                self.explosion = decay(self.explosion, self.cfg.explode_decay, self.cfg.snap_epsilon);
            }
        }

        self.phase
    }

    fn apply(&mut self, task: Transition, now_ms: f64) {
        match task {
            Transition::Explode => {
                self.pending_explode = None;
                self.phase = Phase::Exploding;
                self.convergence = 0.0;
            }
            Transition::Settle => {
                self.pending_settle = None;
                self.phase = Phase::Normal;
                self.timers.schedule(now_ms, self.cfg.cooldown_ms, Transition::Release);
            }
            Transition::Release => {
                log::debug!("convergence cooldown over");
                self.latched = false;
            }
        }
    }

    /// Cancels every pending transition and freezes the machine. Called when
    /// the field unmounts.
    pub fn teardown(&mut self) {
        self.stopped = true;
        self.timers.cancel_all();
        self.pending_explode = None;
        self.pending_settle = None;
    }
}

fn decay(value: f64, factor: f64, epsilon: f64) -> f64 {
    let v = value * factor;
    if v < epsilon {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{NullSink, RecordingSink, EASTER_EGG_FOUND};

    const FRAME: f64 = 16.0;

    fn run_until(
        m: &mut ConvergenceMachine,
        now: &mut f64,
        end: f64,
        reveal: f64,
        sink: &dyn AnalyticsSink,
    ) {
        while *now < end {
            *now += FRAME;
            m.tick(*now, reveal, sink);
        }
    }

    #[test]
    fn stays_normal_below_reveal_gate() {
        let mut m = ConvergenceMachine::new(ParticleConfig::default(), 0.0);
        let mut now = 0.0;
        run_until(&mut m, &mut now, 20_000.0, 0.3, &NullSink);
        assert_eq!(m.phase(), Phase::Normal);
        assert!(!m.is_latched());
    }

    #[test]
    fn idle_starts_convergence_and_reports_once() {
        let sink = RecordingSink::new();
        let mut m = ConvergenceMachine::new(ParticleConfig::default(), 0.0);
        let mut now = 0.0;
        run_until(&mut m, &mut now, 9_984.0, 0.5, &sink);
        assert_eq!(m.phase(), Phase::Normal);

        run_until(&mut m, &mut now, 10_000.0, 0.5, &sink);
        assert_eq!(m.phase(), Phase::Converging);
        assert!(m.convergence() > 0.0);

        run_until(&mut m, &mut now, 12_000.0, 0.5, &sink);
        let eggs = sink.named(EASTER_EGG_FOUND);
        assert_eq!(eggs.len(), 1);
        assert_eq!(eggs[0].get("easter_egg_id"), Some(&serde_json::json!(EASTER_EGG_ID)));
    }

    #[test]
    fn pointer_interrupts_convergence() {
        let mut m = ConvergenceMachine::new(ParticleConfig::default(), 0.0);
        let mut now = 0.0;
        run_until(&mut m, &mut now, 11_000.0, 1.0, &NullSink);
        assert_eq!(m.phase(), Phase::Converging);

        m.pointer_moved(now);
        assert_eq!(m.phase(), Phase::Normal);
        assert_eq!(m.convergence(), 0.0);
        assert!(m.is_latched());
    }

    #[test]
    fn interrupt_during_explode_delay_cancels_it() {
        let mut m = ConvergenceMachine::new(ParticleConfig::default(), 0.0);
        let mut now = 0.0;
        while m.pending_tasks() == 0 {
            now += FRAME;
            m.tick(now, 1.0, &NullSink);
        }
        assert_eq!(m.convergence(), 1.0);

        m.pointer_moved(now);
        assert_eq!(m.pending_tasks(), 0);
        let until = now + 1_000.0;
        run_until(&mut m, &mut now, until, 1.0, &NullSink);
        assert_eq!(m.phase(), Phase::Normal);
    }

    #[test]
    fn strengths_decay_and_snap() {
        assert_eq!(decay(0.0105, 0.95, 0.01), 0.0);
        assert!((decay(0.5, 0.92, 0.01) - 0.46).abs() < 1e-12);
    }

    #[test]
    fn teardown_cancels_pending_transitions() {
        let mut m = ConvergenceMachine::new(ParticleConfig::default(), 0.0);
        let mut now = 0.0;
        while m.pending_tasks() == 0 {
            now += FRAME;
            m.tick(now, 1.0, &NullSink);
        }
        m.teardown();
        assert_eq!(m.pending_tasks(), 0);
        let until = now + 2_000.0;
        run_until(&mut m, &mut now, until, 1.0, &NullSink);
        assert_eq!(m.phase(), Phase::Converging);
        assert_eq!(m.pending_tasks(), 0);
    }
}
