//! Particle field simulation, independent of the GPU.
//!
//! [`ParticleSim`] is what the renderer drives once per animation frame; it
//! turns pointer/scroll input and a clock into [`FrameUniforms`] and scene
//! transforms.

pub mod field;
pub mod motion;
pub mod state;

pub use field::{connect, Connections, ParticleCloud};
pub use motion::{FrameUniforms, PointerTracker, SceneMotion};
pub use state::{ConvergenceMachine, Phase};

use crate::analytics::AnalyticsSink;
use crate::config::ParticleConfig;

#[derive(Debug)]
pub struct ParticleSim {
    interactive: bool,
    mounted_ms: f64,
    reveal: f64,
    pointer: PointerTracker,
    motion: SceneMotion,
    machine: ConvergenceMachine,
}

impl ParticleSim {
    pub fn new(cfg: ParticleConfig, now_ms: f64) -> Self {
        Self {
            interactive: cfg.interactive,
            mounted_ms: now_ms,
            reveal: 0.0,
            pointer: PointerTracker::default(),
            motion: SceneMotion::default(),
            machine: ConvergenceMachine::new(cfg, now_ms),
        }
    }

    pub fn machine(&self) -> &ConvergenceMachine {
        &self.machine
    }

    pub fn motion(&self) -> &SceneMotion {
        &self.motion
    }

    pub fn reveal(&self) -> f64 {
        self.reveal
    }

    /// Ignored entirely when the field is not interactive.
    pub fn pointer_moved(&mut self, client_x: f64, client_y: f64, width: f64, height: f64, now_ms: f64) {
        if !self.interactive {
            return;
        }
        self.pointer.aim(client_x, client_y, width, height);
        self.machine.pointer_moved(now_ms);
    }

    pub fn set_reveal(&mut self, reveal: f64) {
        self.reveal = reveal.clamp(0.0, 1.0);
    }

    pub fn frame(&mut self, now_ms: f64, pixel_ratio: f32, sink: &dyn AnalyticsSink) -> FrameUniforms {
        self.machine.tick(now_ms, self.reveal, sink);

        let pointer = self.pointer.step();
        self.motion.step(pointer);

        FrameUniforms {
            time: ((now_ms - self.mounted_ms) / 1000.0) as f32,
            pixel_ratio,
            pointer,
            scroll: self.reveal as f32,
            convergence: self.machine.convergence() as f32,
            explosion: self.machine.explosion() as f32,
        }
    }

    pub fn teardown(&mut self) {
        self.machine.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::NullSink;

    #[test]
    fn frame_reports_machine_strengths() {
        let mut sim = ParticleSim::new(ParticleConfig::default(), 1_000.0);
        sim.set_reveal(0.9);
        let mut now = 1_000.0;
        let mut u = sim.frame(now, 1.0, &NullSink);
        while now < 12_000.0 {
            now += 16.0;
            u = sim.frame(now, 1.0, &NullSink);
        }
        assert_eq!(sim.machine().phase(), Phase::Converging);
        assert!(u.convergence > 0.0);
        assert_eq!(u.explosion, 0.0);
        assert!((u.time - 11.0).abs() < 0.1);
        assert!((u.scroll - 0.9).abs() < 1e-6);
    }

    #[test]
    fn passive_field_ignores_pointer() {
        let cfg = ParticleConfig { interactive: false, ..ParticleConfig::default() };
        let mut sim = ParticleSim::new(cfg, 0.0);
        sim.pointer_moved(10.0, 10.0, 100.0, 100.0, 5_000.0);
        assert_eq!(sim.machine().idle_seconds(5_000.0), 5.0);
    }
}
