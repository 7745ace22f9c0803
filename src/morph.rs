//! Scroll-driven era morphing.
//!
//! The driver is pure with respect to the page: scroll progress and a clock
//! come in, theme variables and analytics go out through the
//! [`StyleSurface`] and [`AnalyticsSink`] seams. The browser wiring that
//! feeds it lives in `wasm::morph`.

use std::cell::Cell;
use std::collections::HashMap;

use crate::analytics::{AnalyticsSink, EraTimer, MilestoneTracker};
use crate::era::{self, Era, EraBlend};
use crate::theme::{ThemeVars, ERA_ATTRIBUTE};

/// Once-only initialization token owned by whoever bootstraps the page.
#[derive(Debug, Default)]
pub struct InitOnce {
    claimed: Cell<bool>,
}

impl InitOnce {
    pub const fn new() -> Self {
        Self { claimed: Cell::new(false) }
    }

    /// True exactly once until [`InitOnce::reset`].
    pub fn claim(&self) -> bool {
        !self.claimed.replace(true)
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.get()
    }

    pub fn reset(&self) {
        self.claimed.set(false);
    }
}

/// Collapses bursts of scroll/resize events into one recompute per frame.
#[derive(Debug, Default)]
pub struct FrameCoalescer {
    pending: bool,
}

impl FrameCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the caller has to request an animation frame.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Call from inside the frame callback, before recomputing.
    pub fn finish(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Where theme variables and the era attribute end up.
pub trait StyleSurface {
    fn set_variable(&mut self, name: &str, value: &str);
    fn set_attribute(&mut self, name: &str, value: &str);
}

/// In-memory surface, handy off the page.
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    pub variables: HashMap<String, String>,
    pub attributes: HashMap<String, String>,
}

impl MemorySurface {
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl StyleSurface for MemorySurface {
    fn set_variable(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_owned(), value.to_owned());
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_owned(), value.to_owned());
    }
}

/// Document scroll position as a fraction of the scrollable height.
pub fn scroll_progress(scroll_y: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable > 0.0 {
        (scroll_y / scrollable).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// What one recompute produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphFrame {
    pub progress: f64,
    pub blend: EraBlend,
    pub theme: ThemeVars,
    pub era: Era,
    pub era_changed: bool,
}

#[derive(Debug)]
pub struct MorphDriver {
    progress: f64,
    last_era: Option<Era>,
    timer: EraTimer,
    milestones: MilestoneTracker,
}

impl MorphDriver {
    /// Returns a driver only the first time `token` is presented.
    pub fn start(token: &InitOnce) -> Option<Self> {
        if !token.claim() {
            log::debug!("era morph already initialized");
            return None;
        }
        Some(Self {
            progress: 0.0,
            last_era: None,
            timer: EraTimer::new(),
            milestones: MilestoneTracker::new(),
        })
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn current_era(&self) -> Option<Era> {
        self.last_era
    }

    pub fn era_timer(&self) -> &EraTimer {
        &self.timer
    }

    pub fn recompute(
        &mut self,
        progress: f64,
        now_ms: f64,
        surface: &mut dyn StyleSurface,
        sink: &dyn AnalyticsSink,
    ) -> MorphFrame {
        let progress = progress.clamp(0.0, 1.0);
        self.progress = progress;

        let blend = era::resolve(progress);
        let theme = ThemeVars::for_blend(&blend);
        for (name, value) in theme.css_pairs() {
            surface.set_variable(name, &value);
        }

        let era = era::classify(progress);
        surface.set_attribute(ERA_ATTRIBUTE, era.as_str());

        let era_changed = self.last_era != Some(era);
        if era_changed {
            log::debug!("era -> {era} at {:.3}", progress);
            self.timer.enter(era, progress, now_ms, sink);
            self.last_era = Some(era);
        }

        self.milestones.observe(progress, sink);

        MorphFrame { progress, blend, theme, era, era_changed }
    }
}
