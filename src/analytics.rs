//! Fire-and-forget analytics events.
//!
//! The core only ever emits; sinks never report back and a failed capture is
//! invisible to the caller.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::era::Era;

pub const ERA_ENTERED: &str = "era_entered";
pub const ERA_EXITED: &str = "era_exited";
pub const SCROLL_MILESTONE: &str = "scroll_milestone";
pub const EASTER_EGG_FOUND: &str = "easter_egg_found";
pub const PLAYER_CONTROL: &str = "winamp_control";
pub const PLAYER_TRACK_CHANGE: &str = "winamp_track_change";
pub const PLAYER_INTERACTION: &str = "winamp_interaction";

/// Scroll depths reported once per session, in percent.
pub const MILESTONES: [u32; 4] = [25, 50, 75, 100];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: &'static str,
    pub properties: Map<String, Value>,
}

impl AnalyticsEvent {
    /// Builds an event from a `json!({...})` object. Anything else yields an
    /// empty property map.
    pub fn new(name: &'static str, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { name, properties }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

pub trait AnalyticsSink {
    fn capture(&self, event: AnalyticsEvent);
}

/// Discards everything. Used when no analytics transport is present.
#[derive(Debug, Default)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn capture(&self, event: AnalyticsEvent) {
        log::debug!("analytics disabled, dropping {}", event.name);
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<AnalyticsEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.borrow().clone()
    }

    pub fn named(&self, name: &str) -> Vec<AnalyticsEvent> {
        self.events.borrow().iter().filter(|e| e.name == name).cloned().collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl AnalyticsSink for RecordingSink {
    fn capture(&self, event: AnalyticsEvent) {
        self.events.borrow_mut().push(event);
    }
}

fn one_decimal(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn two_decimals(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn percent(progress: f64) -> u32 {
    (progress * 100.0).round().max(0.0) as u32
}

/// Time spent per era, reported as enter/exit pairs.
#[derive(Debug, Default)]
pub struct EraTimer {
    current: Option<(Era, f64)>,
    totals: HashMap<Era, f64>,
}

impl EraTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Era> {
        self.current.map(|(era, _)| era)
    }

    /// Cumulative seconds spent in `era` across completed visits.
    pub fn total_seconds(&self, era: Era) -> f64 {
        self.totals.get(&era).copied().unwrap_or(0.0)
    }

    /// Records a switch to `era` at `now_ms`. Re-entering the current era is
    /// a no-op.
    pub fn enter(&mut self, era: Era, progress: f64, now_ms: f64, sink: &dyn AnalyticsSink) {
        if self.current() == Some(era) {
            return;
        }

        if let Some((prev, started)) = self.current {
            let spent = ((now_ms - started) / 1000.0).max(0.0);
            let total = self.totals.entry(prev).or_insert(0.0);
            *total += spent;
            sink.capture(AnalyticsEvent::new(
                ERA_EXITED,
                json!({
                    "era_name": prev.as_str(),
                    "time_spent_seconds": one_decimal(spent),
                    "total_time_in_era": one_decimal(*total),
                }),
            ));
        }

        sink.capture(AnalyticsEvent::new(
            ERA_ENTERED,
            json!({ "era_name": era.as_str(), "scroll_depth": percent(progress) }),
        ));
        self.current = Some((era, now_ms));
    }
}

/// Fires each of [`MILESTONES`] at most once.
#[derive(Debug, Default)]
pub struct MilestoneTracker {
    fired: BTreeSet<u32>,
}

impl MilestoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fired(&self) -> impl Iterator<Item = u32> + '_ {
        self.fired.iter().copied()
    }

    pub fn observe(&mut self, progress: f64, sink: &dyn AnalyticsSink) {
        let actual = percent(progress);
        for milestone in MILESTONES {
            if actual >= milestone && self.fired.insert(milestone) {
                sink.capture(AnalyticsEvent::new(
                    SCROLL_MILESTONE,
                    json!({ "milestone_percent": milestone, "actual_percent": actual }),
                ));
            }
        }
    }
}

pub fn easter_egg(id: &str) -> AnalyticsEvent {
    AnalyticsEvent::new(EASTER_EGG_FOUND, json!({ "easter_egg_id": id }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerAction {
    Play,
    Pause,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerInteraction {
    Volume,
    Seek,
}

pub fn player_control(action: PlayerAction, track_index: usize) -> AnalyticsEvent {
    AnalyticsEvent::new(PLAYER_CONTROL, json!({ "action": action, "track_index": track_index }))
}

pub fn player_track_change(from: usize, to: usize) -> AnalyticsEvent {
    AnalyticsEvent::new(PLAYER_TRACK_CHANGE, json!({ "from_track": from, "to_track": to }))
}

pub fn player_interaction(kind: PlayerInteraction, value: f64) -> AnalyticsEvent {
    AnalyticsEvent::new(
        PLAYER_INTERACTION,
        json!({ "interaction_type": kind, "value": two_decimals(value) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_entry_has_no_exit() {
        let sink = RecordingSink::new();
        let mut timer = EraTimer::new();
        timer.enter(Era::Hero, 0.0, 1_000.0, &sink);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, ERA_ENTERED);
        assert_eq!(events[0].get("era_name"), Some(&json!("hero")));
        assert_eq!(events[0].get("scroll_depth"), Some(&json!(0)));
    }

    #[test]
    fn exit_carries_cumulative_time() {
        let sink = RecordingSink::new();
        let mut timer = EraTimer::new();
        timer.enter(Era::Hero, 0.0, 0.0, &sink);
        timer.enter(Era::Flash, 0.12, 2_500.0, &sink);
        timer.enter(Era::Hero, 0.05, 4_000.0, &sink);
        timer.enter(Era::Flash, 0.12, 5_040.0, &sink);

        let exits = sink.named(ERA_EXITED);
        assert_eq!(exits.len(), 3);
        assert_eq!(exits[2].get("era_name"), Some(&json!("hero")));
        assert_eq!(exits[2].get("time_spent_seconds"), Some(&json!(1.0)));
        assert_eq!(exits[2].get("total_time_in_era"), Some(&json!(3.5)));
        assert!((timer.total_seconds(Era::Hero) - 3.54).abs() < 1e-9);
    }

    #[test]
    fn same_era_is_ignored() {
        let sink = RecordingSink::new();
        let mut timer = EraTimer::new();
        timer.enter(Era::Ai, 0.9, 0.0, &sink);
        timer.enter(Era::Ai, 0.95, 100.0, &sink);
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn milestones_fire_once_each() {
        let sink = RecordingSink::new();
        let mut tracker = MilestoneTracker::new();
        for p in [0.1, 0.26, 0.3, 0.26, 0.8, 0.2, 1.0, 1.0] {
            tracker.observe(p, &sink);
        }

        let hits: Vec<_> = sink
            .named(SCROLL_MILESTONE)
            .iter()
            .map(|e| e.get("milestone_percent").cloned())
            .collect();
        assert_eq!(hits, vec![Some(json!(25)), Some(json!(50)), Some(json!(75)), Some(json!(100))]);
        assert_eq!(tracker.fired().collect::<Vec<_>>(), MILESTONES.to_vec());
    }

    #[test]
    fn jump_fires_every_passed_milestone() {
        let sink = RecordingSink::new();
        let mut tracker = MilestoneTracker::new();
        tracker.observe(0.76, &sink);
        let events = sink.named(SCROLL_MILESTONE);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.get("actual_percent") == Some(&json!(76))));
    }

    #[test]
    fn player_events_shape() {
        let e = player_control(PlayerAction::Pause, 2);
        assert_eq!(e.get("action"), Some(&json!("pause")));
        let e = player_interaction(PlayerInteraction::Seek, 0.33333);
        assert_eq!(e.get("interaction_type"), Some(&json!("seek")));
        assert_eq!(e.get("value"), Some(&json!(0.33)));
    }
}
