use era_morph::analytics::{RecordingSink, EASTER_EGG_FOUND, ERA_ENTERED, ERA_EXITED, SCROLL_MILESTONE};
use era_morph::config::ParticleConfig;
use era_morph::era::{self, Era};
use era_morph::morph::{InitOnce, MemorySurface, MorphDriver};
use era_morph::particles::{ConvergenceMachine, Phase};
use era_morph::theme::{ThemeVars, ERA_ATTRIBUTE};
use serde_json::json;

fn theme_of(surface: &MemorySurface) -> Vec<String> {
    era_morph::theme::VARIABLES
        .iter()
        .map(|name| surface.variable(name).unwrap_or_default().to_owned())
        .collect()
}

#[test]
fn endpoints_settle_on_first_and_last_era() {
    let token = InitOnce::new();
    let mut driver = MorphDriver::start(&token).unwrap();
    let mut surface = MemorySurface::default();
    let sink = RecordingSink::new();

    driver.recompute(0.0, 0.0, &mut surface, &sink);
    let expected: Vec<String> =
        ThemeVars::of(Era::Hero.profile()).css_pairs().into_iter().map(|(_, v)| v).collect();
    assert_eq!(theme_of(&surface), expected);
    assert_eq!(surface.attribute(ERA_ATTRIBUTE), Some("hero"));

    driver.recompute(1.0, 1_000.0, &mut surface, &sink);
    let expected: Vec<String> =
        ThemeVars::of(Era::Ai.profile()).css_pairs().into_iter().map(|(_, v)| v).collect();
    assert_eq!(theme_of(&surface), expected);
    assert_eq!(surface.attribute(ERA_ATTRIBUTE), Some("ai"));
}

#[test]
fn recompute_is_idempotent() {
    let token = InitOnce::new();
    let mut driver = MorphDriver::start(&token).unwrap();
    let sink = RecordingSink::new();

    for p in [0.05, 0.27, 0.42, 0.6, 0.9] {
        let mut a = MemorySurface::default();
        let mut b = MemorySurface::default();
        let first = driver.recompute(p, 0.0, &mut a, &sink);
        let second = driver.recompute(p, 0.0, &mut b, &sink);
        assert_eq!(first.theme, second.theme);
        assert_eq!(theme_of(&a), theme_of(&b));
        assert!(!second.era_changed);
    }
}

#[test]
fn classifier_and_resolver_agree_away_from_windows() {
    for (p, expected) in [(0.0, Era::Hero), (0.2, Era::Flash), (0.4, Era::Developer), (0.62, Era::Executive), (0.95, Era::Ai)] {
        assert_eq!(era::classify(p), expected);
        let blend = era::resolve(p);
        assert_eq!((blend.from, blend.to), (expected, expected), "at {p}");
    }
}

#[test]
fn scrolling_through_reports_eras_and_milestones_once() {
    let token = InitOnce::new();
    let mut driver = MorphDriver::start(&token).unwrap();
    let mut surface = MemorySurface::default();
    let sink = RecordingSink::new();

    let mut now = 0.0;
    for _ in 0..2 {
        for step in 0..=100 {
            driver.recompute(step as f64 / 100.0, now, &mut surface, &sink);
            now += 100.0;
        }
    }

    let milestones: Vec<_> = sink
        .named(SCROLL_MILESTONE)
        .iter()
        .map(|e| e.get("milestone_percent").cloned())
        .collect();
    assert_eq!(milestones, vec![Some(json!(25)), Some(json!(50)), Some(json!(75)), Some(json!(100))]);

    // five eras on the way down, then back to hero and down again
    assert_eq!(sink.named(ERA_ENTERED).len(), 10);
    assert_eq!(sink.named(ERA_EXITED).len(), 9);
    assert!(driver.era_timer().total_seconds(Era::Hero) > 0.0);
}

#[test]
fn full_convergence_cycle_rearms_after_cooldown() {
    let sink = RecordingSink::new();
    let mut m = ConvergenceMachine::new(ParticleConfig::default(), 0.0);
    let mut now = 0.0;
    let mut saw_explosion = false;

    let mut run = |m: &mut ConvergenceMachine, until: f64| {
        while now < until {
            now += 16.0;
            if m.tick(now, 1.0, &sink) == Phase::Exploding {
                saw_explosion = true;
            }
        }
    };

    run(&mut m, 16_000.0);
    assert_eq!(m.phase(), Phase::Normal);
    assert!(m.is_latched());

    run(&mut m, 44_000.0);
    assert_eq!(sink.named(EASTER_EGG_FOUND).len(), 1);
    assert!(m.is_latched());

    run(&mut m, 47_000.0);
    assert_eq!(sink.named(EASTER_EGG_FOUND).len(), 2);
    drop(run);
    assert!(saw_explosion);
}
