//! Era profiles and the two scroll -> era classifiers.
//!
//! `resolve` drives color blending and knows about transition windows.
//! `classify` uses hard thresholds and feeds the `data-morph-era` attribute
//! and analytics. They are allowed to disagree near the edges.

use std::fmt;

use serde::Serialize;

use crate::color::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Era {
    Hero,
    Flash,
    Developer,
    Executive,
    Ai,
}

impl Era {
    pub const ALL: [Era; 5] = [Era::Hero, Era::Flash, Era::Developer, Era::Executive, Era::Ai];

    pub fn as_str(self) -> &'static str {
        match self {
            Era::Hero => "hero",
            Era::Flash => "flash",
            Era::Developer => "developer",
            Era::Executive => "executive",
            Era::Ai => "ai",
        }
    }

    pub fn from_name(name: &str) -> Option<Era> {
        Era::ALL.into_iter().find(|e| e.as_str() == name)
    }

    pub fn profile(self) -> &'static EraProfile {
        match self {
            Era::Hero => &HERO,
            Era::Flash => &FLASH,
            Era::Developer => &DEVELOPER,
            Era::Executive => &EXECUTIVE,
            Era::Ai => &AI,
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Typography {
    pub heading: &'static str,
    pub body: &'static str,
    pub mono: &'static str,
    pub heading_weight: u16,
    /// CSS letter-spacing, e.g. `-0.02em`.
    pub letter_spacing: &'static str,
}

/// Immutable visual profile of one era.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraProfile {
    pub era: Era,
    pub bg: Rgba,
    pub bg_secondary: Rgba,
    pub text: Rgba,
    pub text_secondary: Rgba,
    pub accent: Rgba,
    pub accent_secondary: Rgba,
    pub border: Rgba,
    /// Corner radius in pixels.
    pub border_radius: i64,
    pub glow_intensity: f64,
    pub glow_color: Rgba,
    pub typography: Typography,
}

const fn rgb(hex: u32) -> Rgba {
    Rgba::opaque((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Rgba {
    Rgba { r, g, b, a }
}

const fn type_face(
    heading: &'static str,
    body: &'static str,
    heading_weight: u16,
    letter_spacing: &'static str,
) -> Typography {
    Typography { heading, body, mono: "JetBrains Mono", heading_weight, letter_spacing }
}

pub static HERO: EraProfile = EraProfile {
    era: Era::Hero,
    bg: rgb(0x0a0a0a),
    bg_secondary: rgb(0x141414),
    text: rgb(0xffffff),
    text_secondary: rgb(0xa0a0a0),
    accent: rgb(0xffffff),
    accent_secondary: rgb(0x888888),
    border: rgb(0x333333),
    border_radius: 12,
    glow_intensity: 0.0,
    glow_color: rgba(255, 255, 255, 0.2),
    typography: type_face("Inter", "Inter", 700, "-0.02em"),
};

pub static FLASH: EraProfile = EraProfile {
    era: Era::Flash,
    bg: rgb(0x1a0a2e),
    bg_secondary: rgb(0x2d1b4e),
    text: rgb(0xffffff),
    text_secondary: rgb(0xb8a8d4),
    accent: rgb(0x00ffff),
    accent_secondary: rgb(0xff00ff),
    border: rgba(0, 255, 255, 0.3),
    border_radius: 20,
    glow_intensity: 1.0,
    glow_color: rgba(0, 255, 255, 0.4),
    typography: type_face("Inter", "Verdana", 800, "0.02em"),
};

pub static DEVELOPER: EraProfile = EraProfile {
    era: Era::Developer,
    bg: rgb(0x0d1117),
    bg_secondary: rgb(0x161b22),
    text: rgb(0xc9d1d9),
    text_secondary: rgb(0x8b949e),
    accent: rgb(0x58a6ff),
    accent_secondary: rgb(0x3fb950),
    border: rgb(0x30363d),
    border_radius: 6,
    glow_intensity: 0.3,
    glow_color: rgba(88, 166, 255, 0.2),
    typography: type_face("JetBrains Mono", "Inter", 600, "0"),
};

pub static EXECUTIVE: EraProfile = EraProfile {
    era: Era::Executive,
    bg: rgb(0x000000),
    bg_secondary: rgb(0x0a0a0a),
    text: rgb(0xededed),
    text_secondary: rgb(0x888888),
    accent: rgb(0x0070f3),
    accent_secondary: rgb(0x7928ca),
    border: rgba(255, 255, 255, 0.1),
    border_radius: 12,
    glow_intensity: 0.5,
    glow_color: rgba(0, 112, 243, 0.15),
    typography: type_face("Inter", "Inter", 700, "-0.03em"),
};

pub static AI: EraProfile = EraProfile {
    era: Era::Ai,
    bg: rgb(0x030303),
    bg_secondary: rgb(0x0a0a0f),
    text: rgb(0xf0f0f0),
    text_secondary: rgb(0x707080),
    accent: rgb(0xa855f7),
    accent_secondary: rgb(0x22d3ee),
    border: rgba(168, 85, 247, 0.2),
    border_radius: 16,
    glow_intensity: 0.8,
    glow_color: rgba(168, 85, 247, 0.3),
    typography: type_face("Space Grotesk", "Inter", 600, "-0.01em"),
};

/// One era's slice of the scroll range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraBoundary {
    pub era: Era,
    pub start: f64,
    pub end: f64,
}

/// Contiguous, increasing, covering [0, 1].
pub const BOUNDARIES: [EraBoundary; 5] = [
    EraBoundary { era: Era::Hero, start: 0.0, end: 0.1 },
    EraBoundary { era: Era::Flash, start: 0.1, end: 0.3 },
    EraBoundary { era: Era::Developer, start: 0.3, end: 0.5 },
    EraBoundary { era: Era::Executive, start: 0.5, end: 0.75 },
    EraBoundary { era: Era::Ai, start: 0.75, end: 1.0 },
];

/// Share of each range that overlaps into the neighbouring transition.
pub const TRANSITION_SHARE: f64 = 0.3;

/// Output of the smooth resolver: blend `from` into `to` by `local`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraBlend {
    pub from: Era,
    pub to: Era,
    pub local: f64,
}

impl EraBlend {
    pub fn settled(era: Era) -> Self {
        Self { from: era, to: era, local: 1.0 }
    }
}

/// Maps scroll progress to the pair of eras to blend. The first matching
/// transition window wins, then the first containing range, then `ai`.
pub fn resolve(progress: f64) -> EraBlend {
    for pair in BOUNDARIES.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let window_start = current.end - (current.end - current.start) * TRANSITION_SHARE;
        let window_end = next.start + (next.end - next.start) * TRANSITION_SHARE;
        if progress >= window_start && progress <= window_end {
            let local = (progress - window_start) / (window_end - window_start);
            return EraBlend { from: current.era, to: next.era, local: local.clamp(0.0, 1.0) };
        }
    }

    BOUNDARIES
        .iter()
        .find(|b| progress >= b.start && progress <= b.end)
        .map(|b| EraBlend::settled(b.era))
        .unwrap_or(EraBlend::settled(Era::Ai))
}

/// Hard-threshold era name used for the era attribute and analytics.
pub fn classify(progress: f64) -> Era {
    if progress < 0.1 {
        Era::Hero
    } else if progress < 0.3 {
        Era::Flash
    } else if progress < 0.5 {
        Era::Developer
    } else if progress < 0.75 {
        Era::Executive
    } else {
        Era::Ai
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_partition_unit_range() {
        assert_eq!(BOUNDARIES[0].start, 0.0);
        assert_eq!(BOUNDARIES[BOUNDARIES.len() - 1].end, 1.0);
        for pair in BOUNDARIES.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].start < pair[0].end);
        }
    }

    #[test]
    fn names_round_trip() {
        for era in Era::ALL {
            assert_eq!(Era::from_name(era.as_str()), Some(era));
            assert_eq!(era.profile().era, era);
        }
        assert_eq!(Era::from_name("vaporwave"), None);
    }

    #[test]
    fn ends_are_settled() {
        assert_eq!(resolve(0.0), EraBlend::settled(Era::Hero));
        assert_eq!(resolve(1.0), EraBlend::settled(Era::Ai));
        assert_eq!(resolve(1.5), EraBlend::settled(Era::Ai));
    }

    #[test]
    fn inside_first_transition_window() {
        // hero->flash window spans [0.07, 0.16]
        let b = resolve(0.115);
        assert_eq!((b.from, b.to), (Era::Hero, Era::Flash));
        assert!((b.local - 0.5).abs() < 1e-9);
    }

    #[test]
    fn middle_of_an_era_is_settled() {
        assert_eq!(resolve(0.2), EraBlend::settled(Era::Flash));
        assert_eq!(resolve(0.62), EraBlend::settled(Era::Executive));
    }

    #[test]
    fn window_end_is_inclusive() {
        // developer->executive spans [0.44, 0.575]
        let b = resolve(0.575);
        assert_eq!((b.from, b.to), (Era::Developer, Era::Executive));
        assert!((b.local - 1.0).abs() < 1e-9);
    }

    #[test]
    fn coarse_thresholds() {
        assert_eq!(classify(0.05), Era::Hero);
        assert_eq!(classify(0.1), Era::Flash);
        assert_eq!(classify(0.15), Era::Flash);
        assert_eq!(classify(0.35), Era::Developer);
        assert_eq!(classify(0.6), Era::Executive);
        assert_eq!(classify(0.9), Era::Ai);
    }

    #[test]
    fn classifiers_can_disagree() {
        // smooth resolver is already blending toward flash, coarse says hero
        assert_eq!(classify(0.09), Era::Hero);
        assert_eq!(resolve(0.09).to, Era::Flash);
    }
}
