//! The theme surface written by the morph driver every frame.

use crate::color::{interpolate_scalar, lerp_px, Rgba};
use crate::era::{EraBlend, EraProfile};

/// CSS custom properties in write order.
pub const VARIABLES: [&str; 10] = [
    "--era-bg",
    "--era-bg-secondary",
    "--era-text",
    "--era-text-secondary",
    "--era-accent",
    "--era-accent-secondary",
    "--era-border",
    "--era-border-radius",
    "--era-glow-intensity",
    "--era-glow-color",
];

/// Attribute reflecting the coarse era for declarative selectors.
pub const ERA_ATTRIBUTE: &str = "data-morph-era";

/// A fully blended set of theme values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeVars {
    pub bg: Rgba,
    pub bg_secondary: Rgba,
    pub text: Rgba,
    pub text_secondary: Rgba,
    pub accent: Rgba,
    pub accent_secondary: Rgba,
    pub border: Rgba,
    pub border_radius: i64,
    pub glow_intensity: f64,
    pub glow_color: Rgba,
}

impl ThemeVars {
    pub fn of(profile: &EraProfile) -> Self {
        Self {
            bg: profile.bg,
            bg_secondary: profile.bg_secondary,
            text: profile.text,
            text_secondary: profile.text_secondary,
            accent: profile.accent,
            accent_secondary: profile.accent_secondary,
            border: profile.border,
            border_radius: profile.border_radius,
            glow_intensity: profile.glow_intensity,
            glow_color: profile.glow_color,
        }
    }

    pub fn blend(from: &EraProfile, to: &EraProfile, t: f64) -> Self {
        Self {
            bg: from.bg.lerp(to.bg, t),
            bg_secondary: from.bg_secondary.lerp(to.bg_secondary, t),
            text: from.text.lerp(to.text, t),
            text_secondary: from.text_secondary.lerp(to.text_secondary, t),
            accent: from.accent.lerp(to.accent, t),
            accent_secondary: from.accent_secondary.lerp(to.accent_secondary, t),
            border: from.border.lerp(to.border, t),
            border_radius: lerp_px(from.border_radius, to.border_radius, t),
            glow_intensity: interpolate_scalar(from.glow_intensity, to.glow_intensity, t),
            glow_color: from.glow_color.lerp(to.glow_color, t),
        }
    }

    pub fn for_blend(blend: &EraBlend) -> Self {
        Self::blend(blend.from.profile(), blend.to.profile(), blend.local)
    }

    /// `(variable, css value)` pairs, ordered as [`VARIABLES`].
    pub fn css_pairs(&self) -> [(&'static str, String); 10] {
        [
            (VARIABLES[0], self.bg.to_string()),
            (VARIABLES[1], self.bg_secondary.to_string()),
            (VARIABLES[2], self.text.to_string()),
            (VARIABLES[3], self.text_secondary.to_string()),
            (VARIABLES[4], self.accent.to_string()),
            (VARIABLES[5], self.accent_secondary.to_string()),
            (VARIABLES[6], self.border.to_string()),
            (VARIABLES[7], format!("{}px", self.border_radius)),
            (VARIABLES[8], self.glow_intensity.to_string()),
            (VARIABLES[9], self.glow_color.to_string()),
        ]
    }
}
