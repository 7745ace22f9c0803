//! Site tunables. Every field has a default; the page may override any subset
//! through a JSON blob.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Section whose reveal fraction gates the particle easter egg.
    pub ai_section_id: String,
    /// Section whose visibility fades the player volume.
    pub flash_section_id: String,
    /// Element id of the particle field container.
    pub particle_container_id: String,
    pub particles: ParticleConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            ai_section_id: "era-ai".into(),
            flash_section_id: "era-flash".into(),
            particle_container_id: "particle-field".into(),
            particles: ParticleConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Missing or malformed config falls back to defaults.
    pub fn from_json_or_default(text: Option<&str>) -> Self {
        match text.map(str::trim).filter(|t| !t.is_empty()) {
            None => Self::default(),
            Some(text) => Self::from_json(text).unwrap_or_else(|e| {
                log::warn!("ignoring malformed site config: {e}");
                Self::default()
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Pointer reacts to the field at all.
    pub interactive: bool,
    pub idle_secs: f64,
    /// Minimum section reveal before the easter egg may start.
    pub scroll_gate: f64,
    pub converge_step: f64,
    pub explode_step: f64,
    pub explode_delay_ms: f64,
    pub settle_delay_ms: f64,
    pub cooldown_ms: f64,
    pub converge_decay: f64,
    pub explode_decay: f64,
    pub snap_epsilon: f64,

    pub clusters: usize,
    pub narrow_breakpoint_px: f64,
    pub count_narrow: usize,
    pub count_wide: usize,
    pub connection_distance: f32,
    pub connections_narrow: usize,
    pub connections_wide: usize,
    /// Chance that a close enough pair becomes an edge.
    pub keep_probability: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            interactive: true,
            idle_secs: 10.0,
            scroll_gate: 0.3,
            converge_step: 0.004,
            explode_step: 0.05,
            explode_delay_ms: 500.0,
            settle_delay_ms: 200.0,
            cooldown_ms: 30_000.0,
            converge_decay: 0.95,
            explode_decay: 0.92,
            snap_epsilon: 0.01,
            clusters: 7,
            narrow_breakpoint_px: 768.0,
            count_narrow: 3000,
            count_wide: 8000,
            connection_distance: 12.0,
            connections_narrow: 300,
            connections_wide: 800,
            keep_probability: 0.3,
        }
    }
}

impl ParticleConfig {
    pub fn particle_count(&self, viewport_width: f64) -> usize {
        if viewport_width < self.narrow_breakpoint_px {
            self.count_narrow
        } else {
            self.count_wide
        }
    }

    pub fn max_connections(&self, viewport_width: f64) -> usize {
        if viewport_width < self.narrow_breakpoint_px {
            self.connections_narrow
        } else {
            self.connections_wide
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SiteConfig::from_json(r#"{ "particles": { "idle_secs": 3 } }"#).unwrap();
        assert_eq!(cfg.particles.idle_secs, 3.0);
        assert_eq!(cfg.particles.cooldown_ms, 30_000.0);
        assert_eq!(cfg.ai_section_id, "era-ai");
    }

    #[test]
    fn malformed_json_falls_back() {
        assert_eq!(SiteConfig::from_json_or_default(Some("{ nope")), SiteConfig::default());
        assert_eq!(SiteConfig::from_json_or_default(Some("  ")), SiteConfig::default());
        assert_eq!(SiteConfig::from_json_or_default(None), SiteConfig::default());
    }

    #[test]
    fn viewport_breakpoint() {
        let p = ParticleConfig::default();
        assert_eq!(p.particle_count(767.0), 3000);
        assert_eq!(p.particle_count(768.0), 8000);
        assert_eq!(p.max_connections(400.0), 300);
        assert_eq!(p.max_connections(1920.0), 800);
    }
}
