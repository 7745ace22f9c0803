//! Retro audio player state. Decoding and playback belong to the page's
//! media element; this only tracks what the skin shows and reports
//! interactions.

use rand::Rng;

use crate::analytics::{self, AnalyticsSink, PlayerAction, PlayerInteraction};

pub const SPECTRUM_BARS: usize = 16;
const SPECTRUM_FLOOR: f32 = 15.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: &'static str,
    pub artist: &'static str,
    pub src: &'static str,
}

pub static PLAYLIST: [Track; 3] = [
    Track { title: "Electric Dreams", artist: "Diogo Reus", src: "/audio/track1.mp3" },
    Track { title: "Pixel Perfect", artist: "Diogo Reus", src: "/audio/track2.mp3" },
    Track { title: "Flash Forward", artist: "Diogo Reus", src: "/audio/track3.mp3" },
];

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    track: usize,
    playing: bool,
    position: f64,
    duration: f64,
    volume: f64,
    user_volume: f64,
    has_audio: bool,
    spectrum: [f32; SPECTRUM_BARS],
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            track: 0,
            playing: false,
            position: 0.0,
            duration: 0.0,
            volume: 0.75,
            user_volume: 0.75,
            has_audio: true,
            spectrum: [20.0; SPECTRUM_BARS],
        }
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_index(&self) -> usize {
        self.track
    }

    pub fn track(&self) -> &'static Track {
        &PLAYLIST[self.track]
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    pub fn spectrum(&self) -> &[f32; SPECTRUM_BARS] {
        &self.spectrum
    }

    /// `Track 2/3` label.
    pub fn playlist_label(&self) -> String {
        format!("Track {}/{}", self.track + 1, PLAYLIST.len())
    }

    pub fn marquee(&self) -> String {
        let t = self.track();
        format!("{} - {}", t.artist, t.title)
    }

    pub fn seek_percent(&self) -> f64 {
        if self.duration > 0.0 {
            self.position / self.duration * 100.0
        } else {
            0.0
        }
    }

    /// Called once the media element actually started.
    pub fn started(&mut self, sink: &dyn AnalyticsSink) {
        self.playing = true;
        sink.capture(analytics::player_control(PlayerAction::Play, self.track));
    }

    pub fn pause(&mut self, sink: &dyn AnalyticsSink) {
        self.playing = false;
        sink.capture(analytics::player_control(PlayerAction::Pause, self.track));
    }

    /// Pauses and rewinds.
    pub fn stop(&mut self, sink: &dyn AnalyticsSink) {
        self.playing = false;
        self.position = 0.0;
        sink.capture(analytics::player_control(PlayerAction::Stop, self.track));
    }

    pub fn previous(&mut self, sink: &dyn AnalyticsSink) -> usize {
        let to = if self.track == 0 { PLAYLIST.len() - 1 } else { self.track - 1 };
        self.switch_to(to, sink)
    }

    pub fn next(&mut self, sink: &dyn AnalyticsSink) -> usize {
        let to = (self.track + 1) % PLAYLIST.len();
        self.switch_to(to, sink)
    }

    fn switch_to(&mut self, to: usize, sink: &dyn AnalyticsSink) -> usize {
        sink.capture(analytics::player_track_change(self.track, to));
        self.track = to;
        self.position = 0.0;
        to
    }

    /// End of the current track: advance, or wrap to the first and stop.
    pub fn ended(&mut self) {
        self.position = 0.0;
        if self.track + 1 < PLAYLIST.len() {
            self.track += 1;
        } else {
            self.track = 0;
            self.playing = false;
        }
    }

    pub fn media_error(&mut self) {
        log::warn!("audio unavailable for {}", self.track().src);
        self.has_audio = false;
    }

    pub fn time_update(&mut self, position: f64) {
        self.position = position;
    }

    pub fn duration_changed(&mut self, duration: f64) {
        self.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
    }

    /// Volume from a click at `fraction` of the slider width.
    pub fn set_volume(&mut self, fraction: f64, sink: &dyn AnalyticsSink) -> f64 {
        let v = fraction.clamp(0.0, 1.0);
        self.volume = v;
        self.user_volume = v;
        sink.capture(analytics::player_interaction(PlayerInteraction::Volume, v));
        v
    }

    /// Seek to `fraction` of the track. No-op while the duration is unknown.
    pub fn seek(&mut self, fraction: f64, sink: &dyn AnalyticsSink) -> Option<f64> {
        if self.duration <= 0.0 {
            return None;
        }
        let to = fraction * self.duration;
        self.position = to;
        sink.capture(analytics::player_interaction(PlayerInteraction::Seek, to / self.duration));
        Some(to)
    }

    /// Fades the effective volume out as the host section leaves the viewport.
    pub fn visibility_changed(&mut self, ratio: f64) -> f64 {
        let v = fade_volume(self.user_volume, ratio);
        self.volume = v;
        v
    }

    /// Feeds one frame of analyser data, or synthesizes idle bars when
    /// paused or when no analyser is available.
    pub fn update_spectrum<R: Rng>(&mut self, analyser: Option<&[u8]>, rng: &mut R) {
        match analyser {
            Some(bins) if self.playing => self.spectrum = spectrum_bars(bins),
            _ if !self.playing => {
                for bar in self.spectrum.iter_mut() {
                    *bar = SPECTRUM_FLOOR + rng.gen::<f32>() * 10.0;
                }
            }
            _ => {}
        }
    }
}

pub fn fade_volume(user_volume: f64, ratio: f64) -> f64 {
    let v = if ratio > 0.3 { user_volume } else { user_volume * (ratio / 0.3) };
    v.clamp(0.0, 1.0)
}

/// Share of a section `[top, bottom)` inside a viewport of height `viewport_h`.
pub fn visible_ratio(top: f64, bottom: f64, viewport_h: f64) -> f64 {
    let height = bottom - top;
    if height <= 0.0 {
        return 0.0;
    }
    let shown = bottom.min(viewport_h) - top.max(0.0);
    (shown / height).clamp(0.0, 1.0)
}

/// Down-samples analyser bytes to bar heights in percent, floored at 15.
pub fn spectrum_bars(bins: &[u8]) -> [f32; SPECTRUM_BARS] {
    let mut bars = [SPECTRUM_FLOOR; SPECTRUM_BARS];
    let step = bins.len() / SPECTRUM_BARS;
    if step == 0 {
        return bars;
    }
    for (i, bar) in bars.iter_mut().enumerate() {
        *bar = (bins[i * step] as f32 / 255.0 * 100.0).max(SPECTRUM_FLOOR);
    }
    bars
}

/// `mm:ss`; non-finite input shows `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".into();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
