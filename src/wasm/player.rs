use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{AnalyserNode, AudioContext, AudioContextState, HtmlAudioElement};

use super::dom::{self, Listener};
use crate::analytics::AnalyticsSink;
use crate::config::SiteConfig;
use crate::player::{format_time, visible_ratio, PlayerState};

const FFT_SIZE: u32 = 64;
const SMOOTHING: f64 = 0.8;

struct AudioGraph {
    context: AudioContext,
    analyser: AnalyserNode,
    bins: Vec<u8>,
}

impl AudioGraph {
    fn build(audio: &HtmlAudioElement) -> Result<Self, JsValue> {
        let context = AudioContext::new()?;
        let analyser = context.create_analyser()?;
        analyser.set_fft_size(FFT_SIZE);
        analyser.set_smoothing_time_constant(SMOOTHING);
        let source = context.create_media_element_source(audio)?;
        source.connect_with_audio_node(&analyser)?;
        analyser.connect_with_audio_node(&context.destination())?;
        let bins = vec![0; analyser.frequency_bin_count() as usize];
        Ok(Self { context, analyser, bins })
    }
}

struct Shared {
    audio: HtmlAudioElement,
    state: RefCell<PlayerState>,
    sink: Rc<dyn AnalyticsSink>,
    graph: RefCell<Option<AudioGraph>>,
    graph_failed: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
    rng: RefCell<StdRng>,
}

impl Shared {
    /// The analyser is created on first play, after a user gesture.
    fn ensure_graph(&self) {
        if self.graph.borrow().is_some() || self.graph_failed.get() {
            return;
        }
        match AudioGraph::build(&self.audio) {
            Ok(graph) => *self.graph.borrow_mut() = Some(graph),
            Err(e) => {
                log::warn!("audio analyser unavailable, using idle spectrum: {e:?}");
                self.graph_failed.set(true);
            }
        }
    }

    fn load_current(&self) {
        let state = self.state.borrow();
        self.audio.set_src(state.track().src);
        self.audio.load();
        self.audio.set_volume(state.volume());
    }

    fn play(self: &Rc<Self>) {
        if !self.state.borrow().has_audio() {
            return;
        }
        self.ensure_graph();
        if let Some(graph) = self.graph.borrow().as_ref() {
            if graph.context.state() == AudioContextState::Suspended {
                let _ = graph.context.resume();
            }
        }

        let promise = match self.audio.play() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("play failed: {e:?}");
                return;
            }
        };
        let shared = self.clone();
        let on_ok = Closure::once(move |_: JsValue| {
            shared.state.borrow_mut().started(shared.sink.as_ref());
        });
        let on_err = Closure::once(move |e: JsValue| {
            log::warn!("playback rejected: {e:?}");
        });
        let _ = promise.then2(&on_ok, &on_err);
        on_ok.forget();
        on_err.forget();
    }

    fn switch_track(self: &Rc<Self>, forward: bool) {
        let was_playing = self.state.borrow().is_playing();
        {
            let mut state = self.state.borrow_mut();
            if forward {
                state.next(self.sink.as_ref());
            } else {
                state.previous(self.sink.as_ref());
            }
        }
        self.load_current();
        if was_playing {
            self.play();
        }
    }
}

/// Binds a [`PlayerState`] to an `<audio>` element and exposes the skin's
/// controls to script.
#[wasm_bindgen]
pub struct RetroPlayer {
    shared: Rc<Shared>,
}

impl RetroPlayer {
    pub fn attach(
        audio_id: &str,
        config: &SiteConfig,
        sink: Rc<dyn AnalyticsSink>,
    ) -> Result<RetroPlayer, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let audio = document
            .get_element_by_id(audio_id)
            .ok_or("audio element not found")?
            .dyn_into::<HtmlAudioElement>()?;

        let shared = Rc::new(Shared {
            audio,
            state: RefCell::new(PlayerState::new()),
            sink,
            graph: RefCell::new(None),
            graph_failed: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            rng: RefCell::new(StdRng::from_entropy()),
        });
        shared.load_current();

        let media_event = |kind: &'static str, f: fn(&Rc<Shared>)| -> Result<Listener, JsValue> {
            let s = shared.clone();
            Listener::passive(
                &shared.audio,
                kind,
                Closure::wrap(Box::new(move |_: web_sys::Event| f(&s))
                    as Box<dyn FnMut(web_sys::Event)>),
            )
        };

        let mut listeners = vec![
            media_event("timeupdate", |s| {
                let t = s.audio.current_time();
                s.state.borrow_mut().time_update(t);
            })?,
            media_event("durationchange", |s| {
                let d = s.audio.duration();
                s.state.borrow_mut().duration_changed(d);
            })?,
            media_event("ended", |s| {
                s.state.borrow_mut().ended();
                let keep_going = s.state.borrow().is_playing();
                s.load_current();
                if keep_going {
                    s.play();
                }
            })?,
            media_event("error", |s| s.state.borrow_mut().media_error())?,
        ];

        let section_id = config.flash_section_id.clone();
        let s = shared.clone();
        listeners.push(Listener::passive(
            &window,
            "scroll",
            Closure::wrap(Box::new(move |_: web_sys::Event| {
                let Some(document) = web_sys::window().and_then(|w| w.document()) else { return };
                let Some((top, bottom)) = dom::section_rect(&document, &section_id) else { return };
                let (_, viewport_h) = dom::viewport_size();
                let volume = s
                    .state
                    .borrow_mut()
                    .visibility_changed(visible_ratio(top, bottom, viewport_h));
                s.audio.set_volume(volume);
            }) as Box<dyn FnMut(web_sys::Event)>),
        )?);

        *shared.listeners.borrow_mut() = listeners;
        Ok(RetroPlayer { shared })
    }
}

#[wasm_bindgen]
impl RetroPlayer {
    pub fn play(&self) {
        self.shared.play();
    }

    pub fn pause(&self) {
        let _ = self.shared.audio.pause();
        self.shared.state.borrow_mut().pause(self.shared.sink.as_ref());
    }

    pub fn stop(&self) {
        let _ = self.shared.audio.pause();
        self.shared.audio.set_current_time(0.0);
        self.shared.state.borrow_mut().stop(self.shared.sink.as_ref());
    }

    pub fn next(&self) {
        self.shared.switch_track(true);
    }

    pub fn prev(&self) {
        self.shared.switch_track(false);
    }

    /// `fraction` is the click position across the volume slider.
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, fraction: f64) {
        let v = self
            .shared
            .state
            .borrow_mut()
            .set_volume(fraction, self.shared.sink.as_ref());
        self.shared.audio.set_volume(v);
    }

    pub fn seek(&self, fraction: f64) {
        let to = self
            .shared
            .state
            .borrow_mut()
            .seek(fraction, self.shared.sink.as_ref());
        if let Some(to) = to {
            self.shared.audio.set_current_time(to);
        }
    }

    /// Bar heights in percent for the visualizer, one call per frame.
    pub fn spectrum(&self) -> Vec<f32> {
        let shared = &self.shared;
        let mut graph = shared.graph.borrow_mut();
        let bins = graph.as_mut().map(|g| {
            g.analyser.get_byte_frequency_data(&mut g.bins);
            g.bins.as_slice()
        });
        let mut state = shared.state.borrow_mut();
        state.update_spectrum(bins, &mut *shared.rng.borrow_mut());
        state.spectrum().to_vec()
    }

    pub fn marquee(&self) -> String {
        self.shared.state.borrow().marquee()
    }

    #[wasm_bindgen(js_name = playlistLabel)]
    pub fn playlist_label(&self) -> String {
        self.shared.state.borrow().playlist_label()
    }

    #[wasm_bindgen(js_name = timeLabel)]
    pub fn time_label(&self) -> String {
        let state = self.shared.state.borrow();
        format!("{} / {}", format_time(state.position()), format_time(state.duration()))
    }

    #[wasm_bindgen(js_name = seekPercent)]
    pub fn seek_percent(&self) -> f64 {
        self.shared.state.borrow().seek_percent()
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.shared.state.borrow().is_playing()
    }

    #[wasm_bindgen(js_name = hasAudio)]
    pub fn has_audio(&self) -> bool {
        self.shared.state.borrow().has_audio()
    }

    /// Pauses, detaches listeners and closes the audio context.
    pub fn destroy(&self) {
        let _ = self.shared.audio.pause();
        for listener in self.shared.listeners.borrow_mut().drain(..) {
            listener.remove();
        }
        if let Some(graph) = self.shared.graph.borrow_mut().take() {
            let _ = graph.context.close();
        }
    }
}
