//! Scroll-driven era morphing and the particle field behind it.
//!
//! The algorithmic core (interpolation, era resolution, the morph driver and
//! the particle state machine) is plain Rust and builds on any target. Browser
//! wiring lives in the private `wasm` module and only compiles for wasm32.

pub mod analytics;
pub mod color;
pub mod config;
pub mod era;
pub mod ide;
pub mod morph;
pub mod particles;
pub mod player;
pub mod schedule;
pub mod theme;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub use wasm::{ParticleField, RetroPlayer, Site};

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::analytics::AnalyticsSink;
    use crate::config::SiteConfig;
    use crate::morph::InitOnce;

    mod dom;
    mod morph;
    mod player;
    mod render;

    pub use player::RetroPlayer;
    pub use render::ParticleField;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("era morph wasm loaded");
        Ok(())
    }

    /// Page bootstrap. Owns the once-only morph token, the config and the
    /// analytics sink shared by every widget.
    #[wasm_bindgen]
    pub struct Site {
        config: SiteConfig,
        morph_token: InitOnce,
        sink: Rc<dyn AnalyticsSink>,
    }

    impl Site {
        fn try_mount_particles(&self) -> Result<ParticleField, JsValue> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or("no document")?;
            let container = document
                .get_element_by_id(&self.config.particle_container_id)
                .ok_or("particle container not found")?
                .dyn_into::<web_sys::HtmlElement>()?;
            ParticleField::mount(&document, container, &self.config, self.sink.clone())
        }
    }

    #[wasm_bindgen]
    impl Site {
        pub fn boot() -> Result<Site, JsValue> {
            let window = web_sys::window().ok_or("no window")?;
            let document = window.document().ok_or("no document")?;
            let config = dom::load_config(&document);
            Ok(Site { config, morph_token: InitOnce::new(), sink: Rc::new(dom::PosthogSink) })
        }

        /// Starts era morphing. Later calls are ignored.
        #[wasm_bindgen(js_name = startMorph)]
        pub fn start_morph(&self) -> Result<(), JsValue> {
            morph::start(&self.morph_token, self.sink.clone())
        }

        /// Mounts the particle field into the configured container. A missing
        /// container or an unusable WebGL2 context is logged and yields
        /// `undefined`; it never throws.
        #[wasm_bindgen(js_name = mountParticles)]
        pub fn mount_particles(&self) -> Option<ParticleField> {
            match self.try_mount_particles() {
                Ok(field) => Some(field),
                Err(e) => {
                    log::warn!("particle field disabled: {e:?}");
                    None
                }
            }
        }

        pub fn player(&self, audio_id: &str) -> Result<RetroPlayer, JsValue> {
            RetroPlayer::attach(audio_id, &self.config, self.sink.clone())
        }

        /// Highlighted HTML for one of the editor's canned files.
        #[wasm_bindgen(js_name = renderFile)]
        pub fn render_file(path: &str) -> String {
            crate::ide::render(path)
        }
    }
}
