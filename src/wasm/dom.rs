//! Thin adapters from the core seams onto the live document.

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Document, Element, EventTarget, HtmlElement};

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::config::SiteConfig;
use crate::morph::StyleSurface;

const CONFIG_ELEMENT_ID: &str = "site-config";

/// Writes theme variables onto `<html>` so every element inherits them.
pub struct DocumentSurface {
    root: HtmlElement,
}

impl DocumentSurface {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        let root = document
            .document_element()
            .ok_or("no document element")?
            .dyn_into::<HtmlElement>()?;
        Ok(Self { root })
    }
}

impl StyleSurface for DocumentSurface {
    fn set_variable(&mut self, name: &str, value: &str) {
        let _ = self.root.style().set_property(name, value);
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        let _ = self.root.set_attribute(name, value);
    }
}

/// Forwards events to `window.posthog.capture` when the page loaded it.
pub struct PosthogSink;

impl AnalyticsSink for PosthogSink {
    fn capture(&self, event: AnalyticsEvent) {
        let Some(window) = web_sys::window() else { return };
        let posthog = js_sys::Reflect::get(&window, &"posthog".into())
            .ok()
            .filter(|v| v.is_object());
        let Some(posthog) = posthog else {
            log::debug!("posthog missing, dropping {}", event.name);
            return;
        };
        let capture = js_sys::Reflect::get(&posthog, &"capture".into())
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        let Some(capture) = capture else { return };

        let props = serde_json::to_string(&event.properties)
            .ok()
            .and_then(|s| js_sys::JSON::parse(&s).ok())
            .unwrap_or(JsValue::UNDEFINED);
        log::debug!("capture {}", event.name);
        let _ = capture.call2(&posthog, &JsValue::from_str(event.name), &props);
    }
}

/// Reads `<script type="application/json" id="site-config">` if present.
pub fn load_config(document: &Document) -> SiteConfig {
    let text = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content());
    SiteConfig::from_json_or_default(text.as_deref())
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

pub fn viewport_size() -> (f64, f64) {
    let Some(window) = web_sys::window() else { return (0.0, 0.0) };
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

/// `(top, bottom)` of an element in viewport coordinates, if it exists.
pub fn section_rect(document: &Document, id: &str) -> Option<(f64, f64)> {
    let el: Element = document.get_element_by_id(id)?;
    let rect = el.get_bounding_client_rect();
    Some((rect.top(), rect.bottom()))
}

/// An event listener that is removed again on [`Listener::remove`].
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    pub fn passive(
        target: &EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut(web_sys::Event)>,
    ) -> Result<Self, JsValue> {
        let opts = AddEventListenerOptions::new();
        opts.set_passive(true);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &opts,
        )?;
        Ok(Self { target: target.clone(), kind, callback })
    }

    pub fn remove(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }

    /// Keeps the listener for the rest of the page's life.
    pub fn forget(self) {
        self.callback.forget();
    }
}
