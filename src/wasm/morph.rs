use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, Document};

use super::dom::{self, DocumentSurface, Listener};
use crate::analytics::AnalyticsSink;
use crate::morph::{scroll_progress, FrameCoalescer, InitOnce, MorphDriver};

struct MorphLoop {
    document: Document,
    driver: MorphDriver,
    surface: DocumentSurface,
    sink: Rc<dyn AnalyticsSink>,
    coalescer: FrameCoalescer,
}

impl MorphLoop {
    fn progress(&self) -> f64 {
        let Some(window) = window() else { return 0.0 };
        let scroll_y = window.scroll_y().unwrap_or(0.0);
        let doc_height = self
            .document
            .document_element()
            .map(|el| el.scroll_height() as f64)
            .unwrap_or(0.0);
        let (_, viewport_h) = dom::viewport_size();
        scroll_progress(scroll_y, doc_height, viewport_h)
    }

    fn update(&mut self) {
        let progress = self.progress();
        self.driver
            .recompute(progress, dom::now_ms(), &mut self.surface, self.sink.as_ref());
    }
}

/// Attaches scroll/resize handling and applies the initial theme. A second
/// call with the same token does nothing.
pub fn start(token: &InitOnce, sink: Rc<dyn AnalyticsSink>) -> Result<(), JsValue> {
    let Some(driver) = MorphDriver::start(token) else {
        return Ok(());
    };

    let window = window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let surface = DocumentSurface::new(&document)?;

    let state = Rc::new(RefCell::new(MorphLoop {
        document,
        driver,
        surface,
        sink,
        coalescer: FrameCoalescer::new(),
    }));
    state.borrow_mut().update();

    // One recompute per animation frame, however many events arrived.
    let frame: Closure<dyn FnMut()> = {
        let state = state.clone();
        Closure::wrap(Box::new(move || {
            let mut s = state.borrow_mut();
            s.coalescer.finish();
            s.update();
        }) as Box<dyn FnMut()>)
    };
    let frame = Rc::new(frame);

    for kind in ["scroll", "resize"] {
        let state = state.clone();
        let frame = frame.clone();
        let on_event = Closure::wrap(Box::new(move |_: web_sys::Event| {
            if !state.borrow_mut().coalescer.request() {
                return;
            }
            if let Some(w) = web_sys::window() {
                if w.request_animation_frame((*frame).as_ref().unchecked_ref()).is_err() {
                    state.borrow_mut().coalescer.finish();
                }
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        // the morph lives as long as the page
        Listener::passive(&window, kind, on_event)?.forget();
    }

    log::info!("era morph started at {:.3}", state.borrow().driver.progress());
    Ok(())
}
