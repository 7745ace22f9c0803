#![cfg(target_arch = "wasm32")]

use era_morph::theme::ERA_ATTRIBUTE;
use era_morph::Site;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

#[wasm_bindgen_test]
fn morph_start_tags_root_once() {
    let site = Site::boot().unwrap();
    site.start_morph().unwrap();

    let root = document().document_element().unwrap();
    assert_eq!(root.get_attribute(ERA_ATTRIBUTE).as_deref(), Some("hero"));

    let style = root.dyn_into::<web_sys::HtmlElement>().unwrap().style();
    assert_eq!(style.get_property_value("--era-bg").unwrap(), "#0a0a0a");

    // second start is ignored
    site.start_morph().unwrap();
}

#[wasm_bindgen_test]
fn particle_field_cleans_up_its_canvas() {
    let doc = document();
    let container = doc.create_element("div").unwrap();
    container.set_id("particle-field");
    doc.body().unwrap().append_child(&container).unwrap();

    let site = Site::boot().unwrap();
    // headless runners without WebGL2 get no field and no leftover canvas
    if let Some(mut field) = site.mount_particles() {
        assert_eq!(container.child_element_count(), 1);
        assert_eq!(field.phase(), "normal");
        field.destroy();
        field.destroy();
    }
    assert_eq!(container.child_element_count(), 0);
    container.remove();
}

#[wasm_bindgen_test]
fn missing_particle_container_is_not_an_error() {
    assert!(document().get_element_by_id("particle-field").is_none());
    let site = Site::boot().unwrap();
    assert!(site.mount_particles().is_none());
}

#[wasm_bindgen_test]
fn renders_canned_file() {
    let html = Site::render_file("applique/package.json");
    assert!(html.contains("<span class=\"property\">&quot;name&quot;</span>"));
}
