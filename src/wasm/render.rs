use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, HtmlCanvasElement, HtmlElement, WebGl2RenderingContext as GL, WebGlBuffer,
    WebGlProgram, WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::dom::{self, Listener};
use crate::analytics::AnalyticsSink;
use crate::config::SiteConfig;
use crate::particles::motion::{pixel_ratio, projection, section_reveal};
use crate::particles::{connect, Connections, FrameUniforms, ParticleCloud, ParticleSim};

const POINT_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 position;
layout(location = 1) in vec3 color;
layout(location = 2) in float size;
layout(location = 3) in vec3 velocity;

uniform mat4 modelMatrix;
uniform mat4 viewMatrix;
uniform mat4 projectionMatrix;
uniform float time;
uniform float pixelRatio;
uniform vec2 mousePos;
uniform float scrollProgress;
uniform float convergenceStrength;
uniform float explosionStrength;

out vec3 vColor;
out float vAlpha;

float noise(vec3 p) {
  return fract(sin(dot(p, vec3(12.9898, 78.233, 45.5432))) * 43758.5453);
}

void main() {
  vColor = color;
  vec3 pos = position;

  pos.x += sin(pos.x * 0.05 + time * 0.5) * 3.0 + velocity.x * time * 10.0;
  pos.y += cos(pos.y * 0.04 + time * 0.4) * 3.0 + velocity.y * time * 10.0;
  pos.z += sin(pos.z * 0.06 + time * 0.3) * 2.0 + velocity.z * time * 10.0;

  // pointer repulsion, faded out while converging or exploding
  vec4 world = modelMatrix * vec4(pos, 1.0);
  vec2 screen = world.xy / world.w;
  vec2 away = screen - mousePos * 50.0;
  float influence = smoothstep(30.0, 0.0, length(away)) * (1.0 - convergenceStrength - explosionStrength);
  pos.xy += normalize(away + vec2(0.0001)) * influence * 5.0;

  vec3 target = vec3(mousePos.x * 50.0, mousePos.y * 30.0, 0.0);
  if (convergenceStrength > 0.0) {
    vec3 toTarget = target - pos;
    float force = convergenceStrength * min(length(toTarget) * 0.8, 30.0);
    pos += normalize(toTarget + vec3(0.0001)) * force * (0.8 + noise(position) * 0.4);
  }
  if (explosionStrength > 0.0) {
    vec3 dir = normalize(pos - target + vec3(0.001));
    pos += dir * explosionStrength * 80.0 * (0.5 + noise(position));
  }

  pos *= sin(time * 0.5 + scrollProgress * 6.28) * 0.1 + 1.0;

  float pulse = sin(time * 2.0 + length(position) * 0.08) * 0.5 + 0.5;
  vAlpha = 1.0 - length(position) / 60.0 * 0.3;

  vec4 mv = viewMatrix * modelMatrix * vec4(pos, 1.0);
  gl_PointSize = size * pixelRatio * (350.0 / -mv.z) * (0.7 + pulse * 0.5);
  gl_Position = projectionMatrix * mv;
}
"#;

const POINT_FS: &str = r#"#version 300 es
precision mediump float;
in vec3 vColor;
in float vAlpha;
out vec4 fragColor;

void main() {
  float dist = length(gl_PointCoord - 0.5);
  float core = 1.0 - smoothstep(0.0, 0.2, dist);
  float glow = 1.0 - smoothstep(0.2, 0.5, dist);
  if (glow < 0.01) discard;

  vec3 c = vColor * (1.0 + core * 1.5);
  c.r += glow * 0.1;
  c.b += core * 0.2;
  fragColor = vec4(c, (core * 0.9 + glow * 0.4) * vAlpha * 0.85);
}
"#;

const LINE_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 position;
layout(location = 1) in vec3 color;
uniform mat4 modelMatrix;
uniform mat4 viewMatrix;
uniform mat4 projectionMatrix;
out vec3 vColor;

void main() {
  vColor = color;
  gl_Position = projectionMatrix * viewMatrix * modelMatrix * vec4(position, 1.0);
}
"#;

const LINE_FS: &str = r#"#version 300 es
precision mediump float;
in vec3 vColor;
uniform float opacity;
out vec4 fragColor;

void main() {
  fragColor = vec4(vColor, opacity);
}
"#;

const LINE_OPACITY: f32 = 0.25;

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl.create_shader(kind).ok_or("unable to create shader")?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(JsValue::from_str(&format!("shader compile failed: {log}")))
    }
}

fn link_program(gl: &GL, vs: &str, fs: &str) -> Result<WebGlProgram, JsValue> {
    let vert = compile_shader(gl, GL::VERTEX_SHADER, vs)?;
    let frag = compile_shader(gl, GL::FRAGMENT_SHADER, fs)?;
    let program = gl.create_program().ok_or("unable to create program")?;
    gl.attach_shader(&program, &vert);
    gl.attach_shader(&program, &frag);
    gl.link_program(&program);
    // shaders are owned by the program from here on
    gl.delete_shader(Some(&vert));
    gl.delete_shader(Some(&frag));

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(JsValue::from_str(&format!("program link failed: {log}")))
    }
}

struct Uniforms {
    model: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
}

impl Uniforms {
    fn locate(gl: &GL, program: &WebGlProgram) -> Self {
        Self {
            model: gl.get_uniform_location(program, "modelMatrix"),
            view: gl.get_uniform_location(program, "viewMatrix"),
            projection: gl.get_uniform_location(program, "projectionMatrix"),
        }
    }
}

/// Every GPU object the field owns. Released in one go by [`GpuBundle::dispose`].
struct GpuBundle {
    points: WebGlProgram,
    lines: WebGlProgram,
    point_vao: WebGlVertexArrayObject,
    line_vao: WebGlVertexArrayObject,
    buffers: Vec<WebGlBuffer>,
    point_count: i32,
    line_vertices: i32,
    point_mats: Uniforms,
    line_mats: Uniforms,
    time: Option<WebGlUniformLocation>,
    pixel_ratio: Option<WebGlUniformLocation>,
    mouse: Option<WebGlUniformLocation>,
    scroll: Option<WebGlUniformLocation>,
    convergence: Option<WebGlUniformLocation>,
    explosion: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
}

impl GpuBundle {
    fn new(gl: &GL, cloud: &ParticleCloud, lines: &Connections) -> Result<Self, JsValue> {
        let points = link_program(gl, POINT_VS, POINT_FS)?;
        let line_program = link_program(gl, LINE_VS, LINE_FS)?;
        let mut buffers = Vec::new();

        let point_vao = gl.create_vertex_array().ok_or("unable to create vao")?;
        gl.bind_vertex_array(Some(&point_vao));
        for (location, data, width) in [
            (0, &cloud.positions, 3),
            (1, &cloud.colors, 3),
            (2, &cloud.sizes, 1),
            (3, &cloud.velocities, 3),
        ] {
            buffers.push(upload(gl, location, data, width)?);
        }

        let line_vao = gl.create_vertex_array().ok_or("unable to create vao")?;
        gl.bind_vertex_array(Some(&line_vao));
        buffers.push(upload(gl, 0, &lines.positions, 3)?);
        buffers.push(upload(gl, 1, &lines.colors, 3)?);
        gl.bind_vertex_array(None);

        Ok(Self {
            point_mats: Uniforms::locate(gl, &points),
            line_mats: Uniforms::locate(gl, &line_program),
            time: gl.get_uniform_location(&points, "time"),
            pixel_ratio: gl.get_uniform_location(&points, "pixelRatio"),
            mouse: gl.get_uniform_location(&points, "mousePos"),
            scroll: gl.get_uniform_location(&points, "scrollProgress"),
            convergence: gl.get_uniform_location(&points, "convergenceStrength"),
            explosion: gl.get_uniform_location(&points, "explosionStrength"),
            opacity: gl.get_uniform_location(&line_program, "opacity"),
            points,
            lines: line_program,
            point_vao,
            line_vao,
            buffers,
            point_count: cloud.len() as i32,
            line_vertices: (lines.positions.len() / 3) as i32,
        })
    }

    fn draw(&self, gl: &GL, u: &FrameUniforms, model: &[f32; 16], view: &[f32; 16], proj: &[f32; 16]) {
        gl.use_program(Some(&self.points));
        gl.uniform_matrix4fv_with_f32_array(self.point_mats.model.as_ref(), false, model);
        gl.uniform_matrix4fv_with_f32_array(self.point_mats.view.as_ref(), false, view);
        gl.uniform_matrix4fv_with_f32_array(self.point_mats.projection.as_ref(), false, proj);
        gl.uniform1f(self.time.as_ref(), u.time);
        gl.uniform1f(self.pixel_ratio.as_ref(), u.pixel_ratio);
        gl.uniform2f(self.mouse.as_ref(), u.pointer.x, u.pointer.y);
        gl.uniform1f(self.scroll.as_ref(), u.scroll);
        gl.uniform1f(self.convergence.as_ref(), u.convergence);
        gl.uniform1f(self.explosion.as_ref(), u.explosion);
        gl.bind_vertex_array(Some(&self.point_vao));
        gl.draw_arrays(GL::POINTS, 0, self.point_count);

        if self.line_vertices > 0 {
            gl.use_program(Some(&self.lines));
            gl.uniform_matrix4fv_with_f32_array(self.line_mats.model.as_ref(), false, model);
            gl.uniform_matrix4fv_with_f32_array(self.line_mats.view.as_ref(), false, view);
            gl.uniform_matrix4fv_with_f32_array(self.line_mats.projection.as_ref(), false, proj);
            gl.uniform1f(self.opacity.as_ref(), LINE_OPACITY);
            gl.bind_vertex_array(Some(&self.line_vao));
            gl.draw_arrays(GL::LINES, 0, self.line_vertices);
        }
        gl.bind_vertex_array(None);
    }

    fn dispose(self, gl: &GL) {
        gl.bind_vertex_array(None);
        for buffer in &self.buffers {
            gl.delete_buffer(Some(buffer));
        }
        gl.delete_vertex_array(Some(&self.point_vao));
        gl.delete_vertex_array(Some(&self.line_vao));
        gl.delete_program(Some(&self.points));
        gl.delete_program(Some(&self.lines));
    }
}

fn upload(gl: &GL, location: u32, data: &[f32], width: i32) -> Result<WebGlBuffer, JsValue> {
    let buffer = gl.create_buffer().ok_or("unable to create buffer")?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    let array = js_sys::Float32Array::from(data);
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, GL::STATIC_DRAW);
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, width, GL::FLOAT, false, 0, 0);
    Ok(buffer)
}

struct FieldState {
    gl: GL,
    canvas: HtmlCanvasElement,
    container: HtmlElement,
    document: Document,
    ai_section_id: String,
    sim: ParticleSim,
    bundle: Option<GpuBundle>,
    sink: Rc<dyn AnalyticsSink>,
    listeners: Vec<Listener>,
    raf: Option<i32>,
    pixel_ratio: f32,
}

impl FieldState {
    fn resize(&mut self) {
        let w = self.container.client_width().max(1) as f32;
        let h = self.container.client_height().max(1) as f32;
        self.canvas.set_width((w * self.pixel_ratio) as u32);
        self.canvas.set_height((h * self.pixel_ratio) as u32);
    }

    fn update_reveal(&mut self) {
        let (_, viewport_h) = dom::viewport_size();
        if let Some((top, _)) = dom::section_rect(&self.document, &self.ai_section_id) {
            self.sim.set_reveal(section_reveal(top, viewport_h));
        }
    }

    fn render(&mut self, now_ms: f64) {
        let u = self.sim.frame(now_ms, self.pixel_ratio, self.sink.as_ref());
        let Some(bundle) = self.bundle.as_ref() else { return };

        let (w, h) = (self.canvas.width() as i32, self.canvas.height() as i32);
        let motion = self.sim.motion();
        let model = motion.model().to_cols_array();
        let view = motion.view().to_cols_array();
        let proj = projection(w as f32 / h.max(1) as f32).to_cols_array();

        let gl = &self.gl;
        gl.viewport(0, 0, w, h);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);
        gl.depth_mask(false);
        bundle.draw(gl, &u, &model, &view, &proj);
    }

    fn teardown(&mut self) {
        if let (Some(id), Some(w)) = (self.raf.take(), window()) {
            let _ = w.cancel_animation_frame(id);
        }
        for listener in self.listeners.drain(..) {
            listener.remove();
        }
        self.sim.teardown();
        if let Some(bundle) = self.bundle.take() {
            bundle.dispose(&self.gl);
        }
        self.canvas.remove();
    }
}

/// The mounted particle field. Call `destroy()` when its view goes away.
#[wasm_bindgen]
pub struct ParticleField {
    state: Rc<RefCell<FieldState>>,
    frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl ParticleField {
    pub fn mount(
        document: &Document,
        container: HtmlElement,
        config: &SiteConfig,
        sink: Rc<dyn AnalyticsSink>,
    ) -> Result<ParticleField, JsValue> {
        let window = window().ok_or("no window")?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        let style = canvas.style();
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("display", "block")?;
        container.append_child(&canvas)?;

        let gl: GL = match canvas.get_context("webgl2") {
            Ok(Some(ctx)) => ctx.dyn_into()?,
            _ => {
                canvas.remove();
                return Err("WebGL2 not supported".into());
            }
        };

        let cfg = &config.particles;
        let (viewport_w, _) = dom::viewport_size();
        let mut rng = StdRng::from_entropy();
        let cloud = ParticleCloud::generate(&mut rng, cfg.particle_count(viewport_w), cfg.clusters);
        let lines = connect(
            &mut rng,
            &cloud,
            cfg.max_connections(viewport_w),
            cfg.connection_distance,
            cfg.keep_probability,
        );
        let bundle = GpuBundle::new(&gl, &cloud, &lines).map_err(|e| {
            canvas.remove();
            e
        })?;
        log::info!("particle field: {} points, {} edges", cloud.len(), lines.edge_count());

        let state = Rc::new(RefCell::new(FieldState {
            gl,
            canvas,
            container,
            document: document.clone(),
            ai_section_id: config.ai_section_id.clone(),
            sim: ParticleSim::new(cfg.clone(), dom::now_ms()),
            bundle: Some(bundle),
            sink,
            listeners: Vec::new(),
            raf: None,
            pixel_ratio: pixel_ratio(window.device_pixel_ratio()),
        }));
        {
            let mut s = state.borrow_mut();
            s.resize();
            s.update_reveal();
        }

        let listeners = vec![
            {
                let state = state.clone();
                Listener::passive(
                    &window,
                    "mousemove",
                    Closure::wrap(Box::new(move |e: web_sys::Event| {
                        let Some(e) = e.dyn_ref::<web_sys::MouseEvent>() else { return };
                        let (w, h) = dom::viewport_size();
                        state.borrow_mut().sim.pointer_moved(
                            e.client_x() as f64,
                            e.client_y() as f64,
                            w,
                            h,
                            dom::now_ms(),
                        );
                    }) as Box<dyn FnMut(web_sys::Event)>),
                )?
            },
            {
                let state = state.clone();
                Listener::passive(
                    &window,
                    "scroll",
                    Closure::wrap(Box::new(move |_: web_sys::Event| {
                        state.borrow_mut().update_reveal();
                    }) as Box<dyn FnMut(web_sys::Event)>),
                )?
            },
            {
                let state = state.clone();
                Listener::passive(
                    &window,
                    "resize",
                    Closure::wrap(Box::new(move |_: web_sys::Event| {
                        state.borrow_mut().resize();
                    }) as Box<dyn FnMut(web_sys::Event)>),
                )?
            },
        ];
        state.borrow_mut().listeners = listeners;

        // `frame` holds the animation-frame closure so it can re-request
        // itself; `destroy` empties the slot to break the cycle.
        let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let slot = frame.clone();
        let loop_state = state.clone();
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let mut s = loop_state.borrow_mut();
            if s.bundle.is_none() {
                return;
            }
            s.render(dom::now_ms());
            if let (Some(w), Some(cb)) = (web_sys::window(), slot.borrow().as_ref()) {
                s.raf = w.request_animation_frame(cb.as_ref().unchecked_ref()).ok();
            }
        }) as Box<dyn FnMut()>));

        let id = window.request_animation_frame(
            frame.borrow().as_ref().ok_or("frame closure missing")?.as_ref().unchecked_ref(),
        )?;
        state.borrow_mut().raf = Some(id);

        Ok(ParticleField { state, frame })
    }
}

#[wasm_bindgen]
impl ParticleField {
    /// Stops the loop, detaches listeners, cancels pending transitions and
    /// frees every GPU object. Safe to call twice.
    pub fn destroy(&mut self) {
        self.state.borrow_mut().teardown();
        self.frame.borrow_mut().take();
        log::info!("particle field destroyed");
    }

    /// Current phase for debugging overlays: `normal`, `converging` or `exploding`.
    pub fn phase(&self) -> String {
        format!("{:?}", self.state.borrow().sim.machine().phase()).to_lowercase()
    }
}
