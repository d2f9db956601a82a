//! JavaScript-facing page handles.

use std::cell::RefCell;
use std::rc::Rc;

use lumen_engine::coords::Vec2;
use lumen_engine::engine::{Engine, EngineConfig, PointSet, Scene};
use lumen_engine::gpu::{FlatShapeProgram, GpuContext, GpuError};
use lumen_engine::host::CanvasElement;
use lumen_engine::paint::Color;
use lumen_engine::shapes::{Rectangle, Triangle};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::host::{AnimationFrames, WebCanvas, WebHost};

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn parse_scene(name: &str) -> Result<Scene, JsError> {
    match name {
        "grid" => Ok(Scene::GridOnly),
        "corners" => Ok(Scene::PointCloud(PointSet::CubeCorners)),
        "dense" => Ok(Scene::PointCloud(PointSet::dense())),
        other => Err(JsError::new(&format!(
            "unknown scene `{other}` (expected grid, corners or dense)"
        ))),
    }
}

type PageEngine = Engine<WebCanvas, AnimationFrames>;

/// Rotating point cloud over a grid, drawn with the canvas 2D context.
#[wasm_bindgen]
pub struct ProjectionPage {
    engine: Rc<RefCell<PageEngine>>,
    frames: AnimationFrames,
}

#[wasm_bindgen]
impl ProjectionPage {
    /// Binds to the canvas `canvas_id`. `scene` is `grid`, `corners` or
    /// `dense`. Nothing is drawn until [`start`](Self::start).
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, scene: &str) -> Result<ProjectionPage, JsError> {
        let scene = parse_scene(scene)?;
        let mut host = WebHost::new()?;
        let frames = AnimationFrames::new(host.window().clone());

        let engine = Engine::new(
            &mut host,
            canvas_id,
            frames.clone(),
            scene,
            EngineConfig::default(),
        )
        .map_err(js_error)?;
        let engine = Rc::new(RefCell::new(engine));

        let weak = Rc::downgrade(&engine);
        frames.set_callback(Closure::new(move |timestamp_ms: f64| {
            if let Some(engine) = weak.upgrade() {
                engine.borrow_mut().on_frame(timestamp_ms / 1000.0);
            }
        }));

        Ok(Self { engine, frames })
    }

    /// Builds the point cloud and starts the frame loop.
    pub fn start(&self) {
        self.engine.borrow_mut().init();
    }

    /// Restarts a stopped loop, keeping the current rotation.
    pub fn resume(&self) {
        self.engine.borrow_mut().start_loop();
    }

    pub fn stop(&self) {
        self.engine.borrow_mut().stop_loop();
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.engine.borrow().is_running()
    }

    /// Stops the loop and releases the resize listener.
    pub fn destroy(&self) {
        self.engine.borrow_mut().destroy();
        self.frames.clear_callback();
    }
}

struct ShapesScene {
    ctx: GpuContext<WebCanvas>,
    program: Option<FlatShapeProgram<WebCanvas>>,
    positions: Vec<f32>,
    color: Color,
}

impl ShapesScene {
    /// Matches the backing store to the layout box, clears and redraws.
    fn render(&mut self) -> Result<usize, GpuError> {
        let ratio = self.ctx.element().device_pixel_ratio();
        self.ctx.resize(ratio);
        self.ctx.clear_canvas();

        match self.program.as_mut() {
            Some(program) => program.draw(&self.ctx, &self.positions, self.color),
            None => Ok(0),
        }
    }
}

impl Drop for ShapesScene {
    fn drop(&mut self) {
        if let Some(program) = self.program.take() {
            program.destroy(&self.ctx);
        }
    }
}

/// Flat-colored rectangles and triangles drawn with WebGL2.
///
/// Shapes are given in CSS pixels from the top-left corner; the scene is
/// redrawn on every window resize.
#[wasm_bindgen]
pub struct ShapesPage {
    scene: Rc<RefCell<ShapesScene>>,
    window: Window,
    on_resize: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl ShapesPage {
    /// Binds to the canvas `canvas_id` and compiles the shape program.
    /// `color` is `#rrggbb[aa]`; the default is the tutorial's red-purple.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, color: Option<String>) -> Result<ShapesPage, JsError> {
        let color = match color.as_deref() {
            Some(hex) => Color::from_hex(hex)
                .ok_or_else(|| JsError::new(&format!("invalid color `{hex}`")))?,
            None => Color::new(1.0, 0.0, 0.5, 1.0),
        };

        let mut host = WebHost::new()?;
        let window = host.window().clone();
        let ctx = GpuContext::from_host(&mut host, canvas_id, None).map_err(js_error)?;
        let program = FlatShapeProgram::new(&ctx).map_err(js_error)?;

        let scene = Rc::new(RefCell::new(ShapesScene {
            ctx,
            program: Some(program),
            positions: Vec::new(),
            color,
        }));

        let weak = Rc::downgrade(&scene);
        let on_resize = Closure::<dyn FnMut()>::new(move || {
            let Some(scene) = weak.upgrade() else {
                return;
            };
            if let Err(e) = scene.borrow_mut().render() {
                log::error!("redraw after resize failed: {e}");
            }
        });
        window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            .map_err(|e| JsError::new(&format!("failed to add resize listener: {e:?}")))?;

        Ok(Self {
            scene,
            window,
            on_resize: Some(on_resize),
        })
    }

    #[wasm_bindgen(js_name = addRectangle)]
    pub fn add_rectangle(&self, x: f32, y: f32, width: f32, height: f32) {
        let rect = Rectangle::new(x, y, width, height);
        self.scene.borrow_mut().positions.extend_from_slice(&rect.to_array());
    }

    #[wasm_bindgen(js_name = addTriangle)]
    pub fn add_triangle(&self, ax: f32, ay: f32, bx: f32, by: f32, cx: f32, cy: f32) {
        let tri = Triangle::new(Vec2::new(ax, ay), Vec2::new(bx, by), Vec2::new(cx, cy));
        self.scene.borrow_mut().positions.extend_from_slice(&tri.to_array());
    }

    #[wasm_bindgen(js_name = clearShapes)]
    pub fn clear_shapes(&self) {
        self.scene.borrow_mut().positions.clear();
    }

    /// Draws every shape added so far. Returns the vertex count.
    pub fn render(&self) -> Result<u32, JsError> {
        let drawn = self.scene.borrow_mut().render().map_err(js_error)?;
        Ok(u32::try_from(drawn).unwrap_or(u32::MAX))
    }

    /// Removes the resize listener and deletes the GL program.
    pub fn destroy(&mut self) {
        if let Some(on_resize) = self.on_resize.take() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            {
                log::error!("failed to remove resize listener: {e:?}");
            }
        }

        let mut scene = self.scene.borrow_mut();
        if let Some(program) = scene.program.take() {
            program.destroy(&scene.ctx);
        }
    }
}

impl Drop for ShapesPage {
    fn drop(&mut self) {
        self.destroy();
    }
}
