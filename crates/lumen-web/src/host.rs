//! DOM implementations of the engine host contracts.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use lumen_engine::coords::{Rect, Vec2};
use lumen_engine::gpu::GlowBackend;
use lumen_engine::host::{
    CanvasElement, CanvasHost, Context2d, Context2dSource, FrameRequest, FrameScheduler,
    GlSource, HostElement, ResizeSubscription, Transform2d,
};
use lumen_engine::paint::Color;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, WebGl2RenderingContext, Window,
};

const RESIZE_EVENT: &str = "resize";

/// The page document.
pub struct WebHost {
    window: Window,
    document: Document,
}

impl WebHost {
    pub fn new() -> Result<Self, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("no global `window`"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("`window` has no document"))?;
        Ok(Self { window, document })
    }

    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl CanvasHost for WebHost {
    type Element = WebCanvas;

    fn element_by_id(&mut self, id: &str) -> Option<HostElement<WebCanvas>> {
        let element = self.document.get_element_by_id(id)?;
        Some(match element.dyn_into::<HtmlCanvasElement>() {
            Ok(canvas) => HostElement::Canvas(WebCanvas::new(canvas, self.window.clone())),
            Err(other) => HostElement::Other { tag: other.tag_name().to_lowercase() },
        })
    }
}

struct ResizeListener {
    pending: Rc<Cell<bool>>,
    closure: Closure<dyn FnMut()>,
}

#[derive(Default)]
struct Listeners {
    next: u64,
    active: BTreeMap<u64, ResizeListener>,
}

/// An `HTMLCanvasElement` plus the window it lives in.
///
/// Resize subscriptions are window `resize` listeners that raise a flag; the
/// flag is consumed by [`CanvasElement::take_resize`].
#[derive(Clone)]
pub struct WebCanvas {
    canvas: HtmlCanvasElement,
    window: Window,
    listeners: Rc<RefCell<Listeners>>,
}

impl WebCanvas {
    pub fn new(canvas: HtmlCanvasElement, window: Window) -> Self {
        Self {
            canvas,
            window,
            listeners: Rc::default(),
        }
    }

    #[inline]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl CanvasElement for WebCanvas {
    /// `clientWidth` / `clientHeight`: the padding box, without borders or
    /// CSS transforms.
    fn client_size(&self) -> Vec2 {
        Vec2::new(
            self.canvas.client_width() as f32,
            self.canvas.client_height() as f32,
        )
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.window.device_pixel_ratio() as f32
    }

    fn backing_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn subscribe_resize(&mut self) -> ResizeSubscription {
        let pending = Rc::new(Cell::new(false));
        let flag = Rc::clone(&pending);
        let closure = Closure::<dyn FnMut()>::new(move || flag.set(true));

        if let Err(e) = self
            .window
            .add_event_listener_with_callback(RESIZE_EVENT, closure.as_ref().unchecked_ref())
        {
            log::error!("failed to add resize listener: {e:?}");
        }

        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next;
        listeners.next += 1;
        listeners.active.insert(id, ResizeListener { pending, closure });
        ResizeSubscription(id)
    }

    fn unsubscribe_resize(&mut self, subscription: ResizeSubscription) {
        let Some(listener) = self.listeners.borrow_mut().active.remove(&subscription.0) else {
            return;
        };
        if let Err(e) = self.window.remove_event_listener_with_callback(
            RESIZE_EVENT,
            listener.closure.as_ref().unchecked_ref(),
        ) {
            log::error!("failed to remove resize listener: {e:?}");
        }
    }

    fn take_resize(&mut self, subscription: ResizeSubscription) -> bool {
        self.listeners
            .borrow()
            .active
            .get(&subscription.0)
            .is_some_and(|l| l.pending.replace(false))
    }
}

impl Context2dSource for WebCanvas {
    type Context = WebContext2d;

    fn context_2d(&mut self) -> Option<WebContext2d> {
        let context = match self.canvas.get_context("2d") {
            Ok(context) => context?,
            Err(e) => {
                log::error!("getContext(\"2d\") threw: {e:?}");
                return None;
            }
        };
        let ctx = context.dyn_into::<CanvasRenderingContext2d>().ok()?;
        Some(WebContext2d { ctx, transform: Transform2d::IDENTITY })
    }
}

impl GlSource for WebCanvas {
    type Gl = GlowBackend;

    fn context_gl(&mut self) -> Option<GlowBackend> {
        let context = match self.canvas.get_context("webgl2") {
            Ok(context) => context?,
            Err(e) => {
                log::error!("getContext(\"webgl2\") threw: {e:?}");
                return None;
            }
        };
        let gl = context.dyn_into::<WebGl2RenderingContext>().ok()?;
        Some(GlowBackend::new(glow::Context::from_webgl2_context(gl)))
    }
}

/// `CanvasRenderingContext2d` behind the engine's 2D context contract.
pub struct WebContext2d {
    ctx: CanvasRenderingContext2d,
    transform: Transform2d,
}

impl Context2d for WebContext2d {
    fn set_transform(&mut self, t: Transform2d) {
        if let Err(e) = self.ctx.set_transform(
            t.scale_x as f64,
            0.0,
            0.0,
            t.scale_y as f64,
            t.translate_x as f64,
            t.translate_y as f64,
        ) {
            log::error!("setTransform failed: {e:?}");
            return;
        }
        self.transform = t;
    }

    fn transform(&self) -> Transform2d {
        self.transform
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(
            rect.origin.x as f64,
            rect.origin.y as f64,
            rect.size.x as f64,
            rect.size.y as f64,
        );
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ctx.clear_rect(
            rect.origin.x as f64,
            rect.origin.y as f64,
            rect.size.x as f64,
            rect.size.y as f64,
        );
    }
}

/// Frame callback invoked with the `requestAnimationFrame` timestamp (ms).
pub type FrameCallback = Closure<dyn FnMut(f64)>;

/// `requestAnimationFrame` scheduler.
///
/// Every request runs the same installed callback. Clones share the slot, so
/// the callback can be installed after the scheduler was handed to its owner.
#[derive(Clone)]
pub struct AnimationFrames {
    window: Window,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl AnimationFrames {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: Rc::default(),
        }
    }

    pub fn set_callback(&self, callback: FrameCallback) {
        *self.callback.borrow_mut() = Some(callback);
    }

    /// Drops the installed callback. Pending requests must be cancelled first.
    pub fn clear_callback(&self) {
        self.callback.borrow_mut().take();
    }
}

impl FrameScheduler for AnimationFrames {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let slot = self.callback.borrow();
        let Some(callback) = slot.as_ref() else {
            log::warn!("animation frame requested before a callback was installed");
            return None;
        };

        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(handle) => Some(FrameRequest(handle as u64)),
            Err(e) => {
                log::error!("requestAnimationFrame failed: {e:?}");
                None
            }
        }
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if let Err(e) = self.window.cancel_animation_frame(request.0 as i32) {
            log::error!("cancelAnimationFrame failed: {e:?}");
        }
    }
}
