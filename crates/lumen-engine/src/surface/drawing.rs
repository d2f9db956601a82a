use crate::coords::{Rect, Vec2, Viewport};
use crate::host::{CanvasHost, Context2d, Context2dSource, ResizeSubscription, Transform2d};
use crate::paint::Color;

use super::{lookup_canvas, SurfaceInitError};

/// Stroke width of [`DrawingSurface::draw_line`], in logical pixels.
pub const LINE_WIDTH: f32 = 1.0;

/// Logical size and pixel ratio of a drawing surface after the last resize.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SurfaceState {
    pub logical_width: f32,
    pub logical_height: f32,
    pub device_pixel_ratio: f32,
}

impl SurfaceState {
    /// Backing-store size in physical pixels: `floor(logical × dpr)`.
    pub fn backing_size(self) -> (u32, u32) {
        (
            physical(self.logical_width, self.device_pixel_ratio),
            physical(self.logical_height, self.device_pixel_ratio),
        )
    }

    #[inline]
    pub fn viewport(self) -> Viewport {
        Viewport::new(self.logical_width, self.logical_height)
    }
}

#[inline]
fn physical(logical: f32, dpr: f32) -> u32 {
    (logical * dpr).floor().max(0.0) as u32
}

/// A 2D context bound to a host canvas.
///
/// Construction subscribes to host resize notifications once; [`destroy`]
/// (or dropping the surface) unsubscribes.
///
/// [`destroy`]: DrawingSurface::destroy
pub struct DrawingSurface<E: Context2dSource> {
    id: String,
    element: E,
    context: E::Context,
    subscription: Option<ResizeSubscription>,
    state: SurfaceState,
}

impl<E: Context2dSource> DrawingSurface<E> {
    /// Looks up `surface_id` on the host and binds a 2D context to it.
    pub fn new<H>(host: &mut H, surface_id: &str) -> Result<Self, SurfaceInitError>
    where
        H: CanvasHost<Element = E>,
    {
        let element = lookup_canvas(host, surface_id)?;
        Self::from_element(surface_id, element)
    }

    /// Binds a 2D context to an already resolved element.
    pub fn from_element(
        surface_id: impl Into<String>,
        mut element: E,
    ) -> Result<Self, SurfaceInitError> {
        let id = surface_id.into();

        let Some(context) = element.context_2d() else {
            let err = SurfaceInitError::ContextUnavailable { id };
            log::error!("{err}");
            return Err(err);
        };

        let subscription = element.subscribe_resize();

        let mut surface = Self {
            id,
            element,
            context,
            subscription: Some(subscription),
            state: SurfaceState::default(),
        };
        surface.resize();

        log::debug!(
            "drawing surface `{}` bound ({}x{} @ {}x)",
            surface.id,
            surface.state.logical_width,
            surface.state.logical_height,
            surface.state.device_pixel_ratio
        );

        Ok(surface)
    }

    /// Re-reads layout size and pixel ratio, resizes the backing store and
    /// replaces the context transform with the pixel-ratio scale.
    ///
    /// Idempotent when neither the layout box nor the ratio changed.
    pub fn resize(&mut self) -> SurfaceState {
        let dpr = match self.element.device_pixel_ratio() {
            r if r.is_finite() && r > 0.0 => r,
            _ => 1.0,
        };
        let client = self.element.client_size();

        let state = SurfaceState {
            logical_width: client.x,
            logical_height: client.y,
            device_pixel_ratio: dpr,
        };

        let backing = state.backing_size();
        if self.element.backing_size() != backing {
            self.element.set_backing_size(backing.0, backing.1);
        }

        // Replace, never compose: repeated resizes must not stack scales.
        self.context.set_transform(Transform2d::scale(dpr));

        if state != self.state {
            log::debug!(
                "surface `{}` resized to {}x{} (backing {}x{})",
                self.id,
                state.logical_width,
                state.logical_height,
                backing.0,
                backing.1
            );
        }

        self.state = state;
        state
    }

    /// Applies a pending host resize notification, if any.
    ///
    /// Returns `true` when a resize was performed.
    pub fn sync(&mut self) -> bool {
        let Some(subscription) = self.subscription else {
            return false;
        };
        if self.element.take_resize(subscription) {
            self.resize();
            true
        } else {
            false
        }
    }

    pub fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color) {
        self.context.stroke_line(start, end, color, LINE_WIDTH);
    }

    pub fn draw_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.context.fill_rect(Rect::new(x, y, width, height), color);
    }

    /// Clears the whole logical area.
    pub fn clear(&mut self) {
        let Viewport { width, height } = self.state.viewport();
        self.context.clear_rect(Rect::new(0.0, 0.0, width, height));
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.state.logical_width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.state.logical_height
    }

    #[inline]
    pub fn element(&self) -> &E {
        &self.element
    }

    #[inline]
    pub fn context(&self) -> &E::Context {
        &self.context
    }

    #[inline]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Releases the host resize subscription. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.element.unsubscribe_resize(subscription);
            log::debug!("surface `{}` released", self.id);
        }
    }
}

impl<E: Context2dSource> Drop for DrawingSurface<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::recording::{DrawOp, RecordingCanvas, RecordingHost};
    use crate::host::CanvasElement;

    fn host_with(canvas: &RecordingCanvas) -> RecordingHost {
        RecordingHost::new().with_canvas("graph", canvas.clone())
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn missing_element_is_reported() {
        let mut host = RecordingHost::new();
        let err = DrawingSurface::new(&mut host, "nope").err().unwrap();
        assert_eq!(err, SurfaceInitError::MissingElement { id: "nope".into() });
    }

    #[test]
    fn non_canvas_element_is_reported() {
        let mut host = RecordingHost::new().with_element("header", "div");
        let err = DrawingSurface::new(&mut host, "header").err().unwrap();
        assert_eq!(
            err,
            SurfaceInitError::NotACanvas { id: "header".into(), tag: "div".into() }
        );
    }

    #[test]
    fn missing_context_is_reported() {
        let canvas = RecordingCanvas::new(100.0, 50.0, 1.0).without_context_2d();
        let mut host = host_with(&canvas);
        let err = DrawingSurface::new(&mut host, "graph").err().unwrap();
        assert_eq!(err, SurfaceInitError::ContextUnavailable { id: "graph".into() });
        assert_eq!(canvas.active_subscriptions(), 0);
    }

    #[test]
    fn construction_sizes_backing_store_and_subscribes() {
        let canvas = RecordingCanvas::new(300.5, 150.0, 2.0);
        let mut host = host_with(&canvas);
        let surface = DrawingSurface::new(&mut host, "graph").unwrap();

        assert_eq!(canvas.backing_size(), (601, 300));
        assert_eq!(canvas.transform(), Transform2d::scale(2.0));
        assert_eq!(canvas.active_subscriptions(), 1);
        assert_eq!(surface.width(), 300.5);
        assert_eq!(surface.height(), 150.0);
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn backing_store_is_floored() {
        let canvas = RecordingCanvas::new(100.3, 33.3, 1.5);
        let mut host = host_with(&canvas);
        let _surface = DrawingSurface::new(&mut host, "graph").unwrap();
        // 150.45 -> 150, 49.95 -> 49
        assert_eq!(canvas.backing_size(), (150, 49));
    }

    #[test]
    fn resize_is_idempotent() {
        let canvas = RecordingCanvas::new(200.0, 100.0, 3.0);
        let mut host = host_with(&canvas);
        let mut surface = DrawingSurface::new(&mut host, "graph").unwrap();

        let first = surface.resize();
        let backing = canvas.backing_size();
        let transform = canvas.transform();

        let second = surface.resize();
        assert_eq!(first, second);
        assert_eq!(canvas.backing_size(), backing);
        assert_eq!(canvas.transform(), transform);
        assert_eq!(canvas.transform(), Transform2d::scale(3.0));
    }

    #[test]
    fn resize_replaces_scale_instead_of_stacking() {
        let canvas = RecordingCanvas::new(200.0, 100.0, 2.0);
        let mut host = host_with(&canvas);
        let mut surface = DrawingSurface::new(&mut host, "graph").unwrap();

        for _ in 0..5 {
            surface.resize();
        }
        canvas.set_device_pixel_ratio(1.25);
        surface.resize();

        assert_eq!(canvas.transform(), Transform2d::scale(1.25));
        assert_eq!(canvas.backing_size(), (250, 125));
    }

    #[test]
    fn invalid_pixel_ratio_falls_back_to_one() {
        let canvas = RecordingCanvas::new(64.0, 64.0, 0.0);
        let mut host = host_with(&canvas);
        let surface = DrawingSurface::new(&mut host, "graph").unwrap();
        assert_eq!(surface.state().device_pixel_ratio, 1.0);
        assert_eq!(canvas.backing_size(), (64, 64));
    }

    #[test]
    fn sync_applies_pending_notification_once() {
        let canvas = RecordingCanvas::new(100.0, 100.0, 1.0);
        let mut host = host_with(&canvas);
        let mut surface = DrawingSurface::new(&mut host, "graph").unwrap();

        assert!(!surface.sync());

        canvas.set_client_size(40.0, 30.0);
        canvas.notify_resize();
        assert!(surface.sync());
        assert_eq!(surface.state().viewport(), Viewport::new(40.0, 30.0));
        assert!(!surface.sync());
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn draw_calls_reach_the_context_in_logical_units() {
        let canvas = RecordingCanvas::new(100.0, 80.0, 2.0);
        let mut host = host_with(&canvas);
        let mut surface = DrawingSurface::new(&mut host, "graph").unwrap();

        surface.clear();
        surface.draw_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Color::white());
        surface.draw_rectangle(1.0, 2.0, 3.0, 3.0, Color::black());

        assert_eq!(
            canvas.ops(),
            vec![
                DrawOp::ClearRect { rect: Rect::new(0.0, 0.0, 100.0, 80.0) },
                DrawOp::Line {
                    from: Vec2::new(0.0, 0.0),
                    to: Vec2::new(10.0, 0.0),
                    color: Color::white(),
                    width: LINE_WIDTH,
                },
                DrawOp::FillRect { rect: Rect::new(1.0, 2.0, 3.0, 3.0), color: Color::black() },
            ]
        );
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn destroy_unsubscribes_once() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let mut host = host_with(&canvas);
        let mut surface = DrawingSurface::new(&mut host, "graph").unwrap();

        surface.destroy();
        surface.destroy();
        assert_eq!(canvas.active_subscriptions(), 0);
        assert!(!surface.is_subscribed());

        canvas.notify_resize();
        assert!(!surface.sync());
    }

    #[test]
    fn drop_unsubscribes() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let mut host = host_with(&canvas);
        drop(DrawingSurface::new(&mut host, "graph").unwrap());
        assert_eq!(canvas.active_subscriptions(), 0);
    }
}
