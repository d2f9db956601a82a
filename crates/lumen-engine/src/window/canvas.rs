use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::coords::{Rect, Vec2};
use crate::host::{
    CanvasElement, CanvasHost, Context2d, Context2dSource, HostElement, ResizeSubscription,
    Transform2d,
};
use crate::paint::Color;
use crate::render::DrawCommand;

/// Element registry of a native window: exactly one canvas, filling the window.
pub struct WindowHost {
    canvas_id: String,
    canvas: WindowCanvas,
}

impl WindowHost {
    pub fn new(canvas_id: impl Into<String>) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            canvas: WindowCanvas::default(),
        }
    }

    #[inline]
    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    #[inline]
    pub fn canvas(&self) -> &WindowCanvas {
        &self.canvas
    }
}

impl CanvasHost for WindowHost {
    type Element = WindowCanvas;

    fn element_by_id(&mut self, id: &str) -> Option<HostElement<WindowCanvas>> {
        (id == self.canvas_id).then(|| HostElement::Canvas(self.canvas.clone()))
    }
}

#[derive(Debug)]
struct CanvasShared {
    client_size: Vec2,
    scale_factor: f32,
    backing_size: (u32, u32),

    next_subscription: u64,
    /// subscription -> notification pending
    subscriptions: BTreeMap<u64, bool>,

    transform: Transform2d,
    /// Retained content, replayed on every redraw.
    display_list: Vec<DrawCommand>,
}

impl Default for CanvasShared {
    fn default() -> Self {
        Self {
            client_size: Vec2::zero(),
            scale_factor: 1.0,
            backing_size: (0, 0),
            next_subscription: 1,
            subscriptions: BTreeMap::new(),
            transform: Transform2d::IDENTITY,
            display_list: Vec::new(),
        }
    }
}

impl CanvasShared {
    fn push(&mut self, cmd: DrawCommand) {
        if let DrawCommand::Clear { rect } = cmd {
            let (w, h) = self.backing_size;
            let r = rect.normalized();
            let covers = r.origin.x <= 0.0
                && r.origin.y <= 0.0
                && r.max().x >= w as f32
                && r.max().y >= h as f32;
            if covers {
                self.display_list.clear();
                return;
            }
        }
        self.display_list.push(cmd);
    }
}

/// The window's drawing area seen as a canvas element.
///
/// Handles are cheap clones over shared state: the runtime keeps one to feed
/// layout changes in and read the display list out, the drawing surface owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct WindowCanvas {
    shared: Rc<RefCell<CanvasShared>>,
}

impl WindowCanvas {
    /// Applies a new window layout and notifies every resize subscriber.
    pub fn set_layout(&self, logical_size: Vec2, scale_factor: f32) {
        let mut s = self.shared.borrow_mut();
        if s.client_size == logical_size && s.scale_factor == scale_factor {
            return;
        }
        s.client_size = logical_size;
        s.scale_factor = scale_factor;
        for pending in s.subscriptions.values_mut() {
            *pending = true;
        }
        log::debug!(
            "window canvas layout {}x{} @ {scale_factor}x",
            logical_size.x,
            logical_size.y
        );
    }

    /// Current retained content, in physical pixels.
    pub fn display_list(&self) -> Vec<DrawCommand> {
        self.shared.borrow().display_list.clone()
    }

    /// Runs `f` over the retained content without copying it.
    pub fn with_display_list<R>(&self, f: impl FnOnce(&[DrawCommand]) -> R) -> R {
        f(&self.shared.borrow().display_list)
    }
}

impl CanvasElement for WindowCanvas {
    fn client_size(&self) -> Vec2 {
        self.shared.borrow().client_size
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.shared.borrow().scale_factor
    }

    fn backing_size(&self) -> (u32, u32) {
        self.shared.borrow().backing_size
    }

    /// Resizing the backing store discards its content, as a browser canvas does.
    fn set_backing_size(&mut self, width: u32, height: u32) {
        let mut s = self.shared.borrow_mut();
        if s.backing_size != (width, height) {
            s.backing_size = (width, height);
            s.display_list.clear();
        }
    }

    fn subscribe_resize(&mut self) -> ResizeSubscription {
        let mut s = self.shared.borrow_mut();
        let id = s.next_subscription;
        s.next_subscription += 1;
        s.subscriptions.insert(id, false);
        ResizeSubscription(id)
    }

    fn unsubscribe_resize(&mut self, subscription: ResizeSubscription) {
        self.shared.borrow_mut().subscriptions.remove(&subscription.0);
    }

    fn take_resize(&mut self, subscription: ResizeSubscription) -> bool {
        self.shared
            .borrow_mut()
            .subscriptions
            .get_mut(&subscription.0)
            .map(std::mem::take)
            .unwrap_or(false)
    }
}

impl Context2dSource for WindowCanvas {
    type Context = WindowContext2d;

    fn context_2d(&mut self) -> Option<WindowContext2d> {
        Some(WindowContext2d {
            shared: Rc::clone(&self.shared),
        })
    }
}

/// 2D context that records transformed commands into the window display list.
pub struct WindowContext2d {
    shared: Rc<RefCell<CanvasShared>>,
}

impl Context2d for WindowContext2d {
    fn set_transform(&mut self, transform: Transform2d) {
        self.shared.borrow_mut().transform = transform;
    }

    fn transform(&self) -> Transform2d {
        self.shared.borrow().transform
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        let mut s = self.shared.borrow_mut();
        let t = s.transform;
        s.push(DrawCommand::Line {
            from: t.apply(from),
            to: t.apply(to),
            color,
            width: width * t.scale_x.abs().max(t.scale_y.abs()),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let mut s = self.shared.borrow_mut();
        let rect = s.transform.apply_rect(rect);
        s.push(DrawCommand::Fill { rect, color });
    }

    fn clear_rect(&mut self, rect: Rect) {
        let mut s = self.shared.borrow_mut();
        let rect = s.transform.apply_rect(rect);
        s.push(DrawCommand::Clear { rect });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawingSurface;

    fn host(width: f32, height: f32, scale: f32) -> WindowHost {
        let host = WindowHost::new("main");
        host.canvas().set_layout(Vec2::new(width, height), scale);
        host
    }

    #[test]
    fn only_the_configured_id_resolves() {
        let mut host = WindowHost::new("main");
        assert!(matches!(host.element_by_id("main"), Some(HostElement::Canvas(_))));
        assert!(host.element_by_id("other").is_none());
    }

    #[test]
    fn surface_draws_in_physical_pixels() {
        let mut host = host(100.0, 50.0, 2.0);
        let mut surface = DrawingSurface::new(&mut host, "main").unwrap();
        assert_eq!(host.canvas().backing_size(), (200, 100));

        surface.draw_rectangle(1.0, 2.0, 3.0, 3.0, Color::white());
        surface.draw_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Color::white());

        assert_eq!(
            host.canvas().display_list(),
            vec![
                DrawCommand::Fill { rect: Rect::new(2.0, 4.0, 6.0, 6.0), color: Color::white() },
                DrawCommand::Line {
                    from: Vec2::new(0.0, 0.0),
                    to: Vec2::new(20.0, 0.0),
                    color: Color::white(),
                    width: 2.0,
                },
            ]
        );
    }

    #[test]
    fn full_clear_resets_the_display_list() {
        let mut host = host(40.0, 40.0, 1.5);
        let mut surface = DrawingSurface::new(&mut host, "main").unwrap();

        surface.draw_rectangle(0.0, 0.0, 5.0, 5.0, Color::white());
        surface.clear();
        assert!(host.canvas().display_list().is_empty());

        surface.draw_rectangle(0.0, 0.0, 5.0, 5.0, Color::white());
        assert_eq!(host.canvas().with_display_list(|l| l.len()), 1);
    }

    #[test]
    fn layout_change_reaches_subscribers_once() {
        let mut host = host(40.0, 40.0, 1.0);
        let mut surface = DrawingSurface::new(&mut host, "main").unwrap();
        surface.draw_rectangle(0.0, 0.0, 5.0, 5.0, Color::white());

        host.canvas().set_layout(Vec2::new(80.0, 40.0), 1.0);
        assert!(surface.sync());
        assert!(!surface.sync());
        assert_eq!(host.canvas().backing_size(), (80, 40));
        // new backing store, old content gone
        assert!(host.canvas().display_list().is_empty());
    }

    #[test]
    fn unchanged_layout_is_not_a_resize() {
        let mut host = host(40.0, 40.0, 1.0);
        let mut surface = DrawingSurface::new(&mut host, "main").unwrap();
        host.canvas().set_layout(Vec2::new(40.0, 40.0), 1.0);
        assert!(!surface.sync());
    }
}
