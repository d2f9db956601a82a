use crate::coords::{Rect, Vec2};
use crate::gpu::GlBackend;
use crate::paint::Color;

/// Result of looking up an element by identifier.
#[derive(Debug)]
pub enum HostElement<E> {
    Canvas(E),
    /// The element exists but cannot host a drawing context.
    Other { tag: String },
}

/// Source of drawable elements (the page document, a window registry, ...).
pub trait CanvasHost {
    type Element: CanvasElement;

    /// Looks up an element by identifier. `None` means no such element.
    fn element_by_id(&mut self, id: &str) -> Option<HostElement<Self::Element>>;
}

/// Token identifying one resize subscription on an element.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ResizeSubscription(pub u64);

/// A canvas-capable element.
///
/// The element has a layout box (logical units) and a backing store (physical
/// pixels). The two are kept in sync by the drawing surface / GPU context.
pub trait CanvasElement {
    /// Current layout box in logical units.
    fn client_size(&self) -> Vec2;

    /// Ratio between physical and logical pixels for the element's display.
    fn device_pixel_ratio(&self) -> f32;

    fn backing_size(&self) -> (u32, u32);

    fn set_backing_size(&mut self, width: u32, height: u32);

    fn subscribe_resize(&mut self) -> ResizeSubscription;

    /// Removing an unknown subscription is a no-op.
    fn unsubscribe_resize(&mut self, subscription: ResizeSubscription);

    /// Returns `true` once per resize notification delivered since the last call.
    fn take_resize(&mut self, subscription: ResizeSubscription) -> bool;
}

/// An element that can hand out a 2D drawing context.
pub trait Context2dSource: CanvasElement {
    type Context: Context2d;

    fn context_2d(&mut self) -> Option<Self::Context>;
}

/// An element that can hand out a GL (WebGL2) context.
pub trait GlSource: CanvasElement {
    type Gl: GlBackend;

    fn context_gl(&mut self) -> Option<Self::Gl>;
}

/// Scale + translation transform applied by a 2D context to incoming
/// coordinates (`device = logical * scale + translate`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2d {
    pub scale_x: f32,
    pub scale_y: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Transform2d {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    #[inline]
    pub const fn scale(factor: f32) -> Self {
        Self {
            scale_x: factor,
            scale_y: factor,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    #[inline]
    pub fn apply(self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.scale_x + self.translate_x,
            p.y * self.scale_y + self.translate_y,
        )
    }

    #[inline]
    pub fn apply_rect(self, r: Rect) -> Rect {
        let origin = self.apply(r.origin);
        Rect::from_origin_size(
            origin,
            Vec2::new(r.size.x * self.scale_x, r.size.y * self.scale_y),
        )
    }
}

impl Default for Transform2d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 2D drawing context bound to a canvas element.
///
/// Coordinates passed to the drawing calls are transformed by the current
/// [`Transform2d`] before reaching the backing store.
pub trait Context2d {
    /// Replaces the current transform. Implementations must not compose.
    fn set_transform(&mut self, transform: Transform2d);

    fn transform(&self) -> Transform2d;

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn clear_rect(&mut self, rect: Rect);
}
