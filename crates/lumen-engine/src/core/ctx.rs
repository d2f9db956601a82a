use crate::coords::Viewport;
use crate::window::{WindowFrames, WindowHost};

/// Handles available to [`App::on_start`](super::App::on_start).
pub struct StartCtx<'a> {
    /// Resolves the window canvas by its configured id.
    pub host: &'a mut WindowHost,
    frames: &'a WindowFrames,
}

impl<'a> StartCtx<'a> {
    pub(crate) fn new(host: &'a mut WindowHost, frames: &'a WindowFrames) -> Self {
        Self { host, frames }
    }

    /// A frame scheduler handle for this window. Every clone drives the same
    /// redraw loop.
    pub fn frames(&self) -> WindowFrames {
        self.frames.clone()
    }

    #[inline]
    pub fn canvas_id(&self) -> &str {
        self.host.canvas_id()
    }
}

/// Per-frame data passed to [`App::on_frame`](super::App::on_frame).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameCtx {
    /// Seconds since the runtime started.
    pub timestamp: f64,
    /// Window size in logical pixels.
    pub viewport: Viewport,
    pub scale_factor: f32,
}
