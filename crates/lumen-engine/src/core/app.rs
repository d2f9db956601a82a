use super::ctx::{FrameCtx, StartCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`Runtime`](crate::window::Runtime).
pub trait App {
    /// Called once the window and its canvas exist. Bind surfaces and start
    /// frame loops here. An error shuts the runtime down.
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> anyhow::Result<()>;

    /// Called when a requested frame fires.
    fn on_frame(&mut self, ctx: &FrameCtx) -> AppControl;

    /// Called once before the window closes.
    fn on_exit(&mut self) {}
}
