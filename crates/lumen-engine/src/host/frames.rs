/// Identifier of one scheduled frame callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameRequest(pub u64);

/// Host frame clock (`requestAnimationFrame` or a window redraw loop).
///
/// A request fires at most once. When it fires, the host passes the current
/// timestamp to whoever requested it (see `Engine::on_frame`).
pub trait FrameScheduler {
    /// `None` when the host could not schedule a callback; nothing will fire.
    fn request_frame(&mut self) -> Option<FrameRequest>;

    /// Cancelling a request that already fired or was cancelled is a no-op.
    fn cancel_frame(&mut self, request: FrameRequest);
}
