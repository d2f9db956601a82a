/// Color view and encoder of the swapchain image being drawn.
pub struct GpuFrame {
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// What happened to one [`Gpu::render_frame`](super::Gpu::render_frame) call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// Surface was lost or outdated and has been reconfigured; nothing drawn.
    Reconfigured,
    /// Transient acquire failure; the frame was dropped.
    Skipped,
    /// Out of memory. The runtime shuts down.
    Fatal,
}
