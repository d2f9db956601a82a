//! wgpu device + window surface.
//!
//! - creates the Instance/Adapter/Device/Queue for one window
//! - configures the swapchain and follows window resizes
//! - acquires, records and presents one swapchain image per frame

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::{FrameOutcome, GpuFrame};
pub use gpu::Gpu;
pub use init::GpuInit;
