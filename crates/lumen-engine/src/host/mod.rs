//! Host environment contracts.
//!
//! The core never talks to a concrete platform. Everything it consumes from its
//! environment (element lookup, layout size, device pixel ratio, 2D and GL
//! contexts, resize notifications, the frame clock) goes through these traits.
//!
//! Implementations:
//! - `window` (native winit + wgpu)
//! - `lumen-web` (browser DOM)
//! - [`recording`] (in-memory, used by tests and headless tools)

mod canvas;
mod frames;
pub mod recording;

pub use canvas::{
    CanvasElement, CanvasHost, Context2d, Context2dSource, GlSource, HostElement,
    ResizeSubscription, Transform2d,
};
pub use frames::{FrameRequest, FrameScheduler};
