//! Native window runtime.
//!
//! Owns the `winit` event loop and window, exposes the window as a canvas
//! host ([`WindowHost`], [`WindowCanvas`]) plus a redraw-driven
//! [`WindowFrames`] scheduler, and renders the canvas content with wgpu.

mod canvas;
mod frames;
mod runtime;

pub use canvas::{WindowCanvas, WindowContext2d, WindowHost};
pub use frames::WindowFrames;
pub use runtime::{Runtime, RuntimeConfig};
