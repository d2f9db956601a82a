//! Lumen engine crate.
//!
//! Rendering core shared by the native studio and the browser pages:
//! vector math, a DPR-aware 2D drawing surface, a GL shader-program manager,
//! shape builders and a rotating point-cloud projection engine. Platforms plug
//! in through the traits in [`host`]; the native wgpu + winit backend
//! (`native` feature) lives in `device`, `render` and `window`.

pub mod coords;
pub mod paint;
pub mod shapes;

pub mod host;
pub mod surface;
pub mod gpu;
pub mod engine;
pub mod time;

#[cfg(feature = "native")]
pub mod logging;

#[cfg(feature = "native")]
pub mod device;
#[cfg(feature = "native")]
pub mod render;
#[cfg(feature = "native")]
pub mod window;
#[cfg(feature = "native")]
pub mod core;
