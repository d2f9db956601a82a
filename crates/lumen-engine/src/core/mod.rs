//! Contract between the native runtime and applications.
//!
//! The runtime owns the window, GPU and event loop; an [`App`] only sees the
//! host traits (through [`StartCtx`]) and frame timestamps (through
//! [`FrameCtx`]).

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, StartCtx};
