//! Time subsystem.
//!
//! Frame timing driven by host-supplied timestamps:
//! - one `FrameClock` per render loop
//! - call `tick(now)` once per host frame callback to obtain `FrameTime`

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
