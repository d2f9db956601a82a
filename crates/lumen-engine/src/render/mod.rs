//! wgpu rendering of recorded 2D draw commands.
//!
//! Convention:
//! - commands arrive in physical pixels (top-left origin, +Y down), already
//!   transformed by the 2D context
//! - the vertex shader converts to NDC using a viewport uniform

mod draw;
mod solid;

pub use draw::{tessellate, DrawCommand, SolidVertex};
pub use solid::SolidRenderer;
