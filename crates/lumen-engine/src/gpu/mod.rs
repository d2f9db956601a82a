//! GPU program manager.
//!
//! This module is responsible for:
//! - holding the one GL context of a page ([`GpuContext`], passed around explicitly)
//! - compiling shaders and linking them into programs, releasing everything on failure
//! - attribute / uniform lookups with explicit not-found errors
//! - keeping the backing store in sync with the element's layout size
//!
//! The backend is abstracted by [`GlBackend`]; [`GlowBackend`] is the production
//! implementation.

mod backend;
mod context;
mod error;
mod flat;
mod glow_backend;
mod program;
mod slot;

pub use backend::{GlBackend, ShaderStage};
pub use context::GpuContext;
pub use error::GpuError;
pub use flat::{FlatShapeProgram, FLAT_FRAGMENT_SHADER, FLAT_VERTEX_SHADER};
pub use glow_backend::GlowBackend;
pub use program::{Shader, ShaderProgram, VertexBuffer};
pub use slot::GpuSlot;
