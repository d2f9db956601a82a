use std::fmt;

use super::{GlBackend, ShaderStage};

/// A successfully compiled shader object.
pub struct Shader<G: GlBackend> {
    pub(super) raw: G::Shader,
    pub(super) stage: ShaderStage,
}

impl<G: GlBackend> Shader<G> {
    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[inline]
    pub fn raw(&self) -> G::Shader {
        self.raw
    }
}

impl<G: GlBackend> fmt::Debug for Shader<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("raw", &self.raw)
            .field("stage", &self.stage)
            .finish()
    }
}

/// A linked program together with the two shaders attached to it.
///
/// Only linked programs are ever handed out; a failed link leaves no value
/// behind. The shaders stay attached for the life of the program and are
/// released together with it by `GpuContext::delete_program`.
pub struct ShaderProgram<G: GlBackend> {
    pub(super) raw: G::Program,
    pub(super) vertex: G::Shader,
    pub(super) fragment: G::Shader,
}

impl<G: GlBackend> ShaderProgram<G> {
    #[inline]
    pub fn raw(&self) -> G::Program {
        self.raw
    }
}

impl<G: GlBackend> fmt::Debug for ShaderProgram<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("raw", &self.raw)
            .field("vertex", &self.vertex)
            .field("fragment", &self.fragment)
            .finish()
    }
}

/// Vertex buffer uploaded through `GpuContext::upload_vertices`.
pub struct VertexBuffer<G: GlBackend> {
    pub(super) raw: G::Buffer,
    pub(super) floats: usize,
}

impl<G: GlBackend> VertexBuffer<G> {
    /// Number of `f32` values stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.floats
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.floats == 0
    }
}

impl<G: GlBackend> fmt::Debug for VertexBuffer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("raw", &self.raw)
            .field("floats", &self.floats)
            .finish()
    }
}
