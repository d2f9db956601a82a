use super::ShaderStage;
use crate::surface::SurfaceInitError;

/// Failures of the GPU program manager.
///
/// Compile/link failures carry the backend diagnostic text. A failed shader or
/// program has already been deleted when the error is returned.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error(transparent)]
    Surface(#[from] SurfaceInitError),

    #[error("unable to obtain a WebGL2 context for `{surface}`")]
    ContextUnavailable { surface: String },

    #[error("GPU context is bound to `{bound}`; refusing to rebind to `{requested}`")]
    ContextRebind { bound: String, requested: String },

    #[error("failed to create {what}: {reason}")]
    ResourceCreation { what: &'static str, reason: String },

    #[error("error compiling {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("error linking program: {log}")]
    ProgramLink { log: String },

    #[error("attribute `{name}` not found in program")]
    AttributeNotFound { name: String },

    #[error("uniform `{name}` not found in program")]
    UniformNotFound { name: String },
}
