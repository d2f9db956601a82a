/// Failure to bind a drawing surface to its host element.
///
/// Always fatal for the caller: there is nothing to retry.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SurfaceInitError {
    #[error("error initialising canvas: `{id}` does not exist")]
    MissingElement { id: String },

    #[error("error initialising canvas: `{id}` is not a canvas element (found <{tag}>)")]
    NotACanvas { id: String, tag: String },

    #[error("error initialising context for `{id}`")]
    ContextUnavailable { id: String },
}
