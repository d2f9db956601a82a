//! 2D drawing-surface adapter.
//!
//! Binds a 2D context to a host canvas and keeps the backing store in sync with
//! the element's layout size and device pixel ratio. All drawing happens in
//! logical (CSS) pixels.

mod drawing;
mod error;

pub use drawing::{DrawingSurface, SurfaceState, LINE_WIDTH};
pub use error::SurfaceInitError;

use crate::host::{CanvasHost, HostElement};

/// Resolves `id` to a canvas element, logging and classifying failures.
pub(crate) fn lookup_canvas<H: CanvasHost>(
    host: &mut H,
    id: &str,
) -> Result<H::Element, SurfaceInitError> {
    match host.element_by_id(id) {
        Some(HostElement::Canvas(element)) => Ok(element),
        Some(HostElement::Other { tag }) => {
            let err = SurfaceInitError::NotACanvas { id: id.to_owned(), tag };
            log::error!("{err}");
            Err(err)
        }
        None => {
            let err = SurfaceInitError::MissingElement { id: id.to_owned() };
            log::error!("{err}");
            Err(err)
        }
    }
}
