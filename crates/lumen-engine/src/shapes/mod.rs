//! Vertex payload builders for the GL tutorial pages.
//!
//! Positions are flattened `[x, y, x, y, …]` for a `vec2` attribute and are
//! drawn as a triangle list.

mod rectangle;
mod triangle;

pub use rectangle::Rectangle;
pub use triangle::Triangle;
