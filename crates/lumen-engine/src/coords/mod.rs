//! Coordinate and geometry types shared by the drawing surface, the projection
//! engine and the shape builders.
//!
//! Canonical 2D space:
//! - Logical pixels (CSS pixels, DPI-independent)
//! - Origin top-left
//! - +X right, +Y down
//!
//! 3D points live in a right-handed model space centered on the origin; the
//! projection engine maps them to 2D.

mod rect;
mod vec2;
mod vec3;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use vec3::{Axis, Vec3};
pub use viewport::Viewport;
