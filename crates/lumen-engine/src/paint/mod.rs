//! Paint model shared between the drawing surface and the GPU program manager.

pub mod color;

pub use color::Color;
