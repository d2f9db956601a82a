use crate::coords::{Axis, Vec3};
use crate::paint::Color;

/// How the background reference grid is drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GridPattern {
    /// Full-length horizontal and vertical lines (crosshatch).
    Lines,
    /// A `size × size` dot at every grid intersection.
    Dots { size: f32 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridStyle {
    /// Distance between grid lines, in logical pixels. Non-positive disables the grid.
    pub spacing: f32,
    pub color: Color,
    pub pattern: GridPattern,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            spacing: 20.0,
            color: Color::from_rgb_u8(0x33, 0x33, 0x33),
            pattern: GridPattern::Lines,
        }
    }
}

/// Square drawn at each projected point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub size: f32,
    pub color: Color,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: 3.0,
            color: Color::white(),
        }
    }
}

/// Engine parameters fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Focal-length-like scale of the perspective divide.
    pub fov_factor: f32,
    /// Eye offset. Only `z` takes part in projection.
    pub camera: Vec3,
    /// Radians per second.
    pub rotation_speed: f32,
    /// Axes rotated about each update, in this order.
    pub rotation_axes: Vec<Axis>,
    pub grid: GridStyle,
    pub marker: MarkerStyle,
    /// Filled over the cleared surface before the grid when set.
    pub background: Option<Color>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fov_factor: 400.0,
            camera: Vec3::new(0.0, 0.0, 5.0),
            rotation_speed: 1.0,
            rotation_axes: vec![Axis::Y],
            grid: GridStyle::default(),
            marker: MarkerStyle::default(),
            background: None,
        }
    }
}
