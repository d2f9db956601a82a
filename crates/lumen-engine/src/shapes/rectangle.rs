use crate::coords::{Rect, Vec2};

use super::Triangle;

/// Axis-aligned rectangle split into two triangles.
///
/// `(x, y)` is the top-left corner. The triangles are
/// `(top_left, top_right, bottom_left)` and
/// `(top_right, bottom_left, bottom_right)`; together they cover the rectangle
/// exactly once.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rectangle {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

impl Rectangle {
    pub const VERTEX_COUNT: usize = 2 * Triangle::VERTEX_COUNT;

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            top_left: Vec2::new(x, y),
            top_right: Vec2::new(x + width, y),
            bottom_left: Vec2::new(x, y + height),
            bottom_right: Vec2::new(x + width, y + height),
        }
    }

    #[inline]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.origin.x, rect.origin.y, rect.size.x, rect.size.y)
    }

    pub fn triangles(self) -> [Triangle; 2] {
        [
            Triangle::new(self.top_left, self.top_right, self.bottom_left),
            Triangle::new(self.top_right, self.bottom_left, self.bottom_right),
        ]
    }

    pub fn to_array(self) -> [f32; 12] {
        let [first, second] = self.triangles();
        let mut out = [0.0; 12];
        out[..6].copy_from_slice(&first.to_array());
        out[6..].copy_from_slice(&second.to_array());
        out
    }
}
