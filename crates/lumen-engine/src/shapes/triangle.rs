use crate::coords::Vec2;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
}

impl Triangle {
    /// Vertices per triangle in a triangle-list draw.
    pub const VERTEX_COUNT: usize = 3;

    #[inline]
    pub const fn new(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self { a, b, c }
    }

    /// `[ax, ay, bx, by, cx, cy]`
    #[inline]
    pub fn to_array(self) -> [f32; 6] {
        [self.a.x, self.a.y, self.b.x, self.b.y, self.c.x, self.c.y]
    }

    /// Twice the signed area; zero for degenerate triangles.
    pub fn signed_area2(self) -> f32 {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        ab.x * ac.y - ab.y * ac.x
    }
}
