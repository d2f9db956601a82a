use core::ops::{Add, Sub};

/// Rotation axis selector.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// 3D point in model space.
///
/// Rotations mutate the point in place; [`Vec3::rotated`] returns a copy.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Rotates about the Z axis by `angle` radians (acts on x/y).
    pub fn rotate_z(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let (x, y) = (self.x, self.y);
        self.x = x * cos - y * sin;
        self.y = x * sin + y * cos;
    }

    /// Rotates about the X axis by `angle` radians (acts on z/y).
    pub fn rotate_x(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let (z, y) = (self.z, self.y);
        self.z = z * cos - y * sin;
        self.y = z * sin + y * cos;
    }

    /// Rotates about the Y axis by `angle` radians (acts on x/z).
    pub fn rotate_y(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let (x, z) = (self.x, self.z);
        self.x = x * cos - z * sin;
        self.z = x * sin + z * cos;
    }

    /// Rotates about `axis` in place.
    #[inline]
    pub fn rotate(&mut self, axis: Axis, angle: f32) {
        match axis {
            Axis::X => self.rotate_x(angle),
            Axis::Y => self.rotate_y(angle),
            Axis::Z => self.rotate_z(angle),
        }
    }

    /// Returns a rotated copy, leaving `self` untouched.
    #[inline]
    pub fn rotated(mut self, axis: Axis, angle: f32) -> Self {
        self.rotate(axis, angle);
        self
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
