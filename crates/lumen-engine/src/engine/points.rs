use crate::coords::{Axis, Vec3};

/// Which points an engine populates on `init`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointSet {
    /// The 8 vertices of a unit cube centered at the origin (`±0.5`).
    CubeCorners,
    /// Grid sampling of `[-1, 1]³`, both ends included, at `step`.
    DenseCube { step: f32 },
}

impl PointSet {
    pub const DEFAULT_STEP: f32 = 0.25;

    /// Largest point count [`generate`](Self::generate) will allocate. Dense
    /// cubes above it produce no points.
    pub const MAX_POINTS: usize = 1 << 20;

    pub fn dense() -> Self {
        Self::DenseCube { step: Self::DEFAULT_STEP }
    }

    /// Generates the points in x-major, then y, then z order.
    pub fn generate(self) -> Vec<Vec3> {
        match self {
            Self::CubeCorners => {
                let mut out = Vec::with_capacity(8);
                for x in [-0.5, 0.5] {
                    for y in [-0.5, 0.5] {
                        for z in [-0.5, 0.5] {
                            out.push(Vec3::new(x, y, z));
                        }
                    }
                }
                out
            }
            Self::DenseCube { step } => {
                if !(step.is_finite() && step > 0.0) {
                    log::warn!("dense cube step {step} is not positive, generating no points");
                    return Vec::new();
                }

                // Tolerance so 2.0 / 0.1 style steps still reach the far face.
                let per_axis = (2.0 / step as f64 + 1e-4).floor() + 1.0;
                let total = per_axis.powi(3);
                if total > Self::MAX_POINTS as f64 {
                    log::warn!(
                        "dense cube step {step} needs {total:.0} points (max {}), generating no points",
                        Self::MAX_POINTS
                    );
                    return Vec::new();
                }
                let per_axis = per_axis as usize;
                let coord = |i: usize| -1.0 + i as f32 * step;

                let mut out = Vec::with_capacity(per_axis * per_axis * per_axis);
                for i in 0..per_axis {
                    for j in 0..per_axis {
                        for k in 0..per_axis {
                            out.push(Vec3::new(coord(i), coord(j), coord(k)));
                        }
                    }
                }
                out
            }
        }
    }
}

/// Ordered point set owned by one engine.
///
/// Rotation mutates the points in place; insertion order is draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Vec3>,
}

impl PointCloud {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    pub fn from_set(set: PointSet) -> Self {
        Self::new(set.generate())
    }

    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Rotates every point by `angle` about each axis in `axes`, in order.
    pub fn rotate(&mut self, axes: &[Axis], angle: f32) {
        for p in &mut self.points {
            for &axis in axes {
                p.rotate(axis, angle);
            }
        }
    }
}
