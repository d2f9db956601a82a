use super::PointSet;

/// What an engine draws on top of the background grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Scene {
    /// The grid alone (the plain graph page).
    GridOnly,
    /// The grid plus a rotating, projected point cloud.
    PointCloud(PointSet),
}

impl Scene {
    #[inline]
    pub fn point_set(self) -> Option<PointSet> {
        match self {
            Self::GridOnly => None,
            Self::PointCloud(set) => Some(set),
        }
    }
}
