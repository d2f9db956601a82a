//! Projection / animation engine.
//!
//! Owns a point cloud, rotates it from frame-clock deltas and draws the
//! perspective projection over a background grid through a
//! [`DrawingSurface`](crate::surface::DrawingSurface).
//!
//! The loop is cooperative: the engine asks its [`FrameScheduler`] for one
//! frame at a time and the host calls [`Engine::on_frame`] back with its
//! timestamp.
//!
//! [`FrameScheduler`]: crate::host::FrameScheduler

mod config;
mod points;
mod runner;
mod scene;

pub use config::{EngineConfig, GridPattern, GridStyle, MarkerStyle};
pub use points::{PointCloud, PointSet};
pub use runner::{project, Engine, FrameStats};
pub use scene::Scene;
