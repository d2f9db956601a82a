use crate::coords::{Rect, Vec2, Vec3, Viewport};
use crate::host::{CanvasHost, Context2dSource, FrameRequest, FrameScheduler};
use crate::surface::{DrawingSurface, SurfaceInitError, SurfaceState};
use crate::time::FrameClock;

use super::{EngineConfig, GridPattern, PointCloud, Scene};

/// Perspective projection with a camera offset along z.
///
/// `effective_z = point.z + camera_z`. Points at or behind the camera plane
/// (`effective_z <= 0`) map to the sentinel `(0, 0)` so one degenerate point
/// never aborts a frame. Otherwise each axis is `round(v × fov / effective_z)`.
pub fn project(point: Vec3, camera_z: f32, fov_factor: f32) -> Vec2 {
    let effective_z = point.z + camera_z;
    if effective_z <= 0.0 || effective_z.is_nan() {
        return Vec2::zero();
    }
    Vec2::new(
        (point.x * fov_factor / effective_z).round(),
        (point.y * fov_factor / effective_z).round(),
    )
}

/// Draw calls issued by one [`Engine::render`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub grid_lines: usize,
    pub grid_dots: usize,
    pub markers: usize,
}

/// Rotating point-cloud renderer bound to one drawing surface.
pub struct Engine<E: Context2dSource, S: FrameScheduler> {
    surface: DrawingSurface<E>,
    scheduler: S,
    pending: Option<FrameRequest>,
    clock: FrameClock,
    scene: Scene,
    cloud: PointCloud,
    config: EngineConfig,
}

impl<E: Context2dSource, S: FrameScheduler> Engine<E, S> {
    /// Binds a drawing surface to `surface_id`. No points exist and no frame
    /// is requested until [`init`](Self::init).
    pub fn new<H>(
        host: &mut H,
        surface_id: &str,
        scheduler: S,
        scene: Scene,
        config: EngineConfig,
    ) -> Result<Self, SurfaceInitError>
    where
        H: CanvasHost<Element = E>,
    {
        let surface = DrawingSurface::new(host, surface_id)?;
        Ok(Self::with_surface(surface, scheduler, scene, config))
    }

    pub fn with_surface(
        surface: DrawingSurface<E>,
        scheduler: S,
        scene: Scene,
        config: EngineConfig,
    ) -> Self {
        Self {
            surface,
            scheduler,
            pending: None,
            clock: FrameClock::new(),
            scene,
            cloud: PointCloud::default(),
            config,
        }
    }

    /// Populates the point cloud for the scene and starts the loop.
    pub fn init(&mut self) {
        self.cloud = self
            .scene
            .point_set()
            .map(PointCloud::from_set)
            .unwrap_or_default();

        log::info!(
            "engine on `{}` initialised with {} points",
            self.surface.id(),
            self.cloud.len()
        );

        self.start_loop();
    }

    /// Requests the next frame. No-op while a request is pending.
    pub fn start_loop(&mut self) {
        if self.pending.is_some() {
            return;
        }
        self.clock.reset();
        self.request_next_frame();
    }

    fn request_next_frame(&mut self) {
        self.pending = self.scheduler.request_frame();
        if self.pending.is_none() {
            log::warn!("engine on `{}`: host refused a frame, loop stopped", self.surface.id());
        }
    }

    /// Cancels the pending frame, if any.
    pub fn stop_loop(&mut self) {
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
            log::debug!("engine on `{}` stopped", self.surface.id());
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Host frame callback.
    ///
    /// Runs one `update` + `render` and schedules the next frame. Callbacks
    /// arriving after [`stop_loop`](Self::stop_loop) are ignored and return
    /// `None`.
    pub fn on_frame(&mut self, timestamp_seconds: f64) -> Option<FrameStats> {
        self.pending.take()?;

        self.surface.sync();

        let time = self.clock.tick(timestamp_seconds);
        self.update(time.dt);
        let stats = self.render();

        log::trace!(
            "frame {} dt={:.4}s: {} markers",
            time.frame_index,
            time.dt,
            stats.markers
        );

        self.request_next_frame();
        Some(stats)
    }

    /// Rotates every point by `rotation_speed × dt` about each configured
    /// axis, in order.
    pub fn update(&mut self, dt: f32) {
        let angle = self.config.rotation_speed * dt;
        if angle == 0.0 {
            return;
        }
        self.cloud.rotate(&self.config.rotation_axes, angle);
    }

    /// Projects `point` with this engine's camera and field of view.
    #[inline]
    pub fn project(&self, point: Vec3) -> Vec2 {
        project(point, self.config.camera.z, self.config.fov_factor)
    }

    /// Clears, draws the grid, then one marker per point in cloud order.
    pub fn render(&mut self) -> FrameStats {
        let viewport = self.surface.state().viewport();
        let mut stats = FrameStats::default();

        self.surface.clear();
        if let Some(bg) = self.config.background {
            self.surface
                .draw_rectangle(0.0, 0.0, viewport.width, viewport.height, bg);
        }

        self.draw_grid(viewport, &mut stats);

        let center = viewport.center();
        let marker = self.config.marker;
        for &point in self.cloud.points() {
            let at = project(point, self.config.camera.z, self.config.fov_factor) + center;
            let Rect { origin, size } = Rect::centered_square(at, marker.size);
            self.surface
                .draw_rectangle(origin.x, origin.y, size.x, size.y, marker.color);
            stats.markers += 1;
        }

        stats
    }

    fn draw_grid(&mut self, viewport: Viewport, stats: &mut FrameStats) {
        let style = self.config.grid;
        if !(style.spacing.is_finite() && style.spacing > 0.0) {
            return;
        }

        let xs = grid_steps(viewport.width, style.spacing);
        let ys = grid_steps(viewport.height, style.spacing);

        match style.pattern {
            GridPattern::Lines => {
                for x in xs {
                    self.surface.draw_line(
                        Vec2::new(x, 0.0),
                        Vec2::new(x, viewport.height),
                        style.color,
                    );
                    stats.grid_lines += 1;
                }
                for y in ys {
                    self.surface.draw_line(
                        Vec2::new(0.0, y),
                        Vec2::new(viewport.width, y),
                        style.color,
                    );
                    stats.grid_lines += 1;
                }
            }
            GridPattern::Dots { size } => {
                for x in xs {
                    for y in ys.clone() {
                        self.surface.draw_rectangle(x, y, size, size, style.color);
                        stats.grid_dots += 1;
                    }
                }
            }
        }
    }

    /// Re-reads the surface size; the next frame draws at the new size.
    pub fn resize(&mut self) -> SurfaceState {
        self.surface.resize()
    }

    /// Stops the loop and releases the surface's resize subscription.
    pub fn destroy(&mut self) {
        self.stop_loop();
        self.surface.destroy();
    }

    #[inline]
    pub fn points(&self) -> &[Vec3] {
        self.cloud.points()
    }

    #[inline]
    pub fn scene(&self) -> Scene {
        self.scene
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn surface(&self) -> &DrawingSurface<E> {
        &self.surface
    }

    #[inline]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<E: Context2dSource, S: FrameScheduler> Drop for Engine<E, S> {
    fn drop(&mut self) {
        self.stop_loop();
    }
}

/// `0, spacing, 2·spacing, …` strictly below `extent`.
fn grid_steps(extent: f32, spacing: f32) -> impl Iterator<Item = f32> + Clone {
    (0u32..)
        .map(move |i| i as f32 * spacing)
        .take_while(move |&v| v < extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Axis;
    use crate::engine::{GridStyle, PointSet};
    use crate::host::recording::{DrawOp, RecordingCanvas, RecordingFrames, RecordingHost};
    use crate::paint::Color;

    fn engine(
        canvas: &RecordingCanvas,
        frames: &RecordingFrames,
        scene: Scene,
        config: EngineConfig,
    ) -> Engine<RecordingCanvas, RecordingFrames> {
        let mut host = RecordingHost::new().with_canvas("scene", canvas.clone());
        Engine::new(&mut host, "scene", frames.clone(), scene, config).unwrap()
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn origin_projects_to_origin() {
        assert_eq!(project(Vec3::zero(), 5.0, 400.0), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn projection_rounds_the_perspective_divide() {
        // 0.5 * 400 / 5.5 = 36.36
        let p = project(Vec3::new(0.5, -0.5, 0.5), 5.0, 400.0);
        assert_eq!(p, Vec2::new(36.0, -36.0));
    }

    #[test]
    fn points_at_or_behind_the_camera_hit_the_sentinel() {
        assert_eq!(project(Vec3::new(3.0, 4.0, -5.0), 5.0, 400.0), Vec2::zero());
        assert_eq!(project(Vec3::new(3.0, 4.0, -9.0), 5.0, 400.0), Vec2::zero());
        assert_eq!(project(Vec3::new(3.0, 4.0, f32::NAN), 5.0, 400.0), Vec2::zero());
    }

    // ── loop ──────────────────────────────────────────────────────────────

    #[test]
    fn init_populates_and_requests_one_frame() {
        let canvas = RecordingCanvas::new(100.0, 80.0, 1.0);
        let frames = RecordingFrames::new();
        let mut engine = engine(
            &canvas,
            &frames,
            Scene::PointCloud(PointSet::CubeCorners),
            EngineConfig::default(),
        );

        assert_eq!(frames.requested(), 0);
        engine.init();
        assert_eq!(engine.points().len(), 8);
        assert_eq!(frames.pending(), 1);

        engine.start_loop();
        assert_eq!(frames.requested(), 1);
    }

    #[test]
    fn on_frame_reschedules_itself() {
        let canvas = RecordingCanvas::new(100.0, 80.0, 1.0);
        let frames = RecordingFrames::new();
        let mut engine = engine(&canvas, &frames, Scene::GridOnly, EngineConfig::default());
        engine.init();

        for i in 0..3 {
            assert!(frames.fire().is_some());
            assert!(engine.on_frame(i as f64 / 60.0).is_some());
        }
        assert_eq!(frames.requested(), 4);
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn refused_request_leaves_the_loop_stopped() {
        let canvas = RecordingCanvas::new(100.0, 80.0, 1.0);
        let frames = RecordingFrames::new();
        let mut engine = engine(&canvas, &frames, Scene::GridOnly, EngineConfig::default());

        frames.refuse_requests(true);
        engine.init();
        assert!(!engine.is_running());
        assert_eq!(engine.on_frame(0.0), None);

        frames.refuse_requests(false);
        engine.start_loop();
        assert!(engine.is_running());

        // The host stops scheduling mid-loop: the frame still runs, then the
        // engine reports itself stopped.
        frames.refuse_requests(true);
        assert!(frames.fire().is_some());
        assert!(engine.on_frame(0.0).is_some());
        assert!(!engine.is_running());
        assert_eq!(frames.pending(), 0);

        engine.stop_loop();
        assert_eq!(frames.cancelled(), 0);
    }

    #[test]
    fn stop_loop_is_idempotent_and_silences_late_callbacks() {
        let canvas = RecordingCanvas::new(100.0, 80.0, 1.0);
        let frames = RecordingFrames::new();
        let mut engine = engine(&canvas, &frames, Scene::GridOnly, EngineConfig::default());

        engine.stop_loop();
        assert_eq!(frames.cancelled(), 0);

        engine.init();
        engine.stop_loop();
        engine.stop_loop();
        assert_eq!(frames.cancelled(), 1);
        assert!(!engine.is_running());

        canvas.clear_ops();
        assert_eq!(engine.on_frame(1.0), None);
        assert!(canvas.ops().is_empty());
    }

    #[test]
    fn first_frame_does_not_rotate() {
        let canvas = RecordingCanvas::new(100.0, 80.0, 1.0);
        let frames = RecordingFrames::new();
        let mut engine = engine(
            &canvas,
            &frames,
            Scene::PointCloud(PointSet::CubeCorners),
            EngineConfig::default(),
        );
        engine.init();
        let before = engine.points().to_vec();

        engine.on_frame(1000.0);
        assert_eq!(engine.points(), before.as_slice());

        engine.on_frame(1000.1);
        assert_ne!(engine.points(), before.as_slice());
    }

    #[test]
    fn update_composes_axes_in_order() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let frames = RecordingFrames::new();
        let config = EngineConfig {
            rotation_axes: vec![Axis::X, Axis::Y],
            rotation_speed: std::f32::consts::FRAC_PI_2,
            ..EngineConfig::default()
        };
        let mut engine = engine(&canvas, &frames, Scene::PointCloud(PointSet::CubeCorners), config);
        engine.init();

        let mut expected = engine.points().to_vec();
        for p in &mut expected {
            p.rotate(Axis::X, std::f32::consts::FRAC_PI_2);
            p.rotate(Axis::Y, std::f32::consts::FRAC_PI_2);
        }

        engine.update(1.0);
        assert_eq!(engine.points(), expected.as_slice());
    }

    // ── render ────────────────────────────────────────────────────────────

    #[test]
    fn grid_covers_the_canvas_at_fixed_spacing() {
        let canvas = RecordingCanvas::new(100.0, 80.0, 2.0);
        let frames = RecordingFrames::new();
        let mut engine = engine(&canvas, &frames, Scene::GridOnly, EngineConfig::default());

        let stats = engine.render();
        // x = 0, 20, 40, 60, 80 and y = 0, 20, 40, 60
        assert_eq!(stats, FrameStats { grid_lines: 9, grid_dots: 0, markers: 0 });

        let ops = canvas.ops();
        assert!(matches!(ops[0], DrawOp::ClearRect { .. }));
        assert!(matches!(
            ops[1],
            DrawOp::Line { from, to, .. } if from == Vec2::new(0.0, 0.0) && to == Vec2::new(0.0, 80.0)
        ));
        assert!(matches!(
            ops[9],
            DrawOp::Line { from, to, .. } if from == Vec2::new(0.0, 60.0) && to == Vec2::new(100.0, 60.0)
        ));
    }

    #[test]
    fn dot_grid_draws_one_dot_per_intersection() {
        let canvas = RecordingCanvas::new(40.0, 40.0, 1.0);
        let frames = RecordingFrames::new();
        let config = EngineConfig {
            grid: GridStyle {
                pattern: GridPattern::Dots { size: 3.0 },
                ..GridStyle::default()
            },
            ..EngineConfig::default()
        };
        let mut engine = engine(&canvas, &frames, Scene::GridOnly, config);
        assert_eq!(engine.render().grid_dots, 4);
    }

    #[test]
    fn markers_are_centered_on_the_projection() {
        let canvas = RecordingCanvas::new(200.0, 100.0, 1.0);
        let frames = RecordingFrames::new();
        let config = EngineConfig {
            grid: GridStyle { spacing: 0.0, ..GridStyle::default() },
            ..EngineConfig::default()
        };
        let mut engine = engine(&canvas, &frames, Scene::PointCloud(PointSet::CubeCorners), config);
        engine.init();
        canvas.clear_ops();

        let stats = engine.render();
        assert_eq!(stats.markers, 8);

        // First corner (-0.5, -0.5, -0.5): 0.5 * 400 / 4.5 = 44.4 -> -44.
        let ops = canvas.ops();
        assert_eq!(
            ops[1],
            DrawOp::FillRect {
                rect: Rect::new(100.0 - 44.0 - 1.5, 50.0 - 44.0 - 1.5, 3.0, 3.0),
                color: Color::white(),
            }
        );
    }

    #[test]
    fn background_is_filled_after_clear() {
        let canvas = RecordingCanvas::new(20.0, 20.0, 1.0);
        let frames = RecordingFrames::new();
        let config = EngineConfig {
            background: Some(Color::black()),
            ..EngineConfig::default()
        };
        let mut engine = engine(&canvas, &frames, Scene::GridOnly, config);
        engine.render();

        assert_eq!(
            canvas.ops()[1],
            DrawOp::FillRect { rect: Rect::new(0.0, 0.0, 20.0, 20.0), color: Color::black() }
        );
    }

    #[test]
    fn pending_resize_is_applied_before_drawing() {
        let canvas = RecordingCanvas::new(40.0, 40.0, 1.0);
        let frames = RecordingFrames::new();
        let mut engine = engine(&canvas, &frames, Scene::GridOnly, EngineConfig::default());
        engine.init();

        canvas.set_client_size(60.0, 40.0);
        canvas.notify_resize();
        let stats = engine.on_frame(0.0).unwrap();

        // x = 0, 20, 40 and y = 0, 20
        assert_eq!(stats.grid_lines, 5);
        assert_eq!(engine.surface().width(), 60.0);
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn destroy_stops_and_unsubscribes() {
        let canvas = RecordingCanvas::new(40.0, 40.0, 1.0);
        let frames = RecordingFrames::new();
        let mut engine = engine(&canvas, &frames, Scene::GridOnly, EngineConfig::default());
        engine.init();

        engine.destroy();
        engine.destroy();
        assert_eq!(frames.pending(), 0);
        assert_eq!(frames.cancelled(), 1);
        assert_eq!(canvas.active_subscriptions(), 0);
    }

    #[test]
    fn drop_cancels_the_pending_frame() {
        let canvas = RecordingCanvas::new(40.0, 40.0, 1.0);
        let frames = RecordingFrames::new();
        let mut engine = engine(&canvas, &frames, Scene::GridOnly, EngineConfig::default());
        engine.init();
        drop(engine);
        assert_eq!(frames.pending(), 0);
        assert_eq!(canvas.active_subscriptions(), 0);
    }
}
