use anyhow::Result;
use clap::{Parser, ValueEnum};

use lumen_engine::coords::{Axis, Vec3};
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::device::GpuInit;
use lumen_engine::engine::{Engine, EngineConfig, GridPattern, GridStyle, PointSet, Scene};
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::window::{Runtime, RuntimeConfig, WindowCanvas, WindowFrames};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Points {
    /// Grid only.
    None,
    /// The 8 corners of a unit cube.
    Corners,
    /// A dense sampling of [-1, 1]³.
    Dense,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum RotationAxis {
    X,
    Y,
    Z,
}

impl From<RotationAxis> for Axis {
    fn from(a: RotationAxis) -> Self {
        match a {
            RotationAxis::X => Axis::X,
            RotationAxis::Y => Axis::Y,
            RotationAxis::Z => Axis::Z,
        }
    }
}

/// Rotating point cloud projected onto a 2D grid.
#[derive(Debug, Parser)]
#[command(name = "lumen-studio", version)]
struct Args {
    #[arg(long, value_enum, default_value_t = Points::Corners)]
    points: Points,

    /// Sampling step of the dense cube.
    #[arg(long, default_value_t = PointSet::DEFAULT_STEP, value_parser = parse_step)]
    step: f32,

    /// Rotation speed in radians per second.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Rotation axes, applied in order each frame.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [RotationAxis::Y])]
    axes: Vec<RotationAxis>,

    /// Focal-length scale of the perspective divide.
    #[arg(long, default_value_t = 400.0)]
    fov: f32,

    /// Camera distance added to every point's z.
    #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
    camera_z: f32,

    /// Grid spacing in logical pixels; 0 hides the grid.
    #[arg(long, default_value_t = 20.0)]
    grid: f32,

    /// Draw the grid as dots instead of lines.
    #[arg(long)]
    dots: bool,

    /// env_logger filter, e.g. `lumen_engine=debug`.
    #[arg(long)]
    log: Option<String>,
}

/// Positive step whose dense cube stays within [`PointSet::MAX_POINTS`].
fn parse_step(raw: &str) -> Result<f32, String> {
    let step: f32 = raw.parse().map_err(|e| format!("`{raw}` is not a number: {e}"))?;
    if !(step.is_finite() && step > 0.0) {
        return Err(format!("step must be positive, got {step}"));
    }

    let per_axis = (2.0 / step as f64).floor() + 1.0;
    if per_axis.powi(3) > PointSet::MAX_POINTS as f64 {
        return Err(format!(
            "step {step} yields more than {} points",
            PointSet::MAX_POINTS
        ));
    }
    Ok(step)
}

impl Args {
    fn scene(&self) -> Scene {
        match self.points {
            Points::None => Scene::GridOnly,
            Points::Corners => Scene::PointCloud(PointSet::CubeCorners),
            Points::Dense => Scene::PointCloud(PointSet::DenseCube { step: self.step }),
        }
    }

    fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            fov_factor: self.fov,
            camera: Vec3::new(0.0, 0.0, self.camera_z),
            rotation_speed: self.speed,
            rotation_axes: self.axes.iter().copied().map(Axis::from).collect(),
            grid: GridStyle {
                spacing: self.grid,
                pattern: if self.dots {
                    GridPattern::Dots { size: 3.0 }
                } else {
                    GridPattern::Lines
                },
                ..defaults.grid
            },
            ..defaults
        }
    }
}

struct Studio {
    scene: Scene,
    config: EngineConfig,
    engine: Option<Engine<WindowCanvas, WindowFrames>>,
}

impl App for Studio {
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> Result<()> {
        let canvas_id = ctx.canvas_id().to_owned();
        let frames = ctx.frames();

        let mut engine = Engine::new(
            &mut *ctx.host,
            &canvas_id,
            frames,
            self.scene,
            self.config.clone(),
        )?;
        engine.init();

        self.engine = Some(engine);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &FrameCtx) -> AppControl {
        if let Some(engine) = self.engine.as_mut() {
            engine.on_frame(ctx.timestamp);
        }
        AppControl::Continue
    }

    fn on_exit(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    let scene = args.scene();
    log::info!("starting lumen-studio with {scene:?}");

    let app = Studio {
        scene,
        config: args.engine_config(),
        engine: None,
    };

    Runtime::run(
        RuntimeConfig {
            title: "lumen studio".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        app,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let args = Args::parse_from(["lumen-studio"]);
        assert_eq!(args.scene(), Scene::PointCloud(PointSet::CubeCorners));
        assert_eq!(args.engine_config(), EngineConfig::default());
    }

    #[test]
    fn flags_reach_the_engine_config() {
        let args = Args::parse_from([
            "lumen-studio",
            "--points",
            "dense",
            "--step",
            "0.5",
            "--axes",
            "x,z",
            "--camera-z",
            "-2",
            "--dots",
        ]);
        assert_eq!(args.scene(), Scene::PointCloud(PointSet::DenseCube { step: 0.5 }));

        let config = args.engine_config();
        assert_eq!(config.rotation_axes, vec![Axis::X, Axis::Z]);
        assert_eq!(config.camera, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(config.grid.pattern, GridPattern::Dots { size: 3.0 });
    }

    #[test]
    fn step_is_validated() {
        for bad in ["0", "1e-7", "0.001", "nan", "inf", "abc"] {
            assert!(
                Args::try_parse_from(["lumen-studio", "--step", bad]).is_err(),
                "accepted --step {bad}"
            );
        }
        let args = Args::try_parse_from(["lumen-studio", "--step", "0.02"]).unwrap();
        assert_eq!(args.step, 0.02);
    }
}
