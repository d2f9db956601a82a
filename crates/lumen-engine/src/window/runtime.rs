use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::{Vec2, Viewport};
use crate::core::{App, AppControl, FrameCtx, StartCtx};
use crate::device::{FrameOutcome, Gpu, GpuInit};
use crate::paint::Color;
use crate::render::{tessellate, SolidRenderer, SolidVertex};

use super::{WindowFrames, WindowHost};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Id under which the window canvas is registered on the [`WindowHost`].
    pub canvas_id: String,
    /// Window clear color; `clear_rect` resets to this.
    pub clear: Color,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            initial_size: LogicalSize::new(960.0, 640.0),
            canvas_id: "lumen".to_string(),
            clear: Color::black(),
        }
    }
}

/// Entry point for the native runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until it exits or the window closes.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.failure.map_or(Ok(()), Err)
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    host: WindowHost,
    frames: WindowFrames,

    renderer: SolidRenderer,
    vertices: Vec<SolidVertex>,

    started_at: Instant,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A: App> AppState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        let host = WindowHost::new(config.canvas_id.clone());
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            host,
            frames: WindowFrames::new(),
            renderer: SolidRenderer::new(),
            vertices: Vec::new(),
            started_at: Instant::now(),
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if !self.exit_requested {
            self.exit_requested = true;
            self.app.on_exit();
        }
        self.entry = None;
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialisation failed")?;

        self.entry = Some(entry);
        self.sync_layout();
        Ok(())
    }

    /// Pushes the window's logical size and scale factor into the canvas.
    fn sync_layout(&self) {
        let Some(entry) = self.entry.as_ref() else { return };
        let window = entry.borrow_window();
        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale);
        self.host.canvas().set_layout(
            Vec2::new(logical.width as f32, logical.height as f32),
            scale as f32,
        );
    }

    fn request_redraw_if_pending(&self) {
        if !self.frames.is_pending() {
            return;
        }
        if let Some(entry) = self.entry.as_ref() {
            entry.borrow_window().request_redraw();
        }
    }

    fn run_frame(&mut self) -> AppControl {
        if !self.frames.fire_all() {
            return AppControl::Continue;
        }
        let Some(entry) = self.entry.as_ref() else {
            return AppControl::Continue;
        };

        let window = entry.borrow_window();
        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale);

        let ctx = FrameCtx {
            timestamp: self.started_at.elapsed().as_secs_f64(),
            viewport: Viewport::new(logical.width as f32, logical.height as f32),
            scale_factor: scale as f32,
        };
        self.app.on_frame(&ctx)
    }

    fn present(&mut self) -> AppControl {
        let clear = self.config.clear;
        let (entry, renderer, vertices, canvas) = (
            &mut self.entry,
            &mut self.renderer,
            &mut self.vertices,
            self.host.canvas(),
        );
        let Some(entry) = entry.as_mut() else {
            return AppControl::Continue;
        };

        entry.with_mut(|fields| {
            let outcome = fields.gpu.render_frame(fields.window, |gpu, frame| {
                let linear_output = gpu.surface_format().is_srgb();
                vertices.clear();
                canvas.with_display_list(|list| tessellate(list, clear, linear_output, vertices));
                renderer.render(gpu, frame, clear, vertices.as_slice());
            });

            match outcome {
                FrameOutcome::Fatal => AppControl::Exit,
                FrameOutcome::Presented | FrameOutcome::Reconfigured | FrameOutcome::Skipped => {
                    AppControl::Continue
                }
            }
        })
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        let started = {
            let mut ctx = StartCtx::new(&mut self.host, &self.frames);
            self.app.on_start(&mut ctx)
        };
        if let Err(e) = started {
            self.fail(event_loop, e.context("application failed to start"));
            return;
        }

        log::info!("runtime started");
        // Draw once even when the app never requests a frame.
        if let Some(entry) = self.entry.as_ref() {
            entry.borrow_window().request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);
        self.request_redraw_if_pending();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.borrow_window().request_redraw();
                }
                self.sync_layout();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.borrow_window().inner_size();
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.borrow_window().request_redraw();
                }
                self.sync_layout();
            }

            WindowEvent::RedrawRequested => {
                if self.run_frame() == AppControl::Exit || self.present() == AppControl::Exit {
                    self.shutdown(event_loop);
                }
            }

            _ => {}
        }
    }
}
