//! Platform layer: windowing, event loop and the per-frame sequence
//! (input → camera → draw → present).
//!
//! - One window, cursor grabbed and hidden for mouse look.
//! - Continuous redraws (`ControlFlow::Poll`), delta time from `Instant`.
//! - A lost/outdated surface is reconfigured and the frame skipped.

pub mod demo;
pub mod input;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use renderer::{Gpu, PolygonMode, RenderError, WgpuBackend};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

use crate::demo::{CLEAR_COLOR, Demo, DemoConfig};
use crate::input::InputState;

/// Everything the binary decides before the window opens.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub backends: wgpu::Backends,
    pub show_fps: bool,
    pub width: u32,
    pub height: u32,
    pub assets_dir: PathBuf,
    pub model: Option<PathBuf>,
    pub flip_uvs: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            show_fps: false,
            width: 800,
            height: 600,
            assets_dir: PathBuf::from("assets"),
            model: None,
            flip_uvs: false,
        }
    }
}

/// Open the window and run the demo until it is closed or Escape is pressed.
pub fn run_with_renderer(config: RunConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Counts frames and reports once per `period`.
#[derive(Debug)]
pub struct FpsCounter {
    period: Duration,
    window_start: Instant,
    frames: u32,
}

impl FpsCounter {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            window_start: now,
            frames: 0,
        }
    }

    /// Count one frame; returns frames per second when a period has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.period {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.window_start = now;
        self.frames = 0;
        Some(fps)
    }
}

struct App {
    config: RunConfig,
    window: Option<Arc<Window>>,
    gpu: Option<WgpuBackend>,
    demo: Option<Demo>,
    input: InputState,
    last_frame: Option<Instant>,
    fps: FpsCounter,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: RunConfig) -> Self {
        Self {
            config,
            window: None,
            gpu: None,
            demo: None,
            input: InputState::new(),
            last_frame: None,
            fps: FpsCounter::new(Duration::from_secs(1), Instant::now()),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("Phong3D")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );
        grab_cursor(&window);

        let mut gpu = pollster::block_on(WgpuBackend::new(window.clone(), self.config.backends))
            .context("failed to initialise renderer")?;
        gpu.set_clear_color(CLEAR_COLOR, CLEAR_COLOR, CLEAR_COLOR);

        let demo = Demo::new(
            &mut gpu,
            &DemoConfig {
                assets_dir: self.config.assets_dir.clone(),
                model: self.config.model.clone(),
                flip_uvs: self.config.flip_uvs,
            },
        )?;

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.demo = Some(demo);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(demo)) = (self.gpu.as_mut(), self.demo.as_mut()) else {
            return;
        };

        let now = Instant::now();
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame = Some(now);

        let actions = self.input.update(demo.camera_mut(), dt);
        if actions.quit {
            log::info!("Escape pressed. Exiting event loop.");
            event_loop.exit();
            return;
        }
        if let Some(wireframe) = actions.wireframe {
            gpu.set_polygon_mode(if wireframe {
                PolygonMode::Line
            } else {
                PolygonMode::Fill
            });
        }

        demo.update(dt);

        gpu.begin_frame();
        let aspect = gpu.aspect();
        demo.draw(gpu, aspect);
        match gpu.end_frame() {
            Ok(()) => {}
            Err(e) if WgpuBackend::is_surface_lost(&e) => {
                log::warn!("Surface lost/outdated. Reconfiguring...");
                gpu.recreate_surface();
            }
            Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                log::warn!("Surface timeout; skipping frame");
            }
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("frame failed"));
                return;
            }
        }

        if self.config.show_fps {
            if let Some(fps) = self.fps.tick(now) {
                log::info!("FPS: {:.1}", fps);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                log::info!("Resized: {}x{}", width, height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(width, height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.input.on_key(code, state),
            WindowEvent::MouseWheel { delta, .. } => self.input.on_scroll(delta),
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.on_mouse_motion(dx, dy);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Locked where supported (Wayland, macOS), otherwise confined (X11, Windows).
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        log::warn!("Cursor grab unavailable: {e}");
    }
    window.set_cursor_visible(false);
}
