use anyhow::Result;
use clap::Parser;
use glam::Vec3;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use viewloop_camera::{OrbitControls, PerspectiveCamera};
use viewloop_render_wgpu::WgpuRenderer;
use viewloop_scene::{Drift, Scene, Spin};
use viewloop_viewport::{
    Host, HostEvent, InstantClock, ViewerConfig, ViewportContext, ViewportLoop, ViewportSize,
};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "viewloop-desktop", about = "Orbit viewer driven by the viewport loop")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

type DesktopLoop = ViewportLoop<Scene, PerspectiveCamera, WgpuRenderer, OrbitControls, InstantClock>;

/// Exposes a winit window to the loop. Sizes are reported in logical pixels.
struct WindowHost<'a>(&'a Window);

impl Host for WindowHost<'_> {
    fn window_size(&self) -> ViewportSize {
        let logical: LogicalSize<f64> = self.0.inner_size().to_logical(self.0.scale_factor());
        ViewportSize::new(logical.width.round() as u32, logical.height.round() as u32)
    }

    fn device_pixel_density(&self) -> f64 {
        self.0.scale_factor()
    }

    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

/// Pointer state for orbit input.
#[derive(Default)]
struct Pointer {
    position: Option<PhysicalPosition<f64>>,
    rotating: bool,
    panning: bool,
}

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    viewer: Option<DesktopLoop>,
    pointer: Pointer,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            viewer: None,
            pointer: Pointer::default(),
        }
    }

    fn build_loop(&self, window: Arc<Window>) -> Result<DesktopLoop> {
        let size = window.inner_size();
        let renderer = pollster::block_on(WgpuRenderer::new(window, size.width, size.height))?;

        let aspect = size.width as f32 / size.height.max(1) as f32;
        let camera = PerspectiveCamera::from_config(&self.config.camera, aspect);
        let controls =
            OrbitControls::from_config(&self.config.controls, Vec3::from_array(self.config.camera.target));

        let scene = Scene::demo();
        let hooks: Vec<_> = ["left", "center", "right"]
            .iter()
            .zip([0.5_f32, 1.0, 1.5])
            .filter_map(|(name, rate)| scene.find(name).map(|id| (id, rate)))
            .collect();
        let center = scene.find("center");

        let mut viewer = ViewportLoop::new(
            ViewportContext::with_controls(scene, camera, renderer, controls),
            InstantClock::new(),
            &self.config.viewport,
        );
        for (id, rate) in hooks {
            viewer.add_update(Spin::new(id, Vec3::new(rate, rate, 0.0)).into_hook());
        }
        if let Some(id) = center {
            viewer.add_update(Drift::new(id, 0.25, 0.8).into_hook());
        }
        Ok(viewer)
    }

    fn dispatch(&mut self, event: HostEvent) {
        let (Some(window), Some(viewer)) = (&self.window, &mut self.viewer) else {
            return;
        };
        let mut host = WindowHost(window);
        if let Err(e) = viewer.handle(event, &mut host) {
            tracing::error!("viewport loop halted: {e}");
        }
    }

    /// Keep the swapchain at the window's physical size. The loop only sees
    /// logical sizes.
    fn resize_surface(&mut self) {
        if let (Some(window), Some(viewer)) = (&self.window, &mut self.viewer) {
            let size = window.inner_size();
            viewer
                .context_mut()
                .renderer
                .resize_surface(size.width, size.height);
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        let last = self.pointer.position.replace(position);
        let (Some(last), Some(window), Some(viewer)) = (last, &self.window, &mut self.viewer)
        else {
            return;
        };
        let Some(controls) = viewer.context_mut().controls.as_mut() else {
            return;
        };

        let dx = (position.x - last.x) as f32;
        let dy = (position.y - last.y) as f32;
        let height = window.inner_size().height as f32;
        if self.pointer.rotating {
            controls.rotate_by_pixels(dx, dy, height);
        } else if self.pointer.panning {
            let height = height.max(1.0);
            controls.pan(dx / height, dy / height);
        }
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let steps = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
        };
        if let Some(controls) = self
            .viewer
            .as_mut()
            .and_then(|v| v.context_mut().controls.as_mut())
        {
            controls.zoom(steps);
        }
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(viewer) = &mut self.viewer {
            viewer.stop();
            tracing::info!(frames = viewer.frames(), "closing");
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut viewer = match self.build_loop(window.clone()) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("failed to initialize renderer: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = viewer.start(&mut WindowHost(&window)) {
            tracing::error!("viewport loop failed to start: {e}");
        }

        self.window = Some(window);
        self.viewer = Some(viewer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.close(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.close(event_loop),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize_surface();
                self.dispatch(HostEvent::Resized);
            }
            WindowEvent::RedrawRequested => self.dispatch(HostEvent::Frame),
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.pointer.rotating = pressed,
                    MouseButton::Right | MouseButton::Middle => self.pointer.panning = pressed,
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor(position),
            WindowEvent::CursorLeft { .. } => self.pointer.position = None,
            WindowEvent::MouseWheel { delta, .. } => self.handle_wheel(delta),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    tracing::info!("viewloop-desktop starting");

    let event_loop = EventLoop::new()?;
    // Frames are requested by the loop itself.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
