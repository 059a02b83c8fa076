//! Window event handling shared by the desktop binary and the web entry point.

use std::sync::Arc;

use anyhow::anyhow;
use glam::{Vec2, Vec3};
use log::error;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::camera::PerspectiveCamera;
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::input::{map_button_event, map_scroll, PointerEvent};
use crate::render::Renderer;
use crate::scene::Scene;
use crate::scheduler::{FrameHost, FrameScheduler};

/// Frame host backed by winit redraw requests.
pub struct WindowFrameHost(Arc<Window>);

impl FrameHost for WindowFrameHost {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

pub type WindowScheduler = FrameScheduler<WindowFrameHost, Renderer>;

/// The platform could not give us an event loop or a window.
#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
pub struct WindowInitError {
    stage: &'static str,
    message: String,
}

impl WindowInitError {
    pub fn from_error(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_panic(stage: &'static str, panic: Box<dyn std::any::Any + Send>) -> Self {
        let message = match panic.downcast::<String>() {
            Ok(msg) => *msg,
            Err(panic) => match panic.downcast::<&'static str>() {
                Ok(msg) => (*msg).to_string(),
                Err(_) => "unknown panic".into(),
            },
        };
        Self { stage, message }
    }
}

/// Interactive viewer driven by winit.
pub struct ViewerApp {
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    config: ViewerConfig,
    scheduler: Option<WindowScheduler>,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    /// Creates an app that opens its window on the first `resumed` event.
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            scheduler: None,
            error: None,
        }
    }

    /// Creates an app around a window and renderer that already exist.
    pub fn with_renderer(
        config: ViewerConfig,
        window: Arc<Window>,
        renderer: Renderer,
        scene: Scene,
    ) -> Self {
        let scheduler = build_scheduler(&config, window, renderer, scene);
        Self {
            config,
            scheduler: Some(scheduler),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        use winit::dpi::LogicalSize;

        let attributes = Window::default_attributes()
            .with_title("Translucent Cubes")
            .with_inner_size(LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );
        let scene = crate::scene::build_cube_grid(&self.config);
        let renderer = pollster::block_on(Renderer::new(Arc::clone(&window), &scene))?;
        self.scheduler = Some(build_scheduler(&self.config, window, renderer, scene));
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.scheduler.is_some() {
            return;
        }
        #[cfg(not(target_arch = "wasm32"))]
        if let Err(err) = self.open_window(event_loop) {
            self.fail(event_loop, err);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = event_loop;
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(scheduler) = self.scheduler.as_mut() else {
            return;
        };
        if window_id != scheduler.renderer().window_id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                scheduler.handle_resize();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                scheduler.handle_pointer(map_button_event(state, button));
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                scheduler.handle_pointer(PointerEvent::Moved(position));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                scheduler.handle_pointer(map_scroll(delta));
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = scheduler.frame() {
                    if let Err(fatal) = scheduler.recover(err) {
                        self.fail(event_loop, anyhow!(fatal));
                    }
                }
            }
            _ => {}
        }
    }
}

fn build_scheduler(
    config: &ViewerConfig,
    window: Arc<Window>,
    renderer: Renderer,
    scene: Scene,
) -> WindowScheduler {
    let mut camera = PerspectiveCamera::from_config(&config.camera);
    let size = window.inner_size();
    if size.width > 0 && size.height > 0 {
        camera.aspect = size.width as f32 / size.height as f32;
        camera.update_projection_matrix();
    }

    let mut controls = OrbitControls::new(&camera, &config.controls);
    controls.set_target(Vec3::ZERO);
    controls.update(&mut camera);

    let mut scheduler =
        FrameScheduler::new(WindowFrameHost(window), renderer, scene, camera, controls);
    scheduler.start();
    scheduler
}

/// Runs the interactive viewer until the window closes.
#[cfg(not(target_arch = "wasm32"))]
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    use std::panic::{self, AssertUnwindSafe};
    use winit::event_loop::{ControlFlow, EventLoop};

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
