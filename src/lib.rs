//! Render-on-demand viewer for a 2x2x2 grid of translucent cubes.
//!
//! The crate is split so that everything except the GPU and window layers
//! runs headless: scene construction, the orbit camera controller and the
//! frame scheduler are plain data plus logic, and are tested without a
//! display. [`render`] and [`app`] plug them into wgpu and winit, on the
//! desktop and in the browser alike.

pub mod app;
pub mod camera;
pub mod color;
pub mod config;
pub mod controls;
pub mod input;
pub mod render;
pub mod scene;
pub mod scheduler;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{ViewerApp, WindowInitError};
pub use camera::PerspectiveCamera;
pub use color::{hsl_to_rgb, parse_color, ColorError};
pub use config::ViewerConfig;
pub use controls::OrbitControls;
pub use input::{MouseButton, PointerEvent};
pub use render::{RenderError, Renderer};
pub use scene::{build_cube_grid, Scene};
pub use scheduler::{FrameHost, FrameRenderer, FrameScheduler, FrameState};
