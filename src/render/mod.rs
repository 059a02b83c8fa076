//! GPU rendering for the cube scene.

mod common;
mod renderer;
mod shared;

use thiserror::Error;

pub use renderer::Renderer;

/// Failure to produce a frame on the window surface.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("surface was lost or is outdated")]
    SurfaceLost,
    #[error("timed out waiting for the next surface texture")]
    Timeout,
    #[error("GPU is out of memory")]
    OutOfMemory,
    #[error("surface reported an unexpected error")]
    Other,
}

impl RenderError {
    /// Whether the next frame may succeed without recreating the renderer.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SurfaceLost | Self::Timeout)
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::SurfaceLost,
            wgpu::SurfaceError::Timeout => Self::Timeout,
            wgpu::SurfaceError::OutOfMemory => Self::OutOfMemory,
            #[allow(unreachable_patterns)]
            _ => Self::Other,
        }
    }
}
