use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;

/// Perspective camera looking at an explicit target point.
///
/// The projection matrix is cached; call [`PerspectiveCamera::update_projection_matrix`]
/// after changing `fov`, `aspect`, `near` or `far`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub up: Vec3,
    target: Vec3,
    #[serde(skip)]
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            up: Vec3::Y,
            target: Vec3::NEG_Z,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(config.fov, config.aspect, config.near, config.far);
        camera.position = Vec3::new(0.0, 0.0, config.distance);
        camera.look_at(Vec3::ZERO);
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect.max(0.01),
            self.near,
            self.far,
        );
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Camera-space +X expressed in world space.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    /// Camera-space +Y expressed in world space.
    pub fn camera_up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_demo_camera_looks_at_origin() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default());
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(camera.target(), Vec3::ZERO);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.right() - Vec3::X).length() < 1e-6);
        assert!((camera.camera_up() - Vec3::Y).length() < 1e-6);

        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin.z + 4.0).abs() < 1e-5);
    }

    #[test]
    fn projection_tracks_aspect_after_update() {
        let mut camera = PerspectiveCamera::new(75.0, 2.0, 0.1, 25.0);
        let before = camera.projection_matrix();
        camera.aspect = 1.0;
        assert_eq!(camera.projection_matrix(), before);
        camera.update_projection_matrix();
        assert_ne!(camera.projection_matrix(), before);
        // x scale is f / aspect, y scale is f
        let m = camera.projection_matrix();
        assert!((m.x_axis.x - m.y_axis.y).abs() < 1e-6);
    }

    #[test]
    fn points_inside_frustum_land_in_clip_range() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default());
        let clip = camera.view_projection().project_point3(Vec3::new(0.8, 0.8, 0.8));
        assert!(clip.x.abs() <= 1.0 && clip.y.abs() <= 1.0);
        assert!((0.0..=1.0).contains(&clip.z));
    }
}
