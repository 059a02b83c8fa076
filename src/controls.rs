//! Orbit-style camera controller.
//!
//! The camera orbits `target` on a sphere. Dragging with the primary button
//! rotates, the secondary button pans, and the wheel or middle button dollies.
//! Input only accumulates deltas; [`OrbitControls::update`] applies them to
//! the camera and reports whether it moved. A `true` return is the change
//! notification that drives the render-on-demand scheduler.
//!
//! The camera's up vector is assumed to be +Y.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::config::ControlsConfig;
use crate::input::{MouseButton, PointerEvent};

const EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Dolly,
    Pan,
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    delta_theta: f32,
    delta_phi: f32,
    pan_offset: Vec3,
    scale: f32,

    cursor: Option<Vec2>,
    drag: Option<DragMode>,

    last_position: Vec3,
    last_target: Vec3,
}

impl OrbitControls {
    pub fn new(camera: &PerspectiveCamera, config: &ControlsConfig) -> Self {
        Self {
            target: camera.target(),
            enable_damping: config.damping,
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            cursor: None,
            drag: None,
            last_position: camera.position,
            last_target: camera.target(),
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Moves the orbit center. Takes effect on the next [`OrbitControls::update`].
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Feeds one pointer event into the controller.
    ///
    /// Returns true when the event queued camera motion, in which case the
    /// caller should run [`OrbitControls::update`].
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        camera: &PerspectiveCamera,
        viewport: (u32, u32),
    ) -> bool {
        let height = viewport.1.max(1) as f32;
        match event {
            PointerEvent::Pressed(button) => {
                self.drag = match button {
                    MouseButton::LEFT => Some(DragMode::Rotate),
                    MouseButton::MIDDLE => Some(DragMode::Dolly),
                    MouseButton::RIGHT => Some(DragMode::Pan),
                    _ => self.drag,
                };
                false
            }
            PointerEvent::Released(_) => {
                self.drag = None;
                false
            }
            PointerEvent::Moved(position) => {
                let previous = self.cursor.replace(position);
                let (Some(mode), Some(previous)) = (self.drag, previous) else {
                    return false;
                };
                let delta = position - previous;
                if delta == Vec2::ZERO {
                    return false;
                }
                match mode {
                    DragMode::Rotate => {
                        let delta = delta * self.rotate_speed;
                        self.rotate_left(TAU * delta.x / height);
                        self.rotate_up(TAU * delta.y / height);
                    }
                    DragMode::Dolly => self.dolly_by_sign(delta.y),
                    DragMode::Pan => {
                        self.pan(delta * self.pan_speed, camera, height);
                    }
                }
                true
            }
            PointerEvent::Wheel(delta_y) => {
                if delta_y == 0.0 {
                    return false;
                }
                self.dolly_by_sign(-delta_y);
                true
            }
        }
    }

    /// Applies accumulated motion to `camera`.
    ///
    /// Returns true when the camera position or the target moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        let mut spherical = Spherical::from_offset(camera.position - self.target);
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let moved = self.last_position.distance_squared(camera.position) > EPS
            || self.last_target.distance_squared(self.target) > EPS;
        if moved {
            self.last_position = camera.position;
            self.last_target = self.target;
        }
        moved
    }

    fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Positive `direction` moves towards the target.
    fn dolly_by_sign(&mut self, direction: f32) {
        if direction > 0.0 {
            self.scale *= self.zoom_scale();
        } else if direction < 0.0 {
            self.scale /= self.zoom_scale();
        }
    }

    fn pan(&mut self, delta: Vec2, camera: &PerspectiveCamera, height: f32) {
        let distance = (camera.position - self.target).length();
        let target_distance = distance * (camera.fov.to_radians() / 2.0).tan();
        let left = 2.0 * delta.x * target_distance / height;
        let up = 2.0 * delta.y * target_distance / height;
        self.pan_offset += camera.right() * -left;
        self.pan_offset += camera.camera_up() * up;
    }
}
