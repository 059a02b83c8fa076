use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Vec3};
use log::warn;

use crate::camera::PerspectiveCamera;
use crate::scene::{DirectionalLight, Mesh};

/// Lights beyond this count are ignored by the shader.
pub(crate) const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct LightUniform {
    /// Towards the light, `w` unused.
    pub direction: [f32; 4],
    /// Color premultiplied by intensity, `w` unused.
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub light_count: [u32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl GlobalUniform {
    pub fn new(camera: &PerspectiveCamera, lights: &[DirectionalLight]) -> Self {
        if lights.len() > MAX_LIGHTS {
            warn!(
                "scene has {} lights; only the first {MAX_LIGHTS} are shaded",
                lights.len()
            );
        }
        let mut packed = [LightUniform::default(); MAX_LIGHTS];
        for (slot, light) in packed.iter_mut().zip(lights) {
            *slot = LightUniform {
                direction: light.direction().extend(0.0).into(),
                color: (light.color * light.intensity).extend(1.0).into(),
            };
        }
        let count = lights.len().min(MAX_LIGHTS) as u32;
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).into(),
            light_count: [count, 0, 0, 0],
            lights: packed,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct ObjectConstants {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    /// Diffuse color with opacity in `w`.
    pub color: [f32; 4],
    /// Specular color with shininess in `w`.
    pub specular: [f32; 4],
}

impl ObjectConstants {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let model = mesh.model_matrix();
        let normal = Mat3::from_mat4(model).inverse().transpose();
        let material = &mesh.material;
        Self {
            model: model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal),
            color: material.color.extend(material.opacity).into(),
            specular: material.specular.extend(material.shininess).into(),
        }
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

pub(crate) fn clear_color(background: Vec3) -> wgpu::Color {
    wgpu::Color {
        r: background.x as f64,
        g: background.y as f64,
        b: background.z as f64,
        a: 1.0,
    }
}
