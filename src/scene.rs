use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::color::{hex_to_rgb, hsl_to_rgb};
use crate::config::ViewerConfig;

/// Everything drawn in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Scene {
    pub background: Vec3,
    pub lights: Vec<DirectionalLight>,
    pub geometries: Vec<Geometry>,
    pub meshes: Vec<Mesh>,
    pub cubes: Vec<CubeInstance>,
}

impl Scene {
    pub fn new(background: Vec3) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn add_light(&mut self, light: DirectionalLight) {
        self.lights.push(light);
    }

    /// Mesh indices in the order they must be drawn for the given view.
    ///
    /// Opaque meshes keep insertion order. Transparent meshes follow, sorted
    /// far to near by view-space depth. The sort is stable, so meshes at the
    /// same position keep their insertion order (back faces before front
    /// faces).
    pub fn draw_order(&self, view: Mat4) -> Vec<usize> {
        let (mut transparent, opaque): (Vec<usize>, Vec<usize>) =
            (0..self.meshes.len()).partition(|&index| self.meshes[index].material.transparent);

        let depth = |index: &usize| view.transform_point3(self.meshes[*index].position).z;
        transparent.sort_by(|a, b| depth(a).total_cmp(&depth(b)));

        opaque.into_iter().chain(transparent).collect()
    }

    /// Human readable description, one line per cube.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Built scene with {} cubes ({} meshes, {} lights)",
            self.cubes.len(),
            self.meshes.len(),
            self.lights.len()
        )];
        for (index, cube) in self.cubes.iter().enumerate() {
            lines.push(format!(
                " - cube {index} pos=({:.2}, {:.2}, {:.2}) color=({:.2}, {:.2}, {:.2})",
                cube.position.x,
                cube.position.y,
                cube.position.z,
                cube.color.x,
                cube.color.y,
                cube.color.z
            ));
        }
        lines
    }
}

/// Index of a geometry inside [`Scene::geometries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeometryId(pub usize);

/// Indexed triangle list. Vertices are laid out as `position.xyz` followed by
/// `normal.xyz`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub const STRIDE: usize = 6;

    /// Axis-aligned box centered on the origin, four vertices per face so
    /// every face gets a flat normal. Triangles wind counter-clockwise seen
    /// from outside.
    pub fn cuboid(size: Vec3) -> Self {
        let half = size * 0.5;
        // (normal, u, v) with u x v == normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(faces.len() * 4 * Self::STRIDE);
        let mut indices = Vec::with_capacity(faces.len() * 6);
        for (face, (normal, u, v)) in faces.into_iter().enumerate() {
            let center = normal * half;
            let u = u * half;
            let v = v * half;
            for corner in [center - u - v, center + u - v, center + u + v, center - u + v] {
                vertices.extend_from_slice(&corner.to_array());
                vertices.extend_from_slice(&normal.to_array());
            }
            let base = (face * 4) as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[vertex * Self::STRIDE..])
    }

    pub fn normal(&self, vertex: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[vertex * Self::STRIDE + 3..])
    }
}

/// Which faces of a mesh are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Phong material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Vec3,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Material {
    pub fn phong(color: Vec3) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            specular: hex_to_rgb(0x111111),
            shininess: 30.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = true;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}

/// One draw call: a shared geometry with its own material and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub geometry: GeometryId,
    pub material: Material,
    pub position: Vec3,
}

impl Mesh {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }
}

/// Light shining from `position` towards `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing from the lit surface towards the light.
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }
}

/// Placement and color of one grid cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeInstance {
    pub position: Vec3,
    pub color: Vec3,
}

/// Cube centers in the order the grid is populated.
pub fn cube_positions(spacing: f32) -> [Vec3; 8] {
    let d = spacing;
    [
        Vec3::new(-d, -d, -d),
        Vec3::new(d, -d, -d),
        Vec3::new(-d, d, -d),
        Vec3::new(d, d, -d),
        Vec3::new(-d, -d, d),
        Vec3::new(d, -d, d),
        Vec3::new(-d, d, d),
        Vec3::new(d, d, d),
    ]
}

/// Builds the 2x2x2 grid of translucent cubes.
///
/// Every cube is added twice, back faces first, so the inside of each cube
/// shows through its front faces.
pub fn build_cube_grid(config: &ViewerConfig) -> Scene {
    let mut scene = Scene::new(config.background);

    for light in &config.lights {
        scene.add_light(DirectionalLight {
            color: light.color,
            intensity: light.intensity,
            position: light.position,
            target: Vec3::ZERO,
        });
    }

    let grid = &config.grid;
    let geometry = scene.add_geometry(Geometry::cuboid(grid.box_size));
    let positions = cube_positions(grid.spacing);
    let count = positions.len() as f32;

    for (index, position) in positions.into_iter().enumerate() {
        let color = hsl_to_rgb(index as f32 / count, grid.saturation, grid.lightness);
        let material = Material::phong(color).with_opacity(grid.opacity);
        for side in [Side::Back, Side::Front] {
            scene.add_mesh(Mesh {
                name: format!("cube-{index}-{side:?}").to_lowercase(),
                geometry,
                material: material.with_side(side),
                position,
            });
        }
        scene.cubes.push(CubeInstance { position, color });
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::config::CameraConfig;

    #[test]
    fn grid_has_two_meshes_per_cube() {
        let scene = build_cube_grid(&ViewerConfig::default());
        assert_eq!(scene.cubes.len(), 8);
        assert_eq!(scene.meshes.len(), 16);
        assert_eq!(scene.geometries.len(), 1);
        assert_eq!(scene.lights.len(), 2);

        for (cube, pair) in scene.cubes.iter().zip(scene.meshes.chunks(2)) {
            let (back, front) = (&pair[0], &pair[1]);
            assert_eq!(back.geometry, front.geometry);
            assert_eq!(back.position, cube.position);
            assert_eq!(front.position, cube.position);
            assert_eq!(back.material.side, Side::Back);
            assert_eq!(front.material.side, Side::Front);
            assert_eq!(back.material.with_side(Side::Front), front.material);
            assert!(front.material.transparent);
            assert_eq!(front.material.opacity, 0.5);
            assert_eq!(front.material.color, cube.color);
        }
    }

    #[test]
    fn cubes_occupy_every_octant_with_distinct_hues() {
        let scene = build_cube_grid(&ViewerConfig::default());
        for cube in &scene.cubes {
            assert!(cube.position.abs().abs_diff_eq(Vec3::splat(0.8), 1e-6));
        }
        for (i, a) in scene.cubes.iter().enumerate() {
            for b in &scene.cubes[i + 1..] {
                assert_ne!(a.position, b.position);
                assert!((a.color - b.color).length() > 0.1);
            }
        }
        assert!(scene.cubes[0].color.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn cuboid_faces_wind_outward() {
        let geometry = Geometry::cuboid(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(geometry.vertex_count(), 24);
        assert_eq!(geometry.indices.len(), 36);

        for triangle in geometry.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| geometry.position(triangle[i] as usize));
            let face_normal = (b - a).cross(c - a).normalize();
            let normal = geometry.normal(triangle[0] as usize);
            assert!(face_normal.abs_diff_eq(normal, 1e-5), "{face_normal} vs {normal}");
            // outward: centroid lies on the side the normal points to
            assert!(((a + b + c) / 3.0).dot(normal) > 0.0);
        }

        let max = (0..geometry.vertex_count())
            .map(|i| geometry.position(i))
            .fold(Vec3::ZERO, |acc, p| acc.max(p));
        assert_eq!(max, Vec3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn transparent_meshes_draw_far_to_near_back_faces_first() {
        let scene = build_cube_grid(&ViewerConfig::default());
        let camera = PerspectiveCamera::from_config(&CameraConfig::default());
        let order = scene.draw_order(camera.view_matrix());
        assert_eq!(order.len(), 16);

        let depths: Vec<f32> = order
            .iter()
            .map(|&i| camera.view_matrix().transform_point3(scene.meshes[i].position).z)
            .collect();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));

        for pair in order.chunks(2) {
            assert_eq!(scene.meshes[pair[0]].position, scene.meshes[pair[1]].position);
            assert_eq!(scene.meshes[pair[0]].material.side, Side::Back);
            assert_eq!(scene.meshes[pair[1]].material.side, Side::Front);
        }
        // the far layer (z = -0.8) comes first
        assert!(scene.meshes[order[0]].position.z < 0.0);
    }

    #[test]
    fn opaque_meshes_come_before_transparent_ones() {
        let mut scene = Scene::new(Vec3::ONE);
        let geometry = scene.add_geometry(Geometry::cuboid(Vec3::ONE));
        scene.add_mesh(Mesh {
            name: "glass".into(),
            geometry,
            material: Material::phong(Vec3::ONE).with_opacity(0.5),
            position: Vec3::new(0.0, 0.0, -5.0),
        });
        scene.add_mesh(Mesh {
            name: "solid".into(),
            geometry,
            material: Material::phong(Vec3::ONE),
            position: Vec3::new(0.0, 0.0, 2.0),
        });
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(scene.draw_order(view), vec![1, 0]);
    }

    #[test]
    fn light_direction_points_at_light() {
        let scene = build_cube_grid(&ViewerConfig::default());
        let dir = scene.lights[0].direction();
        assert!(dir.abs_diff_eq(Vec3::new(-1.0, 2.0, 4.0).normalize(), 1e-6));
    }

    #[test]
    fn summary_lists_every_cube() {
        let lines = build_cube_grid(&ViewerConfig::default()).summary_lines();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "Built scene with 8 cubes (16 meshes, 2 lights)");
        assert_eq!(
            lines[1],
            " - cube 0 pos=(-0.80, -0.80, -0.80) color=(1.00, 0.00, 0.00)"
        );
    }
}
