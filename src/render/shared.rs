/// Blinn-Phong shading for translucent meshes lit by directional lights.
///
/// Back faces flip their normal so the inner walls of a cube are lit like
/// the outer ones.
pub(crate) const SHADER: &str = r#"
const MAX_LIGHTS: u32 = 4u;

struct Light {
    direction: vec4<f32>,
    color: vec4<f32>,
}

struct GlobalUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    light_count: vec4<u32>,
    lights: array<Light, 4>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    specular: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;

    let world_normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;

    out.normal = normalize(world_normal);
    return out;
}

@fragment
fn fs_main(input: VertexOutput, @builtin(front_facing) front_facing: bool) -> @location(0) vec4<f32> {
    var normal = normalize(input.normal);
    if (!front_facing) {
        normal = -normal;
    }
    let view_dir = normalize(globals.camera_position.xyz - input.world_pos);
    let shininess = object.specular.w;

    var diffuse = vec3<f32>(0.0);
    var specular = vec3<f32>(0.0);
    let count = min(globals.light_count.x, MAX_LIGHTS);
    for (var i = 0u; i < count; i = i + 1u) {
        let light = globals.lights[i];
        let light_dir = normalize(light.direction.xyz);
        let irradiance = max(dot(normal, light_dir), 0.0) * light.color.rgb;
        diffuse = diffuse + irradiance * object.color.rgb;

        let half_dir = normalize(light_dir + view_dir);
        let n_dot_h = max(dot(normal, half_dir), 0.0);
        let l_dot_h = max(dot(light_dir, half_dir), 0.0);
        let fresnel = object.specular.rgb
            + (vec3<f32>(1.0) - object.specular.rgb) * pow(1.0 - l_dot_h, 5.0);
        let distribution = (shininess * 0.5 + 1.0) * pow(n_dot_h, shininess);
        specular = specular + irradiance * fresnel * 0.25 * distribution;
    }

    return vec4<f32>(diffuse + specular, object.color.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_declares_both_entry_points() {
        assert!(SHADER.contains("fn vs_main("));
        assert!(SHADER.contains("fn fs_main("));
        assert!(SHADER.contains("@builtin(front_facing)"));
    }

    #[test]
    fn shader_light_array_matches_uniform() {
        let declared = format!("array<Light, {}>", super::super::common::MAX_LIGHTS);
        assert!(SHADER.contains(&declared));
    }
}
