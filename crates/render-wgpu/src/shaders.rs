/// WGSL for lit meshes: hemisphere + ambient fill, one directional key light
/// with a 3×3 PCF shadow lookup, Lambert diffuse.
pub const MESH_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    sky_color: vec4<f32>,
    ground_color: vec4<f32>,
    ambient_color: vec4<f32>,
    key_color: vec4<f32>,
    // xyz: direction toward the light, w: 1 when shadows are on
    key_direction: vec4<f32>,
    // x: depth bias, y: shadow texel size
    shadow_params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;
@group(0) @binding(1)
var shadow_map: texture_depth_2d;
@group(0) @binding(2)
var shadow_sampler: sampler_comparison;

struct MeshUniforms {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    base_color: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> mesh: MeshUniforms;
@group(1) @binding(1)
var base_color_texture: texture_2d<f32>;
@group(1) @binding(2)
var base_color_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) light_space: vec4<f32>,
};

const RECIPROCAL_PI: f32 = 0.3183098861837907;

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = mesh.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = globals.view_proj * world_pos;
    out.world_normal = (mesh.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    out.light_space = globals.light_view_proj * world_pos;
    return out;
}

fn shadow_factor(light_space: vec4<f32>) -> f32 {
    if (globals.key_direction.w < 0.5) {
        return 1.0;
    }
    let ndc = light_space.xyz / light_space.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0) {
        return 1.0;
    }
    let depth = ndc.z + globals.shadow_params.x;
    let texel = globals.shadow_params.y;
    var lit = 0.0;
    for (var y = -1; y <= 1; y++) {
        for (var x = -1; x <= 1; x++) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            lit += textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    return lit / 9.0;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = mesh.base_color * textureSample(base_color_texture, base_color_sampler, in.uv);
    let n = normalize(in.world_normal);

    let hemisphere = mix(globals.ground_color.rgb, globals.sky_color.rgb, 0.5 * n.y + 0.5);
    let n_dot_l = max(dot(n, normalize(globals.key_direction.xyz)), 0.0);
    let direct = globals.key_color.rgb * n_dot_l * shadow_factor(in.light_space);
    let irradiance = globals.ambient_color.rgb + hemisphere + direct;

    return vec4<f32>(base.rgb * irradiance * RECIPROCAL_PI, base.a);
}
"#;

/// WGSL for the depth-only shadow pass, rendered from the key light.
pub const SHADOW_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct MeshUniforms {
    model: mat4x4<f32>,
};

@group(1) @binding(0)
var<uniform> mesh: MeshUniforms;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.light_view_proj * mesh.model * vec4<f32>(position, 1.0);
}
"#;

/// WGSL for the gradient backdrop: one full-screen triangle, texture row 0
/// at the top of the viewport, drawn at the far plane.
pub const BACKGROUND_SHADER: &str = r#"
@group(0) @binding(0)
var background_texture: texture_2d<f32>;
@group(0) @binding(1)
var background_sampler: sampler;

struct BackgroundOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_background(@builtin(vertex_index) index: u32) -> BackgroundOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: BackgroundOutput;
    out.clip_position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 1.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_background(in: BackgroundOutput) -> @location(0) vec4<f32> {
    return textureSample(background_texture, background_sampler, in.uv);
}
"#;
