/// Lit mesh shader. Lights arrive as a fixed uniform array; `light_count.x`
/// says how many entries are live. Light kinds: 0 ambient, 1 directional,
/// 2 hemisphere, 3 point, 4 rect area, 5 spot.
pub const MESH_SHADER: &str = r#"
struct Light {
    position: vec4<f32>,   // xyz, w = kind
    color: vec4<f32>,      // rgb, w = intensity
    direction: vec4<f32>,  // xyz, w = distance
    ground: vec4<f32>,     // rgb, w = decay
    cone: vec4<f32>,       // cos outer, cos inner, width, height
};

struct Scene {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_count: vec4<u32>,
    lights: array<Light, 8>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) albedo_roughness: vec4<f32>,
    @location(7) metalness: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) albedo_roughness: vec4<f32>,
    @location(3) metalness: f32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = scene.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.albedo_roughness = instance.albedo_roughness;
    out.metalness = instance.metalness.x;
    return out;
}

fn range_falloff(dist: f32, range: f32, decay: f32) -> f32 {
    var falloff = 1.0 / max(pow(dist, decay), 0.01);
    if range > 0.0 {
        let ratio = dist / range;
        let window = clamp(1.0 - ratio * ratio * ratio * ratio, 0.0, 1.0);
        falloff = falloff * window * window;
    }
    return falloff;
}

fn specular(n: vec3<f32>, l: vec3<f32>, v: vec3<f32>, roughness: f32) -> f32 {
    let h = normalize(l + v);
    let shininess = mix(256.0, 2.0, roughness);
    return pow(max(dot(n, h), 0.0), shininess) * (1.0 - roughness);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(scene.camera_pos.xyz - in.world_pos);
    let albedo = in.albedo_roughness.rgb;
    let roughness = clamp(in.albedo_roughness.a, 0.04, 1.0);
    let diffuse_color = albedo * (1.0 - in.metalness);
    let specular_color = mix(vec3<f32>(0.04), albedo, in.metalness);

    var total = vec3<f32>(0.0);
    for (var i = 0u; i < scene.light_count.x; i = i + 1u) {
        let light = scene.lights[i];
        let kind = u32(light.position.w);
        let radiance = light.color.rgb * light.color.w;

        if kind == 0u {
            total += diffuse_color * radiance;
            continue;
        }
        if kind == 2u {
            let w = 0.5 * dot(n, light.direction.xyz) + 0.5;
            let sky = mix(light.ground.rgb, light.color.rgb, w);
            total += diffuse_color * sky * light.color.w;
            continue;
        }

        var l = light.direction.xyz;
        var attenuation = 1.0;
        if kind != 1u {
            let to_light = light.position.xyz - in.world_pos;
            let dist = length(to_light);
            l = to_light / max(dist, 0.0001);
            attenuation = range_falloff(dist, light.direction.w, light.ground.w);
            if kind == 5u {
                let cos_theta = dot(-l, light.direction.xyz);
                attenuation *= smoothstep(light.cone.x, light.cone.y, cos_theta);
            }
            if kind == 4u {
                let facing = max(dot(-l, light.direction.xyz), 0.0);
                let area = light.cone.z * light.cone.w;
                attenuation = facing * area / max(dist * dist, 0.01);
            }
        }

        let n_dot_l = max(dot(n, l), 0.0);
        let lit = diffuse_color + specular_color * specular(n, l, v, roughness);
        total += lit * radiance * n_dot_l * attenuation;
    }
    return vec4<f32>(total, 1.0);
}
"#;

/// Unlit line shader for light helpers.
pub const LINE_SHADER: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = scene.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
