use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use lightbox_common::NodeId;
use lightbox_render::{PerspectiveCamera, Renderer};
use lightbox_scene::{Geometry, Light, LightKind, Mesh, SceneGraph};
use wgpu::util::DeviceExt;

use crate::mesh::{Vertex, tessellate};
use crate::shaders;

/// Lights beyond this count are not shaded.
pub const MAX_LIGHTS: usize = 8;
const MAX_MESHES: u64 = 64;
const MAX_LINE_VERTICES: u64 = 16_384;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuLight {
    position: [f32; 4],
    color: [f32; 4],
    direction: [f32; 4],
    ground: [f32; 4],
    cone: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_count: [u32; 4],
    lights: [GpuLight; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    albedo_roughness: [f32; 4],
    metalness: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    position: [f32; 3],
    color: [f32; 4],
}

fn light_kind_code(kind: &LightKind) -> f32 {
    match kind {
        LightKind::Ambient => 0.0,
        LightKind::Directional { .. } => 1.0,
        LightKind::Hemisphere { .. } => 2.0,
        LightKind::Point { .. } => 3.0,
        LightKind::RectArea { .. } => 4.0,
        LightKind::Spot { .. } => 5.0,
    }
}

/// Flatten a light into the shader's layout.
pub(crate) fn pack_light(light: &Light) -> GpuLight {
    let p = light.position;
    let mut packed = GpuLight {
        position: [p.x, p.y, p.z, light_kind_code(&light.kind)],
        color: [light.color.r, light.color.g, light.color.b, light.intensity],
        ..GpuLight::default()
    };
    let dir = |v: Vec3, w: f32| [v.x, v.y, v.z, w];
    match light.kind {
        LightKind::Ambient => {}
        LightKind::Directional { target } => {
            packed.direction = dir((p - target).normalize_or(Vec3::Y), 0.0);
        }
        LightKind::Hemisphere { ground_color } => {
            packed.direction = dir(p.normalize_or(Vec3::Y), 0.0);
            let g = ground_color;
            packed.ground = [g.r, g.g, g.b, 0.0];
        }
        LightKind::Point { distance, decay } => {
            packed.direction[3] = distance;
            packed.ground[3] = decay;
        }
        LightKind::RectArea {
            width,
            height,
            look_at,
        } => {
            packed.direction = dir((look_at - p).normalize_or(Vec3::NEG_Z), 0.0);
            packed.cone = [0.0, 0.0, width, height];
        }
        LightKind::Spot {
            target,
            distance,
            angle,
            penumbra,
            decay,
        } => {
            packed.direction = dir((target - p).normalize_or(Vec3::NEG_Y), distance);
            packed.ground[3] = decay;
            packed.cone = [angle.cos(), (angle * (1.0 - penumbra)).cos(), 0.0, 0.0];
        }
    }
    packed
}

pub(crate) fn pack_lights(scene: &SceneGraph) -> ([GpuLight; MAX_LIGHTS], u32) {
    let mut lights = [GpuLight::default(); MAX_LIGHTS];
    let mut count = 0;
    for (id, light) in scene.lights() {
        if count == MAX_LIGHTS {
            tracing::warn!("light {id} not shaded: more than {MAX_LIGHTS} lights");
            continue;
        }
        lights[count] = pack_light(light);
        count += 1;
    }
    (lights, count as u32)
}

pub(crate) fn instance_for(mesh: &Mesh) -> InstanceData {
    let cols = mesh.transform.matrix().to_cols_array_2d();
    let material = mesh.material.get();
    let c = material.color;
    InstanceData {
        model_0: cols[0],
        model_1: cols[1],
        model_2: cols[2],
        model_3: cols[3],
        albedo_roughness: [c.r, c.g, c.b, material.roughness],
        metalness: [material.metalness, 0.0, 0.0, 0.0],
    }
}

/// Two vertices per helper line, in graph order.
pub(crate) fn helper_vertices(scene: &SceneGraph) -> Vec<LineVertex> {
    scene
        .helpers()
        .flat_map(|(_, helper)| helper.lines().iter())
        .flat_map(|line| {
            let color = [line.color.r, line.color.g, line.color.b, 1.0];
            [
                LineVertex {
                    position: line.start.to_array(),
                    color,
                },
                LineVertex {
                    position: line.end.to_array(),
                    color,
                },
            ]
        })
        .collect()
}

struct GpuMesh {
    geometry: Geometry,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// wgpu renderer for the lit scene and light helpers.
///
/// Geometry is tessellated and uploaded the first time a mesh is drawn and
/// again only if its descriptor changes.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    meshes: BTreeMap<NodeId, GpuMesh>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_uniforms"),
            contents: bytemuck::bytes_of(&SceneUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                camera_pos: [0.0; 4],
                light_count: [0; 4],
                lights: [GpuLight::default(); MAX_LIGHTS],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let depth_stencil = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        };
        let color_target = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // The plane is seen from both sides when orbiting.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil.clone()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: MAX_MESHES * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("helper_line_buffer"),
            size: MAX_LINE_VERTICES * std::mem::size_of::<LineVertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            mesh_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            instance_buffer,
            line_buffer,
            meshes: BTreeMap::new(),
            depth_texture,
            surface_format,
            clear_color: wgpu::Color::BLACK,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    fn upload_mesh(device: &wgpu::Device, id: NodeId, geometry: Geometry) -> GpuMesh {
        let data = tessellate(&geometry);
        tracing::debug!(
            "uploading {} for {id}: {} vertices",
            geometry.name(),
            data.vertices.len()
        );
        GpuMesh {
            geometry,
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertex_buffer"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_index_buffer"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: data.indices.len() as u32,
        }
    }

    /// Draw the scene into `view`: every mesh lit by every light, then the
    /// visible helpers as lines.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
    ) {
        let (lights, light_count) = pack_lights(scene);
        let eye = camera.position;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&SceneUniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
                camera_pos: [eye.x, eye.y, eye.z, 1.0],
                light_count: [light_count, 0, 0, 0],
                lights,
            }),
        );

        let mut instances = Vec::new();
        let mut draws = Vec::new();
        for (id, mesh) in scene.meshes().take(MAX_MESHES as usize) {
            let stale = self
                .meshes
                .get(&id)
                .is_none_or(|cached| cached.geometry != mesh.geometry);
            if stale {
                self.meshes
                    .insert(id, Self::upload_mesh(device, id, mesh.geometry));
            }
            draws.push((id, instances.len() as u32));
            instances.push(instance_for(mesh));
        }
        self.meshes.retain(|id, _| scene.contains(*id));
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut lines = helper_vertices(scene);
        lines.truncate(MAX_LINE_VERTICES as usize);
        if !lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&lines));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (id, instance) in draws {
                let Some(gpu_mesh) = self.meshes.get(&id) else {
                    continue;
                };
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu_mesh.index_count, 0, instance..instance + 1);
            }

            if !lines.is_empty() {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                pass.draw(0..lines.len() as u32, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// One frame's GPU target. Rendering acquires the surface texture and draws
/// the scene into it; the caller may draw more (e.g. UI) before presenting.
pub struct SurfaceFrame<'a> {
    pub renderer: &'a mut WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface: &'a wgpu::Surface<'static>,
}

impl Renderer for SurfaceFrame<'_> {
    type Output = Result<wgpu::SurfaceTexture, wgpu::SurfaceError>;

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Self::Output {
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .draw(self.device, self.queue, &view, scene, camera);
        Ok(frame)
    }
}
