//! Renders a spinning cube at quarter resolution, then outlines it by
//! sampling the scene's depth texture.

use std::time::Instant;

use glam::{Mat4, Vec3};
use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, PipelineTarget,
    RenderPipelineDesc, VertexLayout,
};
use gpu_examples_core::{PositionColorVertex, PositionTextureVertex};
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::DeviceExt;

use crate::cube;
use crate::textured::{self, QUAD_INDICES};

const SCENE_VERTEX: &str = "PositionColorTransform.vert";
const SCENE_FRAGMENT: &str = "SolidColorDepth.frag";
const EFFECT_VERTEX: &str = textured::VERTEX_SHADER;
const EFFECT_FRAGMENT: &str = "DepthOutline.frag";

const SCENE_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const SCENE_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth16Unorm;
/// The scene is rendered at this fraction of the window size.
const SCENE_DIVISOR: u32 = 4;

pub const NEAR_PLANE: f32 = 20.0;
pub const FAR_PLANE: f32 = 60.0;

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.5,
    b: 0.4,
    a: 1.0,
};

const FACE_COLORS: [[u8; 4]; 6] = [
    [255, 0, 0, 255],
    [255, 255, 0, 255],
    [255, 0, 255, 255],
    [0, 255, 0, 255],
    [0, 255, 255, 255],
    [0, 0, 255, 255],
];

/// Camera circling the cube at 30 units.
pub fn view_projection(seconds: f32, aspect: f32) -> Mat4 {
    let projection = Mat4::perspective_rh(75f32.to_radians(), aspect, NEAR_PLANE, FAR_PLANE);
    let eye = Vec3::new(seconds.cos() * 30.0, 30.0, seconds.sin() * 30.0);
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    projection * view
}

struct Scene {
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
    size: (u32, u32),
}

impl Scene {
    fn new(gpu: &GpuContext) -> Self {
        let (width, height) = gpu.size();
        let size = ((width / SCENE_DIVISOR).max(1), (height / SCENE_DIVISOR).max(1));
        let texture = |label, format| {
            gpu.device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: textured::texture_extent(size.0, size.1),
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::TEXTURE_BINDING
                        | wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };
        Self {
            color: texture("Scene Color", SCENE_COLOR_FORMAT),
            depth: texture("Scene Depth", SCENE_DEPTH_FORMAT),
            size,
        }
    }
}

struct Shaders {
    scene_vertex: GpuShader,
    scene_fragment: GpuShader,
    effect_vertex: GpuShader,
    effect_fragment: GpuShader,
}

struct Pipelines {
    scene: wgpu::RenderPipeline,
    effect: wgpu::RenderPipeline,
}

fn build_pipelines(
    gpu: &GpuContext,
    shaders: &Shaders,
    scene_layout: &wgpu::BindGroupLayout,
    effect_layout: &wgpu::BindGroupLayout,
) -> Pipelines {
    let scene = gpu.create_render_pipeline_for(
        &RenderPipelineDesc {
            label: "Depth Scene",
            vertex: &shaders.scene_vertex,
            fragment: &shaders.scene_fragment,
            vertex_buffers: &[VertexLayout::of::<PositionColorVertex>().buffer_layout()],
            bind_group_layouts: &[scene_layout],
            primitive: wgpu::PrimitiveState::default(),
        },
        &PipelineTarget::default()
            .with_format(SCENE_COLOR_FORMAT)
            .with_depth_stencil(wgpu::DepthStencilState {
                format: SCENE_DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
    );
    let effect = gpu.create_render_pipeline_for(
        &RenderPipelineDesc {
            label: "Depth Outline",
            vertex: &shaders.effect_vertex,
            fragment: &shaders.effect_fragment,
            vertex_buffers: &[VertexLayout::of::<PositionTextureVertex>().buffer_layout()],
            bind_group_layouts: &[effect_layout],
            primitive: wgpu::PrimitiveState::default(),
        },
        &PipelineTarget::default().with_blend(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
    );
    Pipelines { scene, effect }
}

fn layout_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    ty: wgpu::BindingType,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty,
        count: None,
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    layout_entry(
        binding,
        visibility,
        wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
    )
}

struct State {
    shaders: Shaders,
    scene_layout: wgpu::BindGroupLayout,
    effect_layout: wgpu::BindGroupLayout,
    pipelines: Pipelines,
    scene: Scene,
    sampler: wgpu::Sampler,
    camera: wgpu::Buffer,
    scene_group: wgpu::BindGroup,
    effect_group: wgpu::BindGroup,
    cube_vertices: wgpu::Buffer,
    cube_indices: wgpu::Buffer,
    index_count: u32,
    quad_vertices: wgpu::Buffer,
    quad_indices: wgpu::Buffer,
    started: Instant,
}

fn outline_bind_group(
    gpu: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    scene: &Scene,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Depth Outline Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&scene.color),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&scene.depth),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[derive(Default)]
pub struct DepthSampler {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(DepthSampler::default())
}

impl Example for DepthSampler {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let shaders = Shaders {
            scene_vertex: ctx.load_shader(
                SCENE_VERTEX,
                ShaderResourceCounts::default().with_uniform_buffers(1),
            )?,
            scene_fragment: ctx.load_shader(
                SCENE_FRAGMENT,
                ShaderResourceCounts::default().with_uniform_buffers(1),
            )?,
            effect_vertex: ctx.load_shader(EFFECT_VERTEX, ShaderResourceCounts::default())?,
            effect_fragment: ctx.load_shader(
                EFFECT_FRAGMENT,
                ShaderResourceCounts::default().with_samplers(2),
            )?,
        };
        let gpu = ctx.gpu;

        let scene_layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Depth Scene Bindings"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::VERTEX),
                    uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                ],
            });
        let effect_layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Depth Outline Bindings"),
                entries: &[
                    layout_entry(
                        0,
                        wgpu::ShaderStages::FRAGMENT,
                        wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                    ),
                    layout_entry(
                        1,
                        wgpu::ShaderStages::FRAGMENT,
                        wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                    ),
                    layout_entry(
                        2,
                        wgpu::ShaderStages::FRAGMENT,
                        wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    ),
                ],
            });
        let pipelines = build_pipelines(gpu, &shaders, &scene_layout, &effect_layout);

        let camera = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera"),
            size: std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let depth_range = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Depth Range"),
                contents: bytemuck::cast_slice(&[NEAR_PLANE, FAR_PLANE, 0.0, 0.0]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let scene_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Depth Scene Bind Group"),
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: depth_range.as_entire_binding(),
                },
            ],
        });

        let buffer = |label, contents: &[u8], usage| {
            gpu.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage,
                })
        };
        let indices = cube::indices();
        let vertices = cube::vertices(|face, [x, y, z]| {
            PositionColorVertex::new(x, y, z, FACE_COLORS[face])
        });
        let cube_vertices = buffer(
            "Cube Vertices",
            bytemuck::cast_slice(&vertices),
            wgpu::BufferUsages::VERTEX,
        );
        let cube_indices = buffer(
            "Cube Indices",
            bytemuck::cast_slice(&indices),
            wgpu::BufferUsages::INDEX,
        );
        let quad_vertices = buffer(
            "Outline Quad Vertices",
            bytemuck::cast_slice(&textured::quad_vertices(1.0)),
            wgpu::BufferUsages::VERTEX,
        );
        let quad_indices = buffer(
            "Outline Quad Indices",
            bytemuck::cast_slice(&QUAD_INDICES),
            wgpu::BufferUsages::INDEX,
        );

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Outline Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            ..Default::default()
        });
        let scene = Scene::new(gpu);
        let effect_group = outline_bind_group(gpu, &effect_layout, &scene, &sampler);

        self.state = Some(State {
            shaders,
            scene_layout,
            effect_layout,
            pipelines,
            scene,
            sampler,
            camera,
            scene_group,
            effect_group,
            cube_vertices,
            cube_indices,
            index_count: indices.len() as u32,
            quad_vertices,
            quad_indices,
            started: Instant::now(),
        });
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        let (width, height) = frame.gpu.size();
        if (width / SCENE_DIVISOR).max(1) != state.scene.size.0
            || (height / SCENE_DIVISOR).max(1) != state.scene.size.1
        {
            state.scene = Scene::new(frame.gpu);
            state.effect_group =
                outline_bind_group(frame.gpu, &state.effect_layout, &state.scene, &state.sampler);
        }

        let (scene_width, scene_height) = state.scene.size;
        let seconds = state.started.elapsed().as_secs_f32();
        let camera = view_projection(seconds, scene_width as f32 / scene_height as f32);
        frame
            .gpu
            .queue
            .write_buffer(&state.camera, 0, bytemuck::bytes_of(&camera));

        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Depth Scene"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &state.scene.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &state.scene.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&state.pipelines.scene);
            pass.set_bind_group(0, &state.scene_group, &[]);
            pass.set_vertex_buffer(0, state.cube_vertices.slice(..));
            pass.set_index_buffer(state.cube_indices.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..state.index_count, 0, 0..1);
        }

        let mut pass = frame.clear_pass(BACKGROUND);
        pass.set_pipeline(&state.pipelines.effect);
        pass.set_bind_group(0, &state.effect_group, &[]);
        pass.set_vertex_buffer(0, state.quad_vertices.slice(..));
        pass.set_index_buffer(state.quad_indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        Ok(())
    }

    fn shaders_reloaded(
        &mut self,
        ctx: &mut ExampleContext<'_>,
        shaders: Vec<ReloadedShader<GpuShader>>,
    ) -> Result<(), ExampleError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        for reloaded in shaders {
            let slot = match reloaded.name.as_str() {
                SCENE_VERTEX => &mut state.shaders.scene_vertex,
                SCENE_FRAGMENT => &mut state.shaders.scene_fragment,
                EFFECT_VERTEX => &mut state.shaders.effect_vertex,
                EFFECT_FRAGMENT => &mut state.shaders.effect_fragment,
                _ => continue,
            };
            *slot = reloaded.shader;
        }
        state.pipelines = build_pipelines(
            ctx.gpu,
            &state.shaders,
            &state.scene_layout,
            &state.effect_layout,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_center_projects_inside_depth_range() {
        for seconds in [0.0, 1.0, 2.5] {
            let clip = view_projection(seconds, 4.0 / 3.0) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
            let ndc = clip / clip.w;
            assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
            assert!(ndc.z > 0.0 && ndc.z < 1.0);
        }
    }
}
