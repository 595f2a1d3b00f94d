//! Samples a cube texture whose faces were cleared to six colors.
//!
//! Left/Right turn the camera to the opposite side.

use glam::{Mat4, Vec3};
use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, InputState, Key,
    RenderPipelineDesc, VertexLayout,
};
use gpu_examples_core::PositionVertex;
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::DeviceExt;

use crate::cube;

const VERTEX_SHADER: &str = "Skybox.vert";
const FRAGMENT_SHADER: &str = "Skybox.frag";

const FACE_SIZE: u32 = 64;

/// Clear color per cube layer: +X, -X, +Y, -Y, +Z, -Z.
pub const FACE_COLORS: [wgpu::Color; 6] = [
    wgpu::Color::RED,
    wgpu::Color::GREEN,
    wgpu::Color::BLUE,
    wgpu::Color {
        r: 1.0,
        g: 1.0,
        b: 0.0,
        a: 1.0,
    },
    wgpu::Color {
        r: 1.0,
        g: 0.0,
        b: 1.0,
        a: 1.0,
    },
    wgpu::Color {
        r: 0.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    },
];

const CAMERA_DISTANCE: f32 = 4.0;

/// Camera on the Z axis at `camera_z`, looking at the origin.
pub fn view_projection(camera_z: f32, aspect: f32) -> Mat4 {
    let projection = Mat4::perspective_rh(75f32.to_radians(), aspect, 0.01, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, camera_z), Vec3::ZERO, Vec3::Y);
    projection * view
}

struct State {
    vertex: GpuShader,
    fragment: GpuShader,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    camera: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

pub struct Cubemap {
    state: Option<State>,
    camera_z: f32,
}

impl Default for Cubemap {
    fn default() -> Self {
        Self {
            state: None,
            camera_z: CAMERA_DISTANCE,
        }
    }
}

pub fn create() -> Box<dyn Example> {
    Box::new(Cubemap::default())
}

fn build_pipeline(
    gpu: &GpuContext,
    vertex: &GpuShader,
    fragment: &GpuShader,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    gpu.create_render_pipeline(&RenderPipelineDesc {
        label: "Skybox",
        vertex,
        fragment,
        vertex_buffers: &[VertexLayout::of::<PositionVertex>().buffer_layout()],
        bind_group_layouts: &[layout],
        primitive: wgpu::PrimitiveState::default(),
    })
}

/// Clear each layer of a cube texture to its face color.
fn clear_faces(gpu: &GpuContext, texture: &wgpu::Texture) {
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Clear Cube Faces"),
        });
    for (layer, color) in FACE_COLORS.into_iter().enumerate() {
        let view = crate::blit::level_view(texture, 0, layer as u32);
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Cube Face"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }
    gpu.queue.submit(Some(encoder.finish()));
}

impl Example for Cubemap {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(
            VERTEX_SHADER,
            ShaderResourceCounts::default().with_uniform_buffers(1),
        )?;
        let fragment = ctx.load_shader(
            FRAGMENT_SHADER,
            ShaderResourceCounts::default().with_samplers(1),
        )?;
        let gpu = ctx.gpu;

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Cube Faces"),
            size: wgpu::Extent3d {
                width: FACE_SIZE,
                height: FACE_SIZE,
                depth_or_array_layers: FACE_COLORS.len() as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        clear_faces(gpu, &texture);
        let cube_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Cube View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Cube Sampler"),
            ..Default::default()
        });

        let layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Skybox Bindings"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });
        let camera = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Skybox Camera"),
            size: std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        let pipeline = build_pipeline(gpu, &vertex, &fragment, &layout);

        let vertices = cube::vertices(|_, [x, y, z]| PositionVertex { x, y, z });
        let indices = cube::indices();
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Skybox Vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Skybox Indices"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        log::info!("Press Left/Right to view the opposite direction");
        self.state = Some(State {
            vertex,
            fragment,
            layout,
            pipeline,
            bind_group,
            camera,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        });
        Ok(())
    }

    fn update(&mut self, _ctx: &mut ExampleContext<'_>, input: &InputState) -> Result<(), ExampleError> {
        if input.just_pressed(Key::Left) || input.just_pressed(Key::Right) {
            self.camera_z = -self.camera_z;
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let (width, height) = frame.gpu.size();
        let camera = view_projection(self.camera_z, width as f32 / height.max(1) as f32);
        frame
            .gpu
            .queue
            .write_buffer(&state.camera, 0, bytemuck::bytes_of(&camera));

        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        pass.set_pipeline(&state.pipeline);
        pass.set_bind_group(0, &state.bind_group, &[]);
        pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
        pass.set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..state.index_count, 0, 0..1);
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
            match reloaded.name.as_str() {
                VERTEX_SHADER => state.vertex = reloaded.shader,
                FRAGMENT_SHADER => state.fragment = reloaded.shader,
                _ => {}
            }
        }
        state.pipeline = build_pipeline(ctx.gpu, &state.vertex, &state.fragment, &state.layout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_sits_inside_the_cube() {
        assert!(CAMERA_DISTANCE < 10.0);
        let clip = view_projection(-CAMERA_DISTANCE, 4.0 / 3.0) * glam::Vec4::new(0.0, 0.0, 10.0, 1.0);
        // Looking from -Z toward the origin, the +Z face is in front.
        assert!(clip.w > 0.0);
        let clip = view_projection(CAMERA_DISTANCE, 4.0 / 3.0) * glam::Vec4::new(0.0, 0.0, 10.0, 1.0);
        assert!(clip.w < 0.0);
    }

    #[test]
    fn test_six_distinct_faces() {
        for (i, a) in FACE_COLORS.iter().enumerate() {
            assert!(FACE_COLORS[i + 1..].iter().all(|b| a != b));
        }
    }
}
