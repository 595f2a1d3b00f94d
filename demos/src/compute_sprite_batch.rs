//! Expands sprite instances into vertices with a compute shader, then
//! draws them with a shared index pattern. Sprites are re-scattered every
//! frame.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, PipelineTarget,
    RenderPipelineDesc, VertexLayout,
};
use gpu_examples_core::{ComputeSpriteInstance, PositionTextureColorVertex};
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts, ShaderStage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wgpu::util::DeviceExt;

use crate::sprites::{self, SPRITE_COUNT};

const COMPUTE_SHADER: &str = "SpriteBatch.comp";
const VERTEX_SHADER: &str = "TexturedQuadColorWithMatrix.vert";
const FRAGMENT_SHADER: &str = sprites::FRAGMENT_SHADER;

pub const WORKGROUP_SIZE: u32 = 64;

/// Workgroups needed to expand `sprite_count` sprites.
pub fn workgroups(sprite_count: u32) -> u32 {
    sprite_count.div_ceil(WORKGROUP_SIZE)
}

struct Shaders {
    compute: GpuShader,
    vertex: GpuShader,
    fragment: GpuShader,
}

struct State {
    shaders: Shaders,
    compute_layout: wgpu::BindGroupLayout,
    render_layout: wgpu::BindGroupLayout,
    compute_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,
    compute_group: wgpu::BindGroup,
    render_group: wgpu::BindGroup,
    sprite_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    sprites: Vec<ComputeSpriteInstance>,
    rng: StdRng,
}

#[derive(Default)]
pub struct ComputeSpriteBatch {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(ComputeSpriteBatch::default())
}

fn build_compute_pipeline(
    gpu: &GpuContext,
    shader: &GpuShader,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::ComputePipeline {
    let layout = gpu
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Batch"),
            bind_group_layouts: &[bind_group_layout],
            immediate_size: 0,
        });
    gpu.device
        .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Sprite Batch"),
            layout: Some(&layout),
            module: &shader.module,
            entry_point: shader.entry(),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        })
}

fn build_render_pipeline(
    gpu: &GpuContext,
    shaders: &Shaders,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    gpu.create_render_pipeline_for(
        &RenderPipelineDesc {
            label: "Compute Sprite Batch",
            vertex: &shaders.vertex,
            fragment: &shaders.fragment,
            vertex_buffers: &[VertexLayout::of::<PositionTextureColorVertex>().buffer_layout()],
            bind_group_layouts: &[layout],
            primitive: wgpu::PrimitiveState::default(),
        },
        &PipelineTarget::default().with_blend(sprites::SPRITE_BLEND),
    )
}

impl Example for ComputeSpriteBatch {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let shaders = Shaders {
            compute: ctx.load_shader_with_stage(
                COMPUTE_SHADER,
                ShaderStage::Compute,
                ShaderResourceCounts::default().with_storage_buffers(2),
            )?,
            vertex: ctx.load_shader(
                VERTEX_SHADER,
                ShaderResourceCounts::default().with_uniform_buffers(1),
            )?,
            fragment: ctx.load_shader(
                FRAGMENT_SHADER,
                ShaderResourceCounts::default().with_samplers(1),
            )?,
        };
        let (atlas, sampler) = sprites::load_atlas(ctx)?;
        let gpu = ctx.gpu;

        let compute_layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sprite Batch Bindings"),
                entries: &[
                    sprites::buffer_entry(
                        0,
                        wgpu::ShaderStages::COMPUTE,
                        wgpu::BufferBindingType::Storage { read_only: true },
                    ),
                    sprites::buffer_entry(
                        1,
                        wgpu::ShaderStages::COMPUTE,
                        wgpu::BufferBindingType::Storage { read_only: false },
                    ),
                ],
            });
        let [texture_entry, sampler_entry] = sprites::atlas_layout_entries();
        let render_layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Compute Sprite Render Bindings"),
                entries: &[
                    sprites::buffer_entry(
                        1,
                        wgpu::ShaderStages::VERTEX,
                        wgpu::BufferBindingType::Uniform,
                    ),
                    texture_entry,
                    sampler_entry,
                ],
            });

        let sprites = vec![ComputeSpriteInstance::default(); SPRITE_COUNT as usize];
        let sprite_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Instances"),
            size: std::mem::size_of_val(sprites.as_slice()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Vertices"),
            size: (SPRITE_COUNT as usize * 4 * std::mem::size_of::<PositionTextureColorVertex>())
                as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Indices"),
                contents: bytemuck::cast_slice(&sprites::quad_indices(SPRITE_COUNT)),
                usage: wgpu::BufferUsages::INDEX,
            });
        let camera = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Camera"),
                contents: bytemuck::bytes_of(&sprites::camera()),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let compute_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Batch Bind Group"),
            layout: &compute_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: sprite_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: vertex_buffer.as_entire_binding(),
                },
            ],
        });
        let render_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Compute Sprite Render Bind Group"),
            layout: &render_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: camera.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&atlas),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let compute_pipeline = build_compute_pipeline(gpu, &shaders.compute, &compute_layout);
        let render_pipeline = build_render_pipeline(gpu, &shaders, &render_layout);

        self.state = Some(State {
            shaders,
            compute_layout,
            render_layout,
            compute_pipeline,
            render_pipeline,
            compute_group,
            render_group,
            sprite_buffer,
            vertex_buffer,
            index_buffer,
            sprites,
            rng: StdRng::from_entropy(),
        });
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        sprites::randomize(&mut state.rng, &mut state.sprites);
        frame.gpu.queue.write_buffer(
            &state.sprite_buffer,
            0,
            bytemuck::cast_slice(&state.sprites),
        );

        {
            let mut pass = frame
                .encoder
                .begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Sprite Batch"),
                    timestamp_writes: None,
                });
            pass.set_pipeline(&state.compute_pipeline);
            pass.set_bind_group(0, &state.compute_group, &[]);
            pass.dispatch_workgroups(workgroups(SPRITE_COUNT), 1, 1);
        }

        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        pass.set_pipeline(&state.render_pipeline);
        pass.set_bind_group(0, &state.render_group, &[]);
        pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
        pass.set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..SPRITE_COUNT * 6, 0, 0..1);
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
        let gpu = ctx.gpu;
        let mut render_changed = false;
        for reloaded in shaders {
            match reloaded.name.as_str() {
                COMPUTE_SHADER => {
                    state.shaders.compute = reloaded.shader;
                    state.compute_pipeline =
                        build_compute_pipeline(gpu, &state.shaders.compute, &state.compute_layout);
                }
                VERTEX_SHADER => {
                    state.shaders.vertex = reloaded.shader;
                    render_changed = true;
                }
                FRAGMENT_SHADER => {
                    state.shaders.fragment = reloaded.shader;
                    render_changed = true;
                }
                _ => {}
            }
        }
        if render_changed {
            state.render_pipeline = build_render_pipeline(gpu, &state.shaders, &state.render_layout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroups_cover_every_sprite() {
        assert_eq!(workgroups(SPRITE_COUNT), 128);
        assert_eq!(workgroups(65), 2);
        assert_eq!(workgroups(1), 1);
    }
}
