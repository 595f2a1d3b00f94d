//! Draws thousands of sprites by pulling instance data from a storage
//! buffer in the vertex shader. Sprites are re-scattered every frame.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, PipelineTarget,
    RenderPipelineDesc,
};
use gpu_examples_core::ComputeSpriteInstance;
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wgpu::util::DeviceExt;

use crate::sprites::{self, SPRITE_COUNT};

const VERTEX_SHADER: &str = "PullSpriteBatch.vert";
const FRAGMENT_SHADER: &str = sprites::FRAGMENT_SHADER;

/// Vertices emitted per sprite; the shader derives the corner from the index.
pub const VERTICES_PER_SPRITE: u32 = 6;

struct State {
    vertex: GpuShader,
    fragment: GpuShader,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    sprite_buffer: wgpu::Buffer,
    sprites: Vec<ComputeSpriteInstance>,
    rng: StdRng,
}

#[derive(Default)]
pub struct PullSpriteBatch {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(PullSpriteBatch::default())
}

fn build_pipeline(
    gpu: &GpuContext,
    vertex: &GpuShader,
    fragment: &GpuShader,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    gpu.create_render_pipeline_for(
        &RenderPipelineDesc {
            label: "Pull Sprite Batch",
            vertex,
            fragment,
            vertex_buffers: &[],
            bind_group_layouts: &[layout],
            primitive: wgpu::PrimitiveState::default(),
        },
        &PipelineTarget::default().with_blend(sprites::SPRITE_BLEND),
    )
}

impl Example for PullSpriteBatch {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(
            VERTEX_SHADER,
            ShaderResourceCounts::default()
                .with_uniform_buffers(1)
                .with_storage_buffers(1),
        )?;
        let fragment = ctx.load_shader(
            FRAGMENT_SHADER,
            ShaderResourceCounts::default().with_samplers(1),
        )?;
        let (atlas, sampler) = sprites::load_atlas(ctx)?;
        let gpu = ctx.gpu;

        let [texture_entry, sampler_entry] = sprites::atlas_layout_entries();
        let layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Pull Sprite Bindings"),
                entries: &[
                    sprites::buffer_entry(
                        0,
                        wgpu::ShaderStages::VERTEX,
                        wgpu::BufferBindingType::Storage { read_only: true },
                    ),
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
        let camera = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Camera"),
                contents: bytemuck::bytes_of(&sprites::camera()),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pull Sprite Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: sprite_buffer.as_entire_binding(),
                },
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
        let pipeline = build_pipeline(gpu, &vertex, &fragment, &layout);

        self.state = Some(State {
            vertex,
            fragment,
            layout,
            pipeline,
            bind_group,
            sprite_buffer,
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

        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        pass.set_pipeline(&state.pipeline);
        pass.set_bind_group(0, &state.bind_group, &[]);
        pass.draw(0..SPRITE_COUNT * VERTICES_PER_SPRITE, 0..1);
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
    fn test_vertex_count_matches_index_pattern() {
        assert_eq!(VERTICES_PER_SPRITE, sprites::quad_indices(1).len() as u32);
        assert_eq!(
            SPRITE_COUNT * VERTICES_PER_SPRITE,
            sprites::quad_indices(SPRITE_COUNT).len() as u32
        );
    }
}
