//! Fills a storage texture from a compute shader, then draws it.

use gpu_examples_app::{Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader};
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts, ShaderStage};

use crate::textured::{self, QuadRenderer};

const COMPUTE_SHADER: &str = "FillTexture.comp";
const WORKGROUP_SIZE: u32 = 8;

struct FillPass {
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
}

impl FillPass {
    fn new(gpu: &GpuContext, shader: &GpuShader, target: &wgpu::TextureView) -> Self {
        let layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Fill Texture Bindings"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                }],
            });
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Fill Texture Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(target),
            }],
        });
        let pipeline = build_pipeline(gpu, shader, &layout);
        Self {
            layout,
            pipeline,
            bind_group,
        }
    }

    /// Record and submit one dispatch covering a `width` x `height` texture.
    fn run(&self, gpu: &GpuContext, width: u32, height: u32) {
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Fill Texture"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Fill Texture"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(
                width.div_ceil(WORKGROUP_SIZE),
                height.div_ceil(WORKGROUP_SIZE),
                1,
            );
        }
        gpu.queue.submit(Some(encoder.finish()));
    }
}

fn build_pipeline(
    gpu: &GpuContext,
    shader: &GpuShader,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::ComputePipeline {
    let layout = gpu
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fill Texture"),
            bind_group_layouts: &[bind_group_layout],
            immediate_size: 0,
        });
    gpu.device
        .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Fill Texture"),
            layout: Some(&layout),
            module: &shader.module,
            entry_point: shader.entry(),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        })
}

struct State {
    fill: FillPass,
    size: (u32, u32),
    quad: QuadRenderer,
    bind_group: wgpu::BindGroup,
}

#[derive(Default)]
pub struct BasicCompute {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(BasicCompute::default())
}

impl Example for BasicCompute {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let shader = ctx.load_shader_with_stage(
            COMPUTE_SHADER,
            ShaderStage::Compute,
            ShaderResourceCounts::default().with_storage_textures(1),
        )?;
        let quad = QuadRenderer::new(ctx, 1.0)?;
        let gpu = ctx.gpu;

        let (width, height) = gpu.size();
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Fill Target"),
            size: textured::texture_extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let fill = FillPass::new(gpu, &shader, &view);
        fill.run(gpu, width, height);

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("PointClamp"),
            ..Default::default()
        });
        let bind_group = quad.bind_group(gpu, &view, &sampler);

        self.state = Some(State {
            fill,
            size: (width, height),
            quad,
            bind_group,
        });
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        state.quad.draw(&mut pass, &state.bind_group);
        Ok(())
    }

    fn shaders_reloaded(
        &mut self,
        ctx: &mut ExampleContext<'_>,
        mut shaders: Vec<ReloadedShader<GpuShader>>,
    ) -> Result<(), ExampleError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        let gpu = ctx.gpu;
        if let Some(i) = shaders.iter().position(|s| s.name == COMPUTE_SHADER) {
            let reloaded = shaders.swap_remove(i);
            state.fill.pipeline = build_pipeline(gpu, &reloaded.shader, &state.fill.layout);
            let (width, height) = state.size;
            state.fill.run(gpu, width, height);
        }
        state.quad.shaders_reloaded(gpu, shaders);
        Ok(())
    }
}
