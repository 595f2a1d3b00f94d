//! Blits both layers of a 2D array texture into a half-size array.
//!
//! The left quad shows the source array, the right quad the blitted copy.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, RenderPipelineDesc,
    VertexLayout,
};
use gpu_examples_core::PositionTextureVertex;
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::DeviceExt;

use crate::blit::{BlitInfo, Blitter, FlipMode, Rect, level_view};
use crate::textured::{self, QUAD_INDICES};

const VERTEX_SHADER: &str = textured::VERTEX_SHADER;
const FRAGMENT_SHADER: &str = "TexturedQuadArray.frag";

const LAYER_IMAGES: [&str; 2] = ["ravioli.bmp", "ravioli_inverted.bmp"];

/// Left quad at vertices 0..4, right quad at 4..8.
pub const VERTICES: [PositionTextureVertex; 8] = [
    PositionTextureVertex::new(-1.0, 1.0, 0.0, 0.0, 0.0),
    PositionTextureVertex::new(0.0, 1.0, 0.0, 1.0, 0.0),
    PositionTextureVertex::new(0.0, -1.0, 0.0, 1.0, 1.0),
    PositionTextureVertex::new(-1.0, -1.0, 0.0, 0.0, 1.0),
    PositionTextureVertex::new(0.0, 1.0, 0.0, 0.0, 0.0),
    PositionTextureVertex::new(1.0, 1.0, 0.0, 1.0, 0.0),
    PositionTextureVertex::new(1.0, -1.0, 0.0, 1.0, 1.0),
    PositionTextureVertex::new(0.0, -1.0, 0.0, 0.0, 1.0),
];

struct State {
    vertex: GpuShader,
    fragment: GpuShader,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    source_group: wgpu::BindGroup,
    destination_group: wgpu::BindGroup,
}

#[derive(Default)]
pub struct Blit2DArray {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(Blit2DArray::default())
}

fn array_texture(
    gpu: &GpuContext,
    label: &str,
    width: u32,
    height: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: LAYER_IMAGES.len() as u32,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: usage | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

fn build_pipeline(
    gpu: &GpuContext,
    vertex: &GpuShader,
    fragment: &GpuShader,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    gpu.create_render_pipeline(&RenderPipelineDesc {
        label: "Textured Quad Array Pipeline",
        vertex,
        fragment,
        vertex_buffers: &[VertexLayout::of::<PositionTextureVertex>().buffer_layout()],
        bind_group_layouts: &[layout],
        primitive: wgpu::PrimitiveState::default(),
    })
}

impl Example for Blit2DArray {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(VERTEX_SHADER, ShaderResourceCounts::default())?;
        let fragment = ctx.load_shader(
            FRAGMENT_SHADER,
            ShaderResourceCounts::default().with_samplers(1),
        )?;
        let mut blitter = Blitter::new(ctx)?;
        let images = LAYER_IMAGES
            .iter()
            .map(|file| ctx.load_image(file))
            .collect::<Result<Vec<_>, _>>()?;
        let (width, height) = (images[0].width, images[0].height);
        if images.iter().any(|image| (image.width, image.height) != (width, height)) {
            return Err(ExampleError::Check("array layers differ in size".to_string()));
        }
        let gpu = ctx.gpu;

        let source = array_texture(
            gpu,
            "Blit Source Array",
            width,
            height,
            wgpu::TextureUsages::COPY_DST,
        );
        for (layer, image) in images.iter().enumerate() {
            textured::write_layer(gpu, &source, 0, layer as u32, image);
        }
        let (dst_width, dst_height) = (width / 2, height / 2);
        let destination = array_texture(
            gpu,
            "Blit Destination Array",
            dst_width,
            dst_height,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Blit Array Layers"),
            });
        for layer in 0..LAYER_IMAGES.len() as u32 {
            let src_view = level_view(&source, 0, layer);
            let dst_view = level_view(&destination, 0, layer);
            blitter.blit(
                gpu,
                &mut encoder,
                &BlitInfo {
                    source: &src_view,
                    source_size: (width, height),
                    source_rect: Rect::full(width, height),
                    destination: &dst_view,
                    destination_format: wgpu::TextureFormat::Rgba8Unorm,
                    destination_rect: Rect::full(dst_width, dst_height),
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    filter: wgpu::FilterMode::Linear,
                    flip: FlipMode::empty(),
                },
            );
        }
        gpu.queue.submit(Some(encoder.finish()));

        let layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Textured Quad Array Bindings"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2Array,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("PointClamp"),
            ..Default::default()
        });
        let bind_group = |label, texture: &wgpu::Texture| {
            let view = texture.create_view(&wgpu::TextureViewDescriptor {
                dimension: Some(wgpu::TextureViewDimension::D2Array),
                ..Default::default()
            });
            gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            })
        };
        let source_group = bind_group("Source Array", &source);
        let destination_group = bind_group("Destination Array", &destination);

        let pipeline = build_pipeline(gpu, &vertex, &fragment, &layout);
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Array Quad Vertices"),
                contents: bytemuck::cast_slice(&VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Array Quad Indices"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            });

        self.state = Some(State {
            vertex,
            fragment,
            layout,
            pipeline,
            vertex_buffer,
            index_buffer,
            source_group,
            destination_group,
        });
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        pass.set_pipeline(&state.pipeline);
        pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
        pass.set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        let count = QUAD_INDICES.len() as u32;
        pass.set_bind_group(0, &state.source_group, &[]);
        pass.draw_indexed(0..count, 0, 0..1);
        pass.set_bind_group(0, &state.destination_group, &[]);
        pass.draw_indexed(0..count, 4, 0..1);
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
        let mut changed = false;
        for reloaded in shaders {
            match reloaded.name.as_str() {
                VERTEX_SHADER => state.vertex = reloaded.shader,
                FRAGMENT_SHADER => state.fragment = reloaded.shader,
                _ => continue,
            }
            changed = true;
        }
        if changed {
            state.pipeline = build_pipeline(ctx.gpu, &state.vertex, &state.fragment, &state.layout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quads_split_the_window() {
        let (left, right) = VERTICES.split_at(4);
        assert!(left.iter().all(|v| v.x <= 0.0));
        assert!(right.iter().all(|v| v.x >= 0.0));
        // Same uv layout on both sides.
        for (l, r) in left.iter().zip(right) {
            assert_eq!((l.u, l.v), (r.u, r.v));
        }
    }
}
