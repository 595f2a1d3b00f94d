//! Draws a triangle at every supported MSAA sample count and shows a
//! zoomed region of the resolved result.
//!
//! Left/Right cycle the sample count.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, InputState, Key,
    PipelineTarget, RenderPipelineDesc,
};
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};

use crate::blit::{BlitInfo, Blitter, FlipMode, Rect};
use crate::textured;

const VERTEX_SHADER: &str = "RawTriangle.vert";
const FRAGMENT_SHADER: &str = "SolidColor.frag";

const TARGET_SIZE: (u32, u32) = (640, 480);
/// Region of the render target stretched over the window.
pub const ZOOM_RECT: Rect = Rect::new(160, 0, 320, 240);

/// A render target and pipeline for one sample count.
struct Target {
    sample_count: u32,
    view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
}

struct State {
    vertex: GpuShader,
    fragment: GpuShader,
    format: wgpu::TextureFormat,
    targets: Vec<Target>,
    resolve: wgpu::TextureView,
    current: usize,
    blitter: Blitter,
}

#[derive(Default)]
pub struct TriangleMsaa {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(TriangleMsaa::default())
}

fn render_texture(
    gpu: &GpuContext,
    label: &str,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::TextureView {
    // Single-sampled targets are blitted directly.
    let usage = if sample_count == 1 {
        wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING
    } else {
        wgpu::TextureUsages::RENDER_ATTACHMENT
    };
    gpu.device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: textured::texture_extent(TARGET_SIZE.0, TARGET_SIZE.1),
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn build_pipeline(
    gpu: &GpuContext,
    vertex: &GpuShader,
    fragment: &GpuShader,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    gpu.create_render_pipeline_for(
        &RenderPipelineDesc {
            label: "Triangle MSAA",
            vertex,
            fragment,
            vertex_buffers: &[],
            bind_group_layouts: &[],
            primitive: wgpu::PrimitiveState::default(),
        },
        &PipelineTarget::default()
            .with_format(format)
            .with_sample_count(sample_count),
    )
}

impl Example for TriangleMsaa {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(VERTEX_SHADER, ShaderResourceCounts::default())?;
        let fragment = ctx.load_shader(FRAGMENT_SHADER, ShaderResourceCounts::default())?;
        let blitter = Blitter::new(ctx)?;
        let gpu = ctx.gpu;

        let format = gpu.surface_format();
        let targets: Vec<Target> = gpu
            .supported_sample_counts(format)
            .into_iter()
            .map(|sample_count| Target {
                sample_count,
                view: render_texture(gpu, "MSAA Target", format, sample_count),
                pipeline: build_pipeline(gpu, &vertex, &fragment, format, sample_count),
            })
            .collect();
        if targets.is_empty() {
            return Err(ExampleError::Gpu(format!("no usable sample counts for {format:?}")));
        }
        let resolve = render_texture(gpu, "MSAA Resolve", format, 1);

        log::info!(
            "Supported sample counts: {:?}",
            targets.iter().map(|t| t.sample_count).collect::<Vec<_>>()
        );
        log::info!("Press Left/Right to cycle between sample counts");

        self.state = Some(State {
            vertex,
            fragment,
            format,
            targets,
            resolve,
            current: 0,
            blitter,
        });
        Ok(())
    }

    fn update(&mut self, _ctx: &mut ExampleContext<'_>, input: &InputState) -> Result<(), ExampleError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        let forward = input.just_pressed(Key::Right);
        if forward || input.just_pressed(Key::Left) {
            state.current = crate::cycle(state.current, state.targets.len(), forward);
            log::info!("Current sample count: {}", state.targets[state.current].sample_count);
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        let target = &state.targets[state.current];
        let multisampled = target.sample_count > 1;
        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Triangle MSAA"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: multisampled.then_some(&state.resolve),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: if multisampled {
                            wgpu::StoreOp::Discard
                        } else {
                            wgpu::StoreOp::Store
                        },
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&target.pipeline);
            pass.draw(0..3, 0..1);
        }

        let source = if multisampled { &state.resolve } else { &target.view };
        let (width, height) = frame.gpu.size();
        state.blitter.blit(
            frame.gpu,
            frame.encoder,
            &BlitInfo {
                source,
                source_size: TARGET_SIZE,
                source_rect: ZOOM_RECT,
                destination: frame.target,
                destination_format: frame.gpu.surface_format(),
                destination_rect: Rect::full(width, height),
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                filter: wgpu::FilterMode::Linear,
                flip: FlipMode::empty(),
            },
        );
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
        for reloaded in state.blitter.shaders_reloaded(shaders) {
            match reloaded.name.as_str() {
                VERTEX_SHADER => state.vertex = reloaded.shader,
                FRAGMENT_SHADER => state.fragment = reloaded.shader,
                _ => continue,
            }
            changed = true;
        }
        if changed {
            for target in &mut state.targets {
                target.pipeline = build_pipeline(
                    ctx.gpu,
                    &state.vertex,
                    &state.fragment,
                    state.format,
                    target.sample_count,
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_rect_inside_target() {
        assert!(ZOOM_RECT.x + ZOOM_RECT.w <= TARGET_SIZE.0);
        assert!(ZOOM_RECT.y + ZOOM_RECT.h <= TARGET_SIZE.1);
        // Centered horizontally.
        assert_eq!(ZOOM_RECT.x * 2 + ZOOM_RECT.w, TARGET_SIZE.0);
    }

    #[test]
    fn test_sample_count_cycle() {
        let counts = [1, 2, 4, 8];
        let mut current = 0;
        current = crate::cycle(current, counts.len(), false);
        assert_eq!(counts[current], 8);
        current = crate::cycle(current, counts.len(), true);
        assert_eq!(counts[current], 1);
    }
}
