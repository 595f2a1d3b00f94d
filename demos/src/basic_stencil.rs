//! Masks a full triangle with the stencil written by a smaller one.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, PipelineTarget,
    RenderPipelineDesc, VertexLayout,
};
use gpu_examples_core::PositionColorVertex;
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::DeviceExt;

use crate::textured;

const VERTEX_SHADER: &str = "PositionColor.vert";
const FRAGMENT_SHADER: &str = "SolidColor.frag";

pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Small yellow masker first, then the full maskee.
const VERTICES: [PositionColorVertex; 6] = [
    PositionColorVertex::new(-0.5, -0.5, 0.0, [255, 255, 0, 255]),
    PositionColorVertex::new(0.5, -0.5, 0.0, [255, 255, 0, 255]),
    PositionColorVertex::new(0.0, 0.5, 0.0, [255, 255, 0, 255]),
    PositionColorVertex::new(-1.0, -1.0, 0.0, [255, 0, 0, 255]),
    PositionColorVertex::new(1.0, -1.0, 0.0, [0, 255, 0, 255]),
    PositionColorVertex::new(0.0, 1.0, 0.0, [0, 0, 255, 255]),
];

const MASKER_REFERENCE: u32 = 1;
const MASKEE_REFERENCE: u32 = 0;

/// Never passes; every covered texel takes the reference value.
pub fn masker_stencil() -> wgpu::StencilState {
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::Never,
        fail_op: wgpu::StencilOperation::Replace,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Keep,
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: 0xFF,
        write_mask: 0xFF,
    }
}

/// Front faces draw only where the stencil still equals the reference.
pub fn maskee_stencil() -> wgpu::StencilState {
    let face = |compare| wgpu::StencilFaceState {
        compare,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Keep,
    };
    wgpu::StencilState {
        front: face(wgpu::CompareFunction::Equal),
        back: face(wgpu::CompareFunction::Never),
        read_mask: 0xFF,
        write_mask: 0,
    }
}

fn depth_stencil(stencil: wgpu::StencilState) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::Always,
        stencil,
        bias: wgpu::DepthBiasState::default(),
    }
}

struct Pipelines {
    masker: wgpu::RenderPipeline,
    maskee: wgpu::RenderPipeline,
}

fn build_pipelines(gpu: &GpuContext, vertex: &GpuShader, fragment: &GpuShader) -> Pipelines {
    let layout = VertexLayout::of::<PositionColorVertex>();
    let buffers = [layout.buffer_layout()];
    let build = |label, stencil| {
        gpu.create_render_pipeline_for(
            &RenderPipelineDesc {
                label,
                vertex,
                fragment,
                vertex_buffers: &buffers,
                bind_group_layouts: &[],
                primitive: wgpu::PrimitiveState::default(),
            },
            &PipelineTarget::default().with_depth_stencil(depth_stencil(stencil)),
        )
    };
    Pipelines {
        masker: build("Stencil Masker", masker_stencil()),
        maskee: build("Stencil Maskee", maskee_stencil()),
    }
}

fn depth_stencil_texture(gpu: &GpuContext, (width, height): (u32, u32)) -> wgpu::TextureView {
    gpu.device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Stencil"),
            size: textured::texture_extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

struct State {
    vertex: GpuShader,
    fragment: GpuShader,
    pipelines: Pipelines,
    vertex_buffer: wgpu::Buffer,
    depth_stencil: wgpu::TextureView,
    depth_size: (u32, u32),
}

#[derive(Default)]
pub struct BasicStencil {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(BasicStencil::default())
}

impl Example for BasicStencil {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(VERTEX_SHADER, ShaderResourceCounts::default())?;
        let fragment = ctx.load_shader(FRAGMENT_SHADER, ShaderResourceCounts::default())?;
        let gpu = ctx.gpu;
        let pipelines = build_pipelines(gpu, &vertex, &fragment);
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Stencil Triangles"),
                contents: bytemuck::cast_slice(&VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let depth_size = gpu.size();

        self.state = Some(State {
            vertex,
            fragment,
            pipelines,
            vertex_buffer,
            depth_stencil: depth_stencil_texture(gpu, depth_size),
            depth_size,
        });
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        let size = frame.gpu.size();
        if size != state.depth_size {
            log::debug!("Recreating depth stencil at {}x{}", size.0, size.1);
            state.depth_stencil = depth_stencil_texture(frame.gpu, size);
            state.depth_size = size;
        }

        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Stencil Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &state.depth_stencil,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Discard,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));

        pass.set_pipeline(&state.pipelines.masker);
        pass.set_stencil_reference(MASKER_REFERENCE);
        pass.draw(0..3, 0..1);

        pass.set_pipeline(&state.pipelines.maskee);
        pass.set_stencil_reference(MASKEE_REFERENCE);
        pass.draw(3..6, 0..1);
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
        state.pipelines = build_pipelines(ctx.gpu, &state.vertex, &state.fragment);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masker_writes_reference_everywhere_it_covers() {
        let stencil = masker_stencil();
        assert!(stencil.is_enabled());
        assert_eq!(stencil.front.compare, wgpu::CompareFunction::Never);
        assert_eq!(stencil.front.fail_op, wgpu::StencilOperation::Replace);
        assert_eq!(stencil.front, stencil.back);
        assert_eq!(stencil.write_mask, 0xFF);
        assert_ne!(MASKER_REFERENCE, MASKEE_REFERENCE);
    }

    #[test]
    fn test_maskee_only_reads() {
        let stencil = maskee_stencil();
        assert_eq!(stencil.front.compare, wgpu::CompareFunction::Equal);
        assert_eq!(stencil.back.compare, wgpu::CompareFunction::Never);
        assert_eq!(stencil.write_mask, 0);
        assert!(stencil.is_read_only(None));
    }

    #[test]
    fn test_masker_is_inside_maskee() {
        let (masker, maskee) = VERTICES.split_at(3);
        let bounds = |vs: &[PositionColorVertex]| {
            vs.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v.x), hi.max(v.x)))
        };
        let (inner, outer) = (bounds(masker), bounds(maskee));
        assert!(inner.0 > outer.0 && inner.1 < outer.1);
    }
}
