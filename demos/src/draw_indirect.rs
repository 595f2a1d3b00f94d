//! Draws a quad and two triangles from argument records in a GPU buffer.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, RenderPipelineDesc,
    VertexLayout,
};
use gpu_examples_core::PositionColorVertex;
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::{DeviceExt, DrawIndexedIndirectArgs, DrawIndirectArgs};

const VERTEX_SHADER: &str = "PositionColor.vert";
const FRAGMENT_SHADER: &str = "SolidColor.frag";

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Indexed quad at 0..4, then two triangles drawn without indices.
const VERTICES: [PositionColorVertex; 10] = [
    PositionColorVertex::new(-1.0, -1.0, 0.0, RED),
    PositionColorVertex::new(1.0, -1.0, 0.0, GREEN),
    PositionColorVertex::new(1.0, 1.0, 0.0, BLUE),
    PositionColorVertex::new(-1.0, 1.0, 0.0, WHITE),
    PositionColorVertex::new(1.0, -1.0, 0.0, GREEN),
    PositionColorVertex::new(0.0, -1.0, 0.0, BLUE),
    PositionColorVertex::new(0.5, 1.0, 0.0, RED),
    PositionColorVertex::new(-1.0, -1.0, 0.0, GREEN),
    PositionColorVertex::new(0.0, -1.0, 0.0, BLUE),
    PositionColorVertex::new(-0.5, 1.0, 0.0, RED),
];

const INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

const INDEXED_ARGS: DrawIndexedIndirectArgs = DrawIndexedIndirectArgs {
    index_count: INDICES.len() as u32,
    instance_count: 1,
    first_index: 0,
    base_vertex: 0,
    first_instance: 0,
};

const TRIANGLE_ARGS: [DrawIndirectArgs; 2] = [
    DrawIndirectArgs {
        vertex_count: 3,
        instance_count: 1,
        first_vertex: 4,
        first_instance: 0,
    },
    DrawIndirectArgs {
        vertex_count: 3,
        instance_count: 1,
        first_vertex: 7,
        first_instance: 0,
    },
];

/// The indirect buffer: one indexed record followed by the triangle records.
pub fn indirect_bytes() -> Vec<u8> {
    let mut bytes = INDEXED_ARGS.as_bytes().to_vec();
    for args in &TRIANGLE_ARGS {
        bytes.extend_from_slice(args.as_bytes());
    }
    bytes
}

/// Byte offset of triangle record `index` in [`indirect_bytes`].
pub fn triangle_offset(index: usize) -> u64 {
    let indexed = std::mem::size_of::<DrawIndexedIndirectArgs>();
    let triangle = std::mem::size_of::<DrawIndirectArgs>();
    (indexed + index * triangle) as u64
}

struct State {
    vertex: GpuShader,
    fragment: GpuShader,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    indirect_buffer: wgpu::Buffer,
}

#[derive(Default)]
pub struct DrawIndirect {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(DrawIndirect::default())
}

fn build_pipeline(gpu: &GpuContext, vertex: &GpuShader, fragment: &GpuShader) -> wgpu::RenderPipeline {
    gpu.create_render_pipeline(&RenderPipelineDesc {
        label: "Draw Indirect",
        vertex,
        fragment,
        vertex_buffers: &[VertexLayout::of::<PositionColorVertex>().buffer_layout()],
        bind_group_layouts: &[],
        primitive: wgpu::PrimitiveState::default(),
    })
}

impl Example for DrawIndirect {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(VERTEX_SHADER, ShaderResourceCounts::default())?;
        let fragment = ctx.load_shader(FRAGMENT_SHADER, ShaderResourceCounts::default())?;
        let gpu = ctx.gpu;
        let pipeline = build_pipeline(gpu, &vertex, &fragment);

        let buffer = |label, contents: &[u8], usage| {
            gpu.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage,
                })
        };
        let vertex_buffer = buffer(
            "Indirect Vertices",
            bytemuck::cast_slice(&VERTICES),
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = buffer(
            "Indirect Indices",
            bytemuck::cast_slice(&INDICES),
            wgpu::BufferUsages::INDEX,
        );
        let indirect_buffer = buffer(
            "Indirect Draws",
            &indirect_bytes(),
            wgpu::BufferUsages::INDIRECT,
        );

        self.state = Some(State {
            vertex,
            fragment,
            pipeline,
            vertex_buffer,
            index_buffer,
            indirect_buffer,
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
        pass.draw_indexed_indirect(&state.indirect_buffer, 0);
        for i in 0..TRIANGLE_ARGS.len() {
            pass.draw_indirect(&state.indirect_buffer, triangle_offset(i));
        }
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
        state.pipeline = build_pipeline(ctx.gpu, &state.vertex, &state.fragment);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indirect_layout() {
        let bytes = indirect_bytes();
        assert_eq!(bytes.len(), 20 + 16 * 2);
        assert_eq!(triangle_offset(0), 20);
        assert_eq!(triangle_offset(1), 36);

        let word = |offset: usize| u32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap());
        // index_count of the indexed record
        assert_eq!(word(0), 6);
        // first_vertex of each triangle record
        assert_eq!(word(20 + 8), 4);
        assert_eq!(word(36 + 8), 7);
    }

    #[test]
    fn test_draws_stay_in_bounds() {
        for args in &TRIANGLE_ARGS {
            assert!((args.first_vertex + args.vertex_count) as usize <= VERTICES.len());
        }
        assert!(INDICES.iter().all(|&i| (i as usize) < 4));
    }
}
