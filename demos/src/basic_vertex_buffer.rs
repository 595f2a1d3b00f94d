//! A triangle read from a vertex buffer.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, RenderPipelineDesc,
    VertexLayout,
};
use gpu_examples_core::PositionColorVertex;
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::DeviceExt;

const VERTEX_SHADER: &str = "PositionColor.vert";
const FRAGMENT_SHADER: &str = "SolidColor.frag";

const VERTICES: [PositionColorVertex; 3] = [
    PositionColorVertex::new(-1.0, -1.0, 0.0, [255, 0, 0, 255]),
    PositionColorVertex::new(1.0, -1.0, 0.0, [0, 255, 0, 255]),
    PositionColorVertex::new(0.0, 1.0, 0.0, [0, 0, 255, 255]),
];

struct State {
    vertex: GpuShader,
    fragment: GpuShader,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
}

#[derive(Default)]
pub struct BasicVertexBuffer {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(BasicVertexBuffer::default())
}

fn build_pipeline(gpu: &GpuContext, vertex: &GpuShader, fragment: &GpuShader) -> wgpu::RenderPipeline {
    let layout = VertexLayout::of::<PositionColorVertex>();
    gpu.create_render_pipeline(&RenderPipelineDesc {
        label: "Basic Vertex Buffer",
        vertex,
        fragment,
        vertex_buffers: &[layout.buffer_layout()],
        bind_group_layouts: &[],
        primitive: wgpu::PrimitiveState::default(),
    })
}

impl Example for BasicVertexBuffer {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(VERTEX_SHADER, ShaderResourceCounts::default())?;
        let fragment = ctx.load_shader(FRAGMENT_SHADER, ShaderResourceCounts::default())?;
        let pipeline = build_pipeline(ctx.gpu, &vertex, &fragment);
        let vertex_buffer = ctx
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Triangle Vertices"),
                contents: bytemuck::cast_slice(&VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });

        self.state = Some(State {
            vertex,
            fragment,
            pipeline,
            vertex_buffer,
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
        pass.draw(0..VERTICES.len() as u32, 0..1);
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
