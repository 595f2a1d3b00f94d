//! Instanced drawing with optional index buffer and vertex/index offsets.
//!
//! Left toggles the vertex offset, Right the index offset and Up switches
//! between indexed and non-indexed draws.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, InputState, Key,
    RenderPipelineDesc, VertexLayout,
};
use gpu_examples_core::PositionColorVertex;
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::DeviceExt;

const VERTEX_SHADER: &str = "PositionColorInstanced.vert";
const FRAGMENT_SHADER: &str = "SolidColor.frag";

const INSTANCE_COUNT: u32 = 16;
const VERTEX_OFFSET: i32 = 3;
const INDEX_OFFSET: u32 = 3;

const VERTICES: [PositionColorVertex; 9] = [
    PositionColorVertex::new(-1.0, -1.0, 0.0, [255, 0, 0, 255]),
    PositionColorVertex::new(1.0, -1.0, 0.0, [0, 255, 0, 255]),
    PositionColorVertex::new(0.0, 1.0, 0.0, [0, 0, 255, 255]),
    PositionColorVertex::new(-1.0, -1.0, 0.0, [255, 165, 0, 255]),
    PositionColorVertex::new(1.0, -1.0, 0.0, [0, 128, 0, 255]),
    PositionColorVertex::new(0.0, 1.0, 0.0, [0, 255, 255, 255]),
    PositionColorVertex::new(-1.0, -1.0, 0.0, [255, 255, 255, 255]),
    PositionColorVertex::new(1.0, -1.0, 0.0, [255, 255, 255, 255]),
    PositionColorVertex::new(0.0, 1.0, 0.0, [255, 255, 255, 255]),
];

const INDICES: [u16; 6] = [0, 1, 2, 3, 4, 5];

struct State {
    vertex: GpuShader,
    fragment: GpuShader,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

pub struct InstancedIndexed {
    state: Option<State>,
    use_vertex_offset: bool,
    use_index_offset: bool,
    use_index_buffer: bool,
}

impl Default for InstancedIndexed {
    fn default() -> Self {
        Self {
            state: None,
            use_vertex_offset: false,
            use_index_offset: false,
            use_index_buffer: true,
        }
    }
}

pub fn create() -> Box<dyn Example> {
    Box::new(InstancedIndexed::default())
}

fn build_pipeline(gpu: &GpuContext, vertex: &GpuShader, fragment: &GpuShader) -> wgpu::RenderPipeline {
    let layout = VertexLayout::of::<PositionColorVertex>();
    gpu.create_render_pipeline(&RenderPipelineDesc {
        label: "Instanced Indexed",
        vertex,
        fragment,
        vertex_buffers: &[layout.buffer_layout()],
        bind_group_layouts: &[],
        primitive: wgpu::PrimitiveState::default(),
    })
}

impl InstancedIndexed {
    fn log_state(&self) {
        log::info!(
            "Vertex offset: {}, index offset: {}, index buffer: {}",
            self.use_vertex_offset,
            self.use_index_offset,
            self.use_index_buffer
        );
    }
}

impl Example for InstancedIndexed {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(VERTEX_SHADER, ShaderResourceCounts::default())?;
        let fragment = ctx.load_shader(FRAGMENT_SHADER, ShaderResourceCounts::default())?;
        let device = &ctx.gpu.device;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instanced Vertices"),
            contents: bytemuck::cast_slice(&VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instanced Indices"),
            contents: bytemuck::cast_slice(&INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.state = Some(State {
            pipeline: build_pipeline(ctx.gpu, &vertex, &fragment),
            vertex,
            fragment,
            vertex_buffer,
            index_buffer,
        });

        log::info!("Press Left to toggle vertex offset");
        log::info!("Press Right to toggle index offset");
        log::info!("Press Up to toggle index buffer");
        self.log_state();
        Ok(())
    }

    fn update(&mut self, _ctx: &mut ExampleContext<'_>, input: &InputState) -> Result<(), ExampleError> {
        let mut changed = false;
        if input.just_pressed(Key::Left) {
            self.use_vertex_offset = !self.use_vertex_offset;
            changed = true;
        }
        if input.just_pressed(Key::Right) {
            self.use_index_offset = !self.use_index_offset;
            changed = true;
        }
        if input.just_pressed(Key::Up) {
            self.use_index_buffer = !self.use_index_buffer;
            changed = true;
        }
        if changed {
            self.log_state();
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let vertex_offset = if self.use_vertex_offset { VERTEX_OFFSET } else { 0 };
        let index_offset = if self.use_index_offset { INDEX_OFFSET } else { 0 };

        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        pass.set_pipeline(&state.pipeline);
        pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
        if self.use_index_buffer {
            pass.set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(index_offset..index_offset + 3, vertex_offset, 0..INSTANCE_COUNT);
        } else {
            let first = vertex_offset as u32;
            pass.draw(first..first + 3, 0..INSTANCE_COUNT);
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
    fn test_offsets_stay_in_range() {
        let max_index = INDICES[(INDEX_OFFSET + 2) as usize] as i32 + VERTEX_OFFSET;
        assert!((max_index as usize) < VERTICES.len());
    }
}
