//! Draws a clockwise and a counter-clockwise triangle through six pipelines
//! covering every front face and cull mode pairing. Left/Right cycle.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, InputState, Key,
    RenderPipelineDesc, VertexLayout,
};
use gpu_examples_core::PositionColorVertex;
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::DeviceExt;

use crate::cycle;

const VERTEX_SHADER: &str = "PositionColor.vert";
const FRAGMENT_SHADER: &str = "SolidColor.frag";

const MODES: [(&str, wgpu::FrontFace, Option<wgpu::Face>); 6] = [
    ("CCW_CullNone", wgpu::FrontFace::Ccw, None),
    ("CCW_CullFront", wgpu::FrontFace::Ccw, Some(wgpu::Face::Front)),
    ("CCW_CullBack", wgpu::FrontFace::Ccw, Some(wgpu::Face::Back)),
    ("CW_CullNone", wgpu::FrontFace::Cw, None),
    ("CW_CullFront", wgpu::FrontFace::Cw, Some(wgpu::Face::Front)),
    ("CW_CullBack", wgpu::FrontFace::Cw, Some(wgpu::Face::Back)),
];

const CW_VERTICES: [PositionColorVertex; 3] = [
    PositionColorVertex::new(-1.0, -1.0, 0.0, [255, 0, 0, 255]),
    PositionColorVertex::new(1.0, -1.0, 0.0, [0, 255, 0, 255]),
    PositionColorVertex::new(0.0, 1.0, 0.0, [0, 0, 255, 255]),
];

const CCW_VERTICES: [PositionColorVertex; 3] = [
    PositionColorVertex::new(0.0, 1.0, 0.0, [255, 0, 0, 255]),
    PositionColorVertex::new(1.0, -1.0, 0.0, [0, 255, 0, 255]),
    PositionColorVertex::new(-1.0, -1.0, 0.0, [0, 0, 255, 255]),
];

struct State {
    vertex: GpuShader,
    fragment: GpuShader,
    pipelines: Vec<wgpu::RenderPipeline>,
    cw_buffer: wgpu::Buffer,
    ccw_buffer: wgpu::Buffer,
}

#[derive(Default)]
pub struct CullMode {
    state: Option<State>,
    current: usize,
}

pub fn create() -> Box<dyn Example> {
    Box::new(CullMode::default())
}

fn build_pipelines(gpu: &GpuContext, vertex: &GpuShader, fragment: &GpuShader) -> Vec<wgpu::RenderPipeline> {
    let layout = VertexLayout::of::<PositionColorVertex>();
    MODES
        .iter()
        .map(|&(label, front_face, cull_mode)| {
            gpu.create_render_pipeline(&RenderPipelineDesc {
                label,
                vertex,
                fragment,
                vertex_buffers: &[layout.buffer_layout()],
                bind_group_layouts: &[],
                primitive: wgpu::PrimitiveState {
                    front_face,
                    cull_mode,
                    ..Default::default()
                },
            })
        })
        .collect()
}

fn vertex_buffer(gpu: &GpuContext, label: &str, vertices: &[PositionColorVertex]) -> wgpu::Buffer {
    gpu.device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        })
}

impl Example for CullMode {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(VERTEX_SHADER, ShaderResourceCounts::default())?;
        let fragment = ctx.load_shader(FRAGMENT_SHADER, ShaderResourceCounts::default())?;
        let gpu = ctx.gpu;

        self.state = Some(State {
            pipelines: build_pipelines(gpu, &vertex, &fragment),
            cw_buffer: vertex_buffer(gpu, "CW Vertices", &CW_VERTICES),
            ccw_buffer: vertex_buffer(gpu, "CCW Vertices", &CCW_VERTICES),
            vertex,
            fragment,
        });

        log::info!("Press Left/Right to switch between modes");
        log::info!("Current mode: {}", MODES[self.current].0);
        Ok(())
    }

    fn update(&mut self, _ctx: &mut ExampleContext<'_>, input: &InputState) -> Result<(), ExampleError> {
        let previous = self.current;
        if input.just_pressed(Key::Left) {
            self.current = cycle(self.current, MODES.len(), false);
        }
        if input.just_pressed(Key::Right) {
            self.current = cycle(self.current, MODES.len(), true);
        }
        if self.current != previous {
            log::info!("Current mode: {}", MODES[self.current].0);
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let (width, height) = frame.gpu.size();
        let half_width = width as f32 / 2.0;

        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        pass.set_pipeline(&state.pipelines[self.current]);

        pass.set_viewport(0.0, 0.0, half_width, height as f32, 0.0, 1.0);
        pass.set_vertex_buffer(0, state.cw_buffer.slice(..));
        pass.draw(0..3, 0..1);

        pass.set_viewport(half_width, 0.0, half_width, height as f32, 0.0, 1.0);
        pass.set_vertex_buffer(0, state.ccw_buffer.slice(..));
        pass.draw(0..3, 0..1);
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
    fn test_mode_names_are_unique() {
        for (i, a) in MODES.iter().enumerate() {
            assert!(MODES[i + 1..].iter().all(|b| b.0 != a.0));
        }
    }
}
