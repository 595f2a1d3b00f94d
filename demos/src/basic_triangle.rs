//! A triangle from a vertex-buffer-less shader.
//!
//! Left toggles wireframe, Down a small viewport, Right a scissor rect.

use gpu_examples_app::{
    Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader, InputState, Key,
    RenderPipelineDesc,
};
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};

const VERTEX_SHADER: &str = "RawTriangle.vert";
const FRAGMENT_SHADER: &str = "SolidColor.frag";

/// x, y, width, height, min depth, max depth
const SMALL_VIEWPORT: [f32; 6] = [160.0, 120.0, 320.0, 240.0, 0.1, 1.0];
const SCISSOR_RECT: [u32; 4] = [320, 240, 320, 240];

struct Pipelines {
    fill: wgpu::RenderPipeline,
    line: Option<wgpu::RenderPipeline>,
}

#[derive(Default)]
pub struct BasicTriangle {
    shaders: Option<(GpuShader, GpuShader)>,
    pipelines: Option<Pipelines>,
    wireframe: bool,
    small_viewport: bool,
    scissor: bool,
}

pub fn create() -> Box<dyn Example> {
    Box::new(BasicTriangle::default())
}

impl BasicTriangle {
    fn build_pipelines(&mut self, gpu: &GpuContext) {
        let Some((vertex, fragment)) = &self.shaders else {
            return;
        };
        let build = |polygon_mode: wgpu::PolygonMode| {
            gpu.create_render_pipeline(&RenderPipelineDesc {
                label: "Basic Triangle",
                vertex,
                fragment,
                vertex_buffers: &[],
                bind_group_layouts: &[],
                primitive: wgpu::PrimitiveState {
                    polygon_mode,
                    ..Default::default()
                },
            })
        };
        self.pipelines = Some(Pipelines {
            fill: build(wgpu::PolygonMode::Fill),
            line: gpu
                .supports_wireframe()
                .then(|| build(wgpu::PolygonMode::Line)),
        });
    }
}

impl Example for BasicTriangle {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let vertex = ctx.load_shader(VERTEX_SHADER, ShaderResourceCounts::default())?;
        let fragment = ctx.load_shader(FRAGMENT_SHADER, ShaderResourceCounts::default())?;
        self.shaders = Some((vertex, fragment));
        self.build_pipelines(ctx.gpu);

        log::info!("Press Left to toggle wireframe mode");
        log::info!("Press Down to toggle small viewport");
        log::info!("Press Right to toggle scissor rect");
        Ok(())
    }

    fn update(&mut self, ctx: &mut ExampleContext<'_>, input: &InputState) -> Result<(), ExampleError> {
        if input.just_pressed(Key::Left) {
            if ctx.gpu.supports_wireframe() {
                self.wireframe = !self.wireframe;
                log::info!("Wireframe: {}", self.wireframe);
            } else {
                log::warn!("Wireframe is not supported by this adapter");
            }
        }
        if input.just_pressed(Key::Down) {
            self.small_viewport = !self.small_viewport;
            log::info!("Small viewport: {}", self.small_viewport);
        }
        if input.just_pressed(Key::Right) {
            self.scissor = !self.scissor;
            log::info!("Scissor rect: {}", self.scissor);
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let (width, height) = frame.gpu.size();
        let Some(pipelines) = &self.pipelines else {
            return Ok(());
        };
        let pipeline = match (&pipelines.line, self.wireframe) {
            (Some(line), true) => line,
            _ => &pipelines.fill,
        };

        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        pass.set_pipeline(pipeline);
        if self.small_viewport {
            let [x, y, w, h, min_depth, max_depth] = SMALL_VIEWPORT;
            if x + w <= width as f32 && y + h <= height as f32 {
                pass.set_viewport(x, y, w, h, min_depth, max_depth);
            }
        }
        if self.scissor {
            // The rect must stay inside the current surface.
            let [x, y, w, h] = SCISSOR_RECT;
            let x = x.min(width);
            let y = y.min(height);
            pass.set_scissor_rect(x, y, w.min(width - x), h.min(height - y));
        }
        pass.draw(0..3, 0..1);
        Ok(())
    }

    fn shaders_reloaded(
        &mut self,
        ctx: &mut ExampleContext<'_>,
        shaders: Vec<ReloadedShader<GpuShader>>,
    ) -> Result<(), ExampleError> {
        if let Some((vertex, fragment)) = &mut self.shaders {
            for reloaded in shaders {
                match reloaded.name.as_str() {
                    VERTEX_SHADER => *vertex = reloaded.shader,
                    FRAGMENT_SHADER => *fragment = reloaded.shader,
                    _ => {}
                }
            }
        }
        self.build_pipelines(ctx.gpu);
        Ok(())
    }
}
