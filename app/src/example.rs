//! The example lifecycle and what an example sees of the runner.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gpu_examples_core::{RgbaImage, load_image};
use gpu_examples_shaders::{
    ReloadedShader, ShaderHotReloader, ShaderResolver, ShaderResourceCounts, ShaderStage,
    infer_stage,
};
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::context::{GpuContext, GpuShader};
use crate::error::ExampleError;
use crate::input::InputState;
use crate::window::SurfaceWindow;

/// Directory under the content root holding images.
pub const IMAGES_DIR: &str = "Images";

/// A runnable example.
///
/// Lifecycle: `init` once, then per frame `update` followed by `draw`,
/// then `quit`. Returning an error from any step ends the example.
pub trait Example {
    /// Create GPU resources.
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError>;

    /// React to input collected since the previous frame.
    fn update(
        &mut self,
        _ctx: &mut ExampleContext<'_>,
        _input: &InputState,
    ) -> Result<(), ExampleError> {
        Ok(())
    }

    /// Record this frame's commands.
    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError>;

    /// Shaders rebuilt after their sources changed on disk.
    fn shaders_reloaded(
        &mut self,
        _ctx: &mut ExampleContext<'_>,
        _shaders: Vec<ReloadedShader<GpuShader>>,
    ) -> Result<(), ExampleError> {
        Ok(())
    }

    /// Release resources. The device is idle when this is called.
    fn quit(&mut self, _gpu: &GpuContext) {}
}

/// Access to the GPU, shaders and content during `init` and `update`.
pub struct ExampleContext<'a> {
    pub gpu: &'a GpuContext,
    resolver: &'a ShaderResolver,
    reloader: Option<&'a mut ShaderHotReloader>,
    content_root: &'a Path,
    event_loop: Option<&'a ActiveEventLoop>,
}

impl<'a> ExampleContext<'a> {
    pub fn new(
        gpu: &'a GpuContext,
        resolver: &'a ShaderResolver,
        reloader: Option<&'a mut ShaderHotReloader>,
        content_root: &'a Path,
    ) -> Self {
        Self {
            gpu,
            resolver,
            reloader,
            content_root,
            event_loop: None,
        }
    }

    /// Allow the example to open windows of its own.
    pub fn with_event_loop(mut self, event_loop: &'a ActiveEventLoop) -> Self {
        self.event_loop = Some(event_loop);
        self
    }

    /// Open another window, the size of the main one, drawn with the same device.
    ///
    /// Closing any window ends the example.
    pub fn create_window(&self, title: &str) -> Result<SurfaceWindow, ExampleError> {
        let event_loop = self
            .event_loop
            .ok_or_else(|| ExampleError::Gpu("windows can only be opened during init".to_string()))?;
        let (width, height) = self.gpu.size();
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));
        let window = event_loop
            .create_window(attributes)
            .map_err(|e| ExampleError::Gpu(format!("failed to create window: {e}")))?;
        SurfaceWindow::new(self.gpu, Arc::new(window))
    }

    /// Load a vertex or fragment shader; the stage comes from the name.
    pub fn load_shader(
        &mut self,
        name: &str,
        resources: ShaderResourceCounts,
    ) -> Result<GpuShader, ExampleError> {
        let shader = self.resolver.load_shader(self.gpu, name, resources)?;
        if let Some(stage) = infer_stage(name) {
            self.track(name, stage, resources);
        }
        Ok(shader)
    }

    /// Load a shader with an explicit stage.
    pub fn load_shader_with_stage(
        &mut self,
        name: &str,
        stage: ShaderStage,
        resources: ShaderResourceCounts,
    ) -> Result<GpuShader, ExampleError> {
        let shader = self
            .resolver
            .load_shader_with_stage(self.gpu, name, stage, resources)?;
        self.track(name, stage, resources);
        Ok(shader)
    }

    fn track(&mut self, name: &str, stage: ShaderStage, resources: ShaderResourceCounts) {
        if let Some(reloader) = self.reloader.as_deref_mut() {
            reloader.track(self.resolver, name, stage, resources);
        }
    }

    pub fn image_path(&self, file: &str) -> PathBuf {
        self.content_root.join(IMAGES_DIR).join(file)
    }

    /// Load an image from the content `Images` directory as RGBA8.
    pub fn load_image(&self, file: &str) -> Result<RgbaImage, ExampleError> {
        Ok(load_image(&self.image_path(file))?)
    }
}

/// One frame's recording state.
pub struct Frame<'a> {
    pub gpu: &'a GpuContext,
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// Swapchain view to render into.
    pub target: &'a wgpu::TextureView,
    pub frame_number: u64,
    /// Other windows' textures, presented once the frame is submitted.
    pub(crate) presents: Vec<wgpu::SurfaceTexture>,
}

impl<'a> Frame<'a> {
    pub fn new(
        gpu: &'a GpuContext,
        encoder: &'a mut wgpu::CommandEncoder,
        target: &'a wgpu::TextureView,
        frame_number: u64,
    ) -> Self {
        Self {
            gpu,
            encoder,
            target,
            frame_number,
            presents: Vec::new(),
        }
    }

    /// Present `texture` after this frame's commands are submitted.
    pub fn present_after_submit(&mut self, texture: wgpu::SurfaceTexture) {
        self.presents.push(texture);
    }

    /// Begin a render pass on the swapchain that clears to `clear`.
    pub fn clear_pass(&mut self, clear: wgpu::Color) -> wgpu::RenderPass<'_> {
        let target = self.target;
        self.clear_pass_on(target, clear)
    }

    /// Begin a render pass on any color view that clears to `clear`.
    pub fn clear_pass_on(
        &mut self,
        view: &wgpu::TextureView,
        clear: wgpu::Color,
    ) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Color Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
