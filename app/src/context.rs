//! GPU context: wgpu instance, surface, device and queue for one window.

use std::borrow::Cow;
use std::sync::Arc;

use gpu_examples_core::{Vertex, VertexAttributeFormat};
use gpu_examples_shaders::{
    ShaderCreateInfo, ShaderDevice, ShaderError, ShaderFormats, ShaderResourceCounts,
    ShaderResult, ShaderStage,
};
use winit::window::Window;

use crate::error::AppError;

/// A shader module created from resolved bytecode.
#[derive(Debug)]
pub struct GpuShader {
    pub module: wgpu::ShaderModule,
    pub entry_point: String,
    pub stage: ShaderStage,
    pub resources: ShaderResourceCounts,
}

impl GpuShader {
    /// Entry point in the form pipeline descriptors take.
    pub fn entry(&self) -> Option<&str> {
        Some(&self.entry_point)
    }
}

/// GPU objects bound to one example window.
pub struct GpuContext {
    pub window: Arc<Window>,
    pub instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Bytecode formats the renderer turns into shader modules.
    pub const SUPPORTED_FORMATS: ShaderFormats = ShaderFormats::SPIRV;

    /// Create a device for `window` and configure its surface.
    pub fn new(window: Arc<Window>) -> Result<Self, AppError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::from_build_config(),
            backend_options: wgpu::BackendOptions::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| AppError::GpuInit(format!("failed to create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| AppError::GpuInit(format!("no compatible GPU adapter: {e}")))?;

        log::info!("wgpu adapter: {:?}", adapter.get_info());

        // Optional features; examples check for them before relying on them.
        let required_features = adapter.features()
            & (wgpu::Features::POLYGON_MODE_LINE
                | wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("GPU Examples Device"),
            required_features,
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| AppError::GpuInit(format!("device creation failed: {e}")))?;

        let config = surface_config(&surface, &adapter, &window)?;
        surface.configure(&device, &config);

        log::info!(
            "Graphics initialized: {}x{} format={:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            window,
            instance,
            surface,
            adapter,
            device,
            queue,
            config,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn supports_wireframe(&self) -> bool {
        self.device.features().contains(wgpu::Features::POLYGON_MODE_LINE)
    }

    /// MSAA sample counts usable for render targets of `format`, ascending.
    ///
    /// Without adapter specific format features only the counts every
    /// device guarantees (1 and 4) are reported.
    pub fn supported_sample_counts(&self, format: wgpu::TextureFormat) -> Vec<u32> {
        if !self
            .device
            .features()
            .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES)
        {
            return vec![1, 4];
        }
        let flags = self.adapter.get_texture_format_features(format).flags;
        [1, 2, 4, 8, 16]
            .into_iter()
            .filter(|&count| flags.sample_count_supported(count))
            .collect()
    }

    /// Reconfigure the surface for a new window size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquire the next swapchain texture.
    ///
    /// Returns `Ok(None)` when the frame should be skipped (surface
    /// reconfigured or timed out).
    pub fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, wgpu::SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                log::debug!("Surface outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring swapchain texture");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Block until all submitted work is done.
    pub fn wait_idle(&self) {
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
    }

    /// Map a `MAP_READ` buffer and copy out its contents.
    pub fn read_buffer(&self, buffer: &wgpu::Buffer) -> Result<Vec<u8>, wgpu::BufferAsyncError> {
        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv().map_err(|_| wgpu::BufferAsyncError)??;

        let data = slice.get_mapped_range().to_vec();
        buffer.unmap();
        Ok(data)
    }
}

/// Surface configuration for `window`: first sRGB format, FIFO present.
pub(crate) fn surface_config(
    surface: &wgpu::Surface<'_>,
    adapter: &wgpu::Adapter,
    window: &Window,
) -> Result<wgpu::SurfaceConfiguration, AppError> {
    let caps = surface.get_capabilities(adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| AppError::GpuInit("surface reports no formats".to_string()))?;
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let size = window.inner_size();
    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::Fifo,
        desired_maximum_frame_latency: 2,
        alpha_mode,
        view_formats: vec![],
    })
}

/// A render pipeline drawing into the swapchain.
pub struct RenderPipelineDesc<'a> {
    pub label: &'a str,
    pub vertex: &'a GpuShader,
    pub fragment: &'a GpuShader,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub primitive: wgpu::PrimitiveState,
}

/// Color target, blending, depth/stencil and multisampling of a pipeline.
///
/// The default draws into the swapchain format without blending, depth or
/// multisampling.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineTarget {
    /// Color format; `None` means the surface format.
    pub format: Option<wgpu::TextureFormat>,
    pub blend: Option<wgpu::BlendState>,
    pub depth_stencil: Option<wgpu::DepthStencilState>,
    pub sample_count: u32,
}

impl Default for PipelineTarget {
    fn default() -> Self {
        Self {
            format: None,
            blend: Some(wgpu::BlendState::REPLACE),
            depth_stencil: None,
            sample_count: 1,
        }
    }
}

impl PipelineTarget {
    pub fn with_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_blend(mut self, blend: wgpu::BlendState) -> Self {
        self.blend = Some(blend);
        self
    }

    pub fn with_depth_stencil(mut self, depth_stencil: wgpu::DepthStencilState) -> Self {
        self.depth_stencil = Some(depth_stencil);
        self
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }
}

impl GpuContext {
    /// Pipeline drawing into the swapchain with the default target state.
    pub fn create_render_pipeline(&self, desc: &RenderPipelineDesc<'_>) -> wgpu::RenderPipeline {
        self.create_render_pipeline_for(desc, &PipelineTarget::default())
    }

    pub fn create_render_pipeline_for(
        &self,
        desc: &RenderPipelineDesc<'_>,
        target: &PipelineTarget,
    ) -> wgpu::RenderPipeline {
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(desc.label),
                bind_group_layouts: desc.bind_group_layouts,
                immediate_size: 0,
            });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &desc.vertex.module,
                    entry_point: desc.vertex.entry(),
                    buffers: desc.vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &desc.fragment.module,
                    entry_point: desc.fragment.entry(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: target.format.unwrap_or(self.config.format),
                        blend: target.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: desc.primitive,
                depth_stencil: target.depth_stencil.clone(),
                multisample: wgpu::MultisampleState {
                    count: target.sample_count,
                    ..Default::default()
                },
                multiview_mask: None,
                cache: None,
            })
    }
}

impl ShaderDevice for GpuContext {
    type Shader = GpuShader;

    fn supported_formats(&self) -> ShaderFormats {
        Self::SUPPORTED_FORMATS
    }

    fn create_shader(&self, info: &ShaderCreateInfo<'_>) -> ShaderResult<GpuShader> {
        let fail = |message: String| ShaderError::CreationFailed {
            name: info.name.to_string(),
            message,
        };

        if info.code.len() % 4 != 0 {
            return Err(fail(format!(
                "SPIR-V length {} is not a multiple of 4",
                info.code.len()
            )));
        }

        // Reject malformed bytecode here instead of tripping the device's
        // uncaptured error handler.
        let module = naga::front::spv::parse_u8_slice(info.code, &naga::front::spv::Options::default())
            .map_err(|e| fail(format!("invalid SPIR-V: {e}")))?;
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| fail(format!("validation error: {e}")))?;
        let naga_stage = info.stage.to_naga();
        if !module
            .entry_points
            .iter()
            .any(|ep| ep.name == info.entry_point && ep.stage == naga_stage)
        {
            return Err(fail(format!(
                "entry point '{}' not found for stage {:?}",
                info.entry_point, info.stage
            )));
        }

        let words: Vec<u32> = bytemuck::pod_collect_to_vec(info.code);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(info.name),
                source: wgpu::ShaderSource::SpirV(Cow::Owned(words)),
            });

        Ok(GpuShader {
            module,
            entry_point: info.entry_point.to_string(),
            stage: info.stage,
            resources: info.resources,
        })
    }
}

/// Owned vertex buffer layout for a [`Vertex`] type.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    pub stride: u64,
    pub step_mode: wgpu::VertexStepMode,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexLayout {
    pub fn of<V: Vertex>() -> Self {
        Self {
            stride: u64::from(V::STRIDE),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: V::ATTRIBUTES
                .iter()
                .map(|attribute| wgpu::VertexAttribute {
                    format: convert_vertex_format(attribute.format),
                    offset: u64::from(attribute.offset),
                    shader_location: attribute.location,
                })
                .collect(),
        }
    }

    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: self.step_mode,
            attributes: &self.attributes,
        }
    }
}

pub fn convert_vertex_format(format: VertexAttributeFormat) -> wgpu::VertexFormat {
    match format {
        VertexAttributeFormat::Float => wgpu::VertexFormat::Float32,
        VertexAttributeFormat::Float2 => wgpu::VertexFormat::Float32x2,
        VertexAttributeFormat::Float3 => wgpu::VertexFormat::Float32x3,
        VertexAttributeFormat::Float4 => wgpu::VertexFormat::Float32x4,
        VertexAttributeFormat::Unorm8x4 => wgpu::VertexFormat::Unorm8x4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpu_examples_core::{PositionColorVertex, PositionTextureVertex};

    #[test]
    fn test_pipeline_target_builder() {
        let target = PipelineTarget::default();
        assert_eq!(target.format, None);
        assert_eq!(target.blend, Some(wgpu::BlendState::REPLACE));
        assert_eq!(target.sample_count, 1);

        let depth = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth16Unorm,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };
        let target = PipelineTarget::default()
            .with_format(wgpu::TextureFormat::Rgba8Unorm)
            .with_blend(wgpu::BlendState::ALPHA_BLENDING)
            .with_depth_stencil(depth.clone())
            .with_sample_count(4);
        assert_eq!(target.format, Some(wgpu::TextureFormat::Rgba8Unorm));
        assert_eq!(target.blend, Some(wgpu::BlendState::ALPHA_BLENDING));
        assert_eq!(target.depth_stencil, Some(depth));
        assert_eq!(target.sample_count, 4);
    }

    #[test]
    fn test_vertex_layout_conversion() {
        let layout = VertexLayout::of::<PositionColorVertex>();
        assert_eq!(layout.stride, 16);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Unorm8x4);
        assert_eq!(layout.attributes[1].offset, 12);

        let layout = VertexLayout::of::<PositionTextureVertex>();
        assert_eq!(layout.buffer_layout().array_stride, 20);
        assert_eq!(layout.attributes[1].shader_location, 1);
    }
}
