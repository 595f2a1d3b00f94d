//! Scaled, filtered and mirrored texture copies drawn as a fullscreen triangle.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use gpu_examples_app::{
    ExampleContext, ExampleError, GpuContext, GpuShader, PipelineTarget, RenderPipelineDesc,
};
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::DeviceExt;

pub const VERTEX_SHADER: &str = "Blit.vert";
pub const FRAGMENT_SHADER: &str = "Blit.frag";

bitflags::bitflags! {
    /// Mirroring applied to the source rectangle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FlipMode: u32 {
        const HORIZONTAL = 1 << 0;
        const VERTICAL = 1 << 1;
    }
}

/// Pixel rectangle inside a texture level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// The whole of a `width` x `height` level.
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// Texture coordinate mapping uploaded to the blit vertex shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlitParams {
    pub src_offset: [f32; 2],
    pub src_scale: [f32; 2],
}

/// Map the viewport's 0..1 range onto `rect` of a `size` texture.
pub fn blit_params(size: (u32, u32), rect: Rect, flip: FlipMode) -> BlitParams {
    let (width, height) = (size.0.max(1) as f32, size.1.max(1) as f32);
    let mut offset = [rect.x as f32 / width, rect.y as f32 / height];
    let mut scale = [rect.w as f32 / width, rect.h as f32 / height];
    if flip.contains(FlipMode::HORIZONTAL) {
        offset[0] += scale[0];
        scale[0] = -scale[0];
    }
    if flip.contains(FlipMode::VERTICAL) {
        offset[1] += scale[1];
        scale[1] = -scale[1];
    }
    BlitParams {
        src_offset: offset,
        src_scale: scale,
    }
}

/// One blit: a single-level, single-layer view on each side.
pub struct BlitInfo<'a> {
    pub source: &'a wgpu::TextureView,
    /// Size of the source view's level.
    pub source_size: (u32, u32),
    pub source_rect: Rect,
    pub destination: &'a wgpu::TextureView,
    pub destination_format: wgpu::TextureFormat,
    pub destination_rect: Rect,
    pub load: wgpu::LoadOp<wgpu::Color>,
    pub filter: wgpu::FilterMode,
    pub flip: FlipMode,
}

/// Draws textures into render targets with per-format pipelines.
pub struct Blitter {
    vertex: GpuShader,
    fragment: GpuShader,
    bind_group_layout: wgpu::BindGroupLayout,
    nearest: wgpu::Sampler,
    linear: wgpu::Sampler,
    pipelines: HashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

impl Blitter {
    pub fn new(ctx: &mut ExampleContext<'_>) -> Result<Self, ExampleError> {
        let vertex = ctx.load_shader(
            VERTEX_SHADER,
            ShaderResourceCounts::default().with_uniform_buffers(1),
        )?;
        let fragment = ctx.load_shader(
            FRAGMENT_SHADER,
            ShaderResourceCounts::default().with_samplers(1),
        )?;
        let gpu = ctx.gpu;

        let bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Blit Bindings"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
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
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::VERTEX,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                    ],
                });

        let sampler = |label, filter| {
            gpu.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                mag_filter: filter,
                min_filter: filter,
                ..Default::default()
            })
        };
        let nearest = sampler("Blit Nearest", wgpu::FilterMode::Nearest);
        let linear = sampler("Blit Linear", wgpu::FilterMode::Linear);

        Ok(Self {
            vertex,
            fragment,
            bind_group_layout,
            nearest,
            linear,
            pipelines: HashMap::new(),
        })
    }

    /// Record `info` into `encoder` as its own render pass.
    pub fn blit(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        info: &BlitInfo<'_>,
    ) {
        let params = blit_params(info.source_size, info.source_rect, info.flip);
        let uniform = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Blit Params"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let sampler = match info.filter {
            wgpu::FilterMode::Nearest => &self.nearest,
            wgpu::FilterMode::Linear => &self.linear,
        };
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(info.source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
            ],
        });

        let pipeline = self.pipeline(gpu, info.destination_format);
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Blit"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: info.destination,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: info.load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        let rect = info.destination_rect;
        pass.set_viewport(
            rect.x as f32,
            rect.y as f32,
            rect.w as f32,
            rect.h as f32,
            0.0,
            1.0,
        );
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    /// Fill mip levels `1..level_count` of a render-attachment texture by
    /// blitting each level from the one above with linear filtering.
    pub fn generate_mipmaps(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
    ) {
        let size = (texture.width(), texture.height());
        for level in 1..texture.mip_level_count() {
            let source = level_view(texture, level - 1, 0);
            let destination = level_view(texture, level, 0);
            let source_size = mip_size(size, level - 1);
            let (width, height) = mip_size(size, level);
            self.blit(
                gpu,
                encoder,
                &BlitInfo {
                    source: &source,
                    source_size,
                    source_rect: Rect::full(source_size.0, source_size.1),
                    destination: &destination,
                    destination_format: texture.format(),
                    destination_rect: Rect::full(width, height),
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    filter: wgpu::FilterMode::Linear,
                    flip: FlipMode::empty(),
                },
            );
        }
    }

    /// Swap in rebuilt blit shaders; returns the shaders it did not use.
    pub fn shaders_reloaded(
        &mut self,
        shaders: Vec<ReloadedShader<GpuShader>>,
    ) -> Vec<ReloadedShader<GpuShader>> {
        let mut rest = Vec::new();
        for reloaded in shaders {
            match reloaded.name.as_str() {
                VERTEX_SHADER => self.vertex = reloaded.shader,
                FRAGMENT_SHADER => self.fragment = reloaded.shader,
                _ => {
                    rest.push(reloaded);
                    continue;
                }
            }
            self.pipelines.clear();
        }
        rest
    }

    fn pipeline(&mut self, gpu: &GpuContext, format: wgpu::TextureFormat) -> &wgpu::RenderPipeline {
        self.pipelines.entry(format).or_insert_with(|| {
            log::debug!("Creating blit pipeline for {:?}", format);
            gpu.create_render_pipeline_for(
                &RenderPipelineDesc {
                    label: "Blit Pipeline",
                    vertex: &self.vertex,
                    fragment: &self.fragment,
                    vertex_buffers: &[],
                    bind_group_layouts: &[&self.bind_group_layout],
                    primitive: wgpu::PrimitiveState::default(),
                },
                &PipelineTarget::default().with_format(format),
            )
        })
    }
}

/// Size of mip `level` of a `size` texture; never below 1x1.
pub fn mip_size(size: (u32, u32), level: u32) -> (u32, u32) {
    ((size.0 >> level).max(1), (size.1 >> level).max(1))
}

/// View of one mip level and array layer, as a blit source or destination.
pub fn level_view(texture: &wgpu::Texture, mip_level: u32, layer: u32) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Blit Level"),
        dimension: Some(wgpu::TextureViewDimension::D2),
        base_mip_level: mip_level,
        mip_level_count: Some(1),
        base_array_layer: layer,
        array_layer_count: Some(1),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_rect_maps_to_unit_square() {
        let params = blit_params((64, 32), Rect::full(64, 32), FlipMode::empty());
        assert_eq!(params.src_offset, [0.0, 0.0]);
        assert_eq!(params.src_scale, [1.0, 1.0]);
    }

    #[test]
    fn test_sub_rect_is_normalized() {
        // Center half of a 640x480 target.
        let params = blit_params((640, 480), Rect::new(160, 0, 320, 240), FlipMode::empty());
        assert_eq!(params.src_offset, [0.25, 0.0]);
        assert_eq!(params.src_scale, [0.5, 0.5]);
    }

    #[test]
    fn test_flips_swap_edges() {
        let rect = Rect::full(16, 16);
        let h = blit_params((16, 16), rect, FlipMode::HORIZONTAL);
        assert_eq!(h.src_offset, [1.0, 0.0]);
        assert_eq!(h.src_scale, [-1.0, 1.0]);

        let v = blit_params((16, 16), rect, FlipMode::VERTICAL);
        assert_eq!(v.src_offset, [0.0, 1.0]);
        assert_eq!(v.src_scale, [1.0, -1.0]);

        let both = blit_params((16, 16), rect, FlipMode::all());
        assert_eq!(both.src_offset, [1.0, 1.0]);
        assert_eq!(both.src_scale, [-1.0, -1.0]);
    }

    #[test]
    fn test_mip_size_halves_and_clamps() {
        assert_eq!(mip_size((32, 32), 0), (32, 32));
        assert_eq!(mip_size((32, 32), 2), (8, 8));
        assert_eq!(mip_size((64, 4), 3), (8, 1));
    }

    #[test]
    fn test_params_fit_uniform_alignment() {
        assert_eq!(std::mem::size_of::<BlitParams>(), 16);
    }
}
