//! Textured quad drawing shared by the texture examples.

use gpu_examples_app::{ExampleContext, ExampleError, GpuContext, GpuShader, RenderPipelineDesc, VertexLayout};
use gpu_examples_core::{PositionTextureVertex, RgbaImage};
use gpu_examples_shaders::{ReloadedShader, ShaderResourceCounts};
use wgpu::util::DeviceExt;

pub const VERTEX_SHADER: &str = "TexturedQuad.vert";
pub const FRAGMENT_SHADER: &str = "TexturedQuad.frag";

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Full window quad with texture coordinates running from 0 to `uv_scale`.
pub fn quad_vertices(uv_scale: f32) -> [PositionTextureVertex; 4] {
    [
        PositionTextureVertex::new(-1.0, 1.0, 0.0, 0.0, 0.0),
        PositionTextureVertex::new(1.0, 1.0, 0.0, uv_scale, 0.0),
        PositionTextureVertex::new(1.0, -1.0, 0.0, uv_scale, uv_scale),
        PositionTextureVertex::new(-1.0, -1.0, 0.0, 0.0, uv_scale),
    ]
}

/// Pipeline, geometry and bind group layout for drawing one texture.
pub struct QuadRenderer {
    vertex: GpuShader,
    fragment: GpuShader,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

impl QuadRenderer {
    pub fn new(ctx: &mut ExampleContext<'_>, uv_scale: f32) -> Result<Self, ExampleError> {
        let vertex = ctx.load_shader(VERTEX_SHADER, ShaderResourceCounts::default())?;
        let fragment = ctx.load_shader(
            FRAGMENT_SHADER,
            ShaderResourceCounts::default().with_samplers(1),
        )?;
        let gpu = ctx.gpu;

        let bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Textured Quad Bindings"),
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
                    ],
                });
        let pipeline = build_pipeline(gpu, &vertex, &fragment, &bind_group_layout);

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Textured Quad Vertices"),
                contents: bytemuck::cast_slice(&quad_vertices(uv_scale)),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Textured Quad Indices"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            });

        Ok(Self {
            vertex,
            fragment,
            bind_group_layout,
            pipeline,
            vertex_buffer,
            index_buffer,
        })
    }

    /// Swap in rebuilt quad shaders. Returns whether the pipeline changed.
    pub fn shaders_reloaded(
        &mut self,
        gpu: &GpuContext,
        shaders: Vec<ReloadedShader<GpuShader>>,
    ) -> bool {
        let mut changed = false;
        for reloaded in shaders {
            match reloaded.name.as_str() {
                VERTEX_SHADER => self.vertex = reloaded.shader,
                FRAGMENT_SHADER => self.fragment = reloaded.shader,
                _ => continue,
            }
            changed = true;
        }
        if changed {
            self.pipeline = build_pipeline(gpu, &self.vertex, &self.fragment, &self.bind_group_layout);
        }
        changed
    }

    pub fn bind_group(
        &self,
        gpu: &GpuContext,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Textured Quad Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}

fn build_pipeline(
    gpu: &GpuContext,
    vertex: &GpuShader,
    fragment: &GpuShader,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = VertexLayout::of::<PositionTextureVertex>();
    gpu.create_render_pipeline(&RenderPipelineDesc {
        label: "Textured Quad Pipeline",
        vertex,
        fragment,
        vertex_buffers: &[layout.buffer_layout()],
        bind_group_layouts: &[bind_group_layout],
        primitive: wgpu::PrimitiveState::default(),
    })
}

pub fn texture_extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Create an `Rgba8Unorm` texture holding `image`.
pub fn upload_texture(
    gpu: &GpuContext,
    label: &str,
    image: &RgbaImage,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    let size = texture_extent(image.width, image.height);
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: usage | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    gpu.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_row()),
            rows_per_image: Some(image.height),
        },
        size,
    );
    texture
}

/// Upload `image` into one mip level and array layer of `texture`.
pub fn write_layer(
    gpu: &GpuContext,
    texture: &wgpu::Texture,
    mip_level: u32,
    layer: u32,
    image: &RgbaImage,
) {
    gpu.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_row()),
            rows_per_image: Some(image.height),
        },
        texture_extent(image.width, image.height),
    );
}

/// Row pitch for texture/buffer copies, padded to the copy alignment.
pub fn aligned_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * RgbaImage::BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_bytes_per_row() {
        assert_eq!(aligned_bytes_per_row(64), 256);
        assert_eq!(aligned_bytes_per_row(65), 512);
        assert_eq!(aligned_bytes_per_row(1), 256);
    }

    #[test]
    fn test_quad_winding_and_uvs() {
        let vertices = quad_vertices(4.0);
        assert_eq!(vertices[2].u, 4.0);
        assert_eq!(vertices[2].v, 4.0);
        assert_eq!(vertices[0].x, -1.0);
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < vertices.len()));
    }
}
