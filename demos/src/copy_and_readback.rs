//! Copies a texture and a buffer on the GPU, reads both copies back and
//! checks them against the uploaded bytes, then shows the copied texture.

use gpu_examples_app::{Example, ExampleContext, ExampleError, Frame, GpuContext, GpuShader};
use gpu_examples_core::RgbaImage;
use gpu_examples_shaders::ReloadedShader;
use wgpu::util::DeviceExt;

use crate::textured::{self, QuadRenderer};

const IMAGE: &str = "ravioli.bmp";

/// Drop the per-row padding of a texture readback.
fn unpad_rows(data: &[u8], padded_row: usize, row: usize) -> Vec<u8> {
    data.chunks(padded_row)
        .flat_map(|chunk| &chunk[..row.min(chunk.len())])
        .copied()
        .collect()
}

fn readback_buffer(gpu: &GpuContext, label: &str, size: u64) -> wgpu::Buffer {
    gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn read(gpu: &GpuContext, buffer: &wgpu::Buffer) -> Result<Vec<u8>, ExampleError> {
    gpu.read_buffer(buffer)
        .map_err(|e| ExampleError::Gpu(format!("readback failed: {e}")))
}

fn report(what: &str, matches: bool) {
    if matches {
        log::info!("{what} copy: SUCCESS");
    } else {
        log::error!("{what} copy: FAILURE");
    }
}

struct State {
    quad: QuadRenderer,
    bind_group: wgpu::BindGroup,
}

#[derive(Default)]
pub struct CopyAndReadback {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(CopyAndReadback::default())
}

impl CopyAndReadback {
    /// Run the copies and compare. Returns the copied texture.
    fn copy_and_check(gpu: &GpuContext, image: &RgbaImage) -> Result<wgpu::Texture, ExampleError> {
        let extent = textured::texture_extent(image.width, image.height);
        let byte_len = image.byte_len() as u64;
        let padded_row = textured::aligned_bytes_per_row(image.width);

        let original_texture =
            textured::upload_texture(gpu, "Original Texture", image, wgpu::TextureUsages::COPY_SRC);
        let copied_texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Copied Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let original_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Original Buffer"),
                contents: &image.pixels,
                usage: wgpu::BufferUsages::COPY_SRC,
            });
        let copied_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Copied Buffer"),
            size: byte_len,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let texture_readback = readback_buffer(
            gpu,
            "Texture Readback",
            u64::from(padded_row) * u64::from(image.height),
        );
        let buffer_readback = readback_buffer(gpu, "Buffer Readback", byte_len);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Copy And Readback"),
            });
        encoder.copy_texture_to_texture(
            original_texture.as_image_copy(),
            copied_texture.as_image_copy(),
            extent,
        );
        encoder.copy_buffer_to_buffer(&original_buffer, 0, &copied_buffer, 0, byte_len);
        encoder.copy_texture_to_buffer(
            copied_texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &texture_readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(image.height),
                },
            },
            extent,
        );
        encoder.copy_buffer_to_buffer(&copied_buffer, 0, &buffer_readback, 0, byte_len);
        gpu.queue.submit(Some(encoder.finish()));

        let texture_bytes = unpad_rows(
            &read(gpu, &texture_readback)?,
            padded_row as usize,
            image.bytes_per_row() as usize,
        );
        report("Texture", texture_bytes == image.pixels);

        let buffer_bytes = read(gpu, &buffer_readback)?;
        report("Buffer", buffer_bytes == image.pixels);

        Ok(copied_texture)
    }
}

impl Example for CopyAndReadback {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let quad = QuadRenderer::new(ctx, 1.0)?;
        let image = ctx.load_image(IMAGE)?;
        let gpu = ctx.gpu;

        let texture = Self::copy_and_check(gpu, &image)?;
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("PointClamp"),
            ..Default::default()
        });
        let bind_group = quad.bind_group(gpu, &view, &sampler);

        self.state = Some(State { quad, bind_group });
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        state.quad.draw(&mut pass, &state.bind_group);
        Ok(())
    }

    fn shaders_reloaded(
        &mut self,
        ctx: &mut ExampleContext<'_>,
        shaders: Vec<ReloadedShader<GpuShader>>,
    ) -> Result<(), ExampleError> {
        if let Some(state) = &mut self.state {
            state.quad.shaders_reloaded(ctx.gpu, shaders);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpad_rows() {
        let padded = [1, 2, 0, 0, 3, 4, 0, 0];
        assert_eq!(unpad_rows(&padded, 4, 2), vec![1, 2, 3, 4]);
        assert_eq!(unpad_rows(&padded, 4, 4), padded.to_vec());
    }
}
