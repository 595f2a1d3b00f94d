//! Generates a mip chain on the GPU and shows the smallest level stretched.

use gpu_examples_app::{Example, ExampleContext, ExampleError, Frame, GpuShader};
use gpu_examples_shaders::ReloadedShader;

use crate::blit::{BlitInfo, Blitter, FlipMode, Rect, level_view, mip_size};
use crate::textured;

const IMAGE: &str = "cube0.bmp";
const MIP_LEVELS: u32 = 3;
const SHOWN_LEVEL: u32 = MIP_LEVELS - 1;

struct State {
    blitter: Blitter,
    texture: wgpu::Texture,
}

#[derive(Default)]
pub struct GenerateMipmaps {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(GenerateMipmaps::default())
}

impl Example for GenerateMipmaps {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let mut blitter = Blitter::new(ctx)?;
        let image = ctx.load_image(IMAGE)?;
        let gpu = ctx.gpu;

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Mipmapped Cube"),
            size: textured::texture_extent(image.width, image.height),
            mip_level_count: MIP_LEVELS,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        textured::write_layer(gpu, &texture, 0, 0, &image);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Generate Mipmaps"),
            });
        blitter.generate_mipmaps(gpu, &mut encoder, &texture);
        gpu.queue.submit(Some(encoder.finish()));
        log::info!("Generated {} mip levels for {}", MIP_LEVELS, IMAGE);

        self.state = Some(State { blitter, texture });
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        let (width, height) = frame.gpu.size();
        let size = (state.texture.width(), state.texture.height());
        let shown = mip_size(size, SHOWN_LEVEL);
        let source = level_view(&state.texture, SHOWN_LEVEL, 0);
        state.blitter.blit(
            frame.gpu,
            frame.encoder,
            &BlitInfo {
                source: &source,
                source_size: shown,
                source_rect: Rect::full(shown.0, shown.1),
                destination: frame.target,
                destination_format: frame.gpu.surface_format(),
                destination_rect: Rect::full(width, height),
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                filter: wgpu::FilterMode::Nearest,
                flip: FlipMode::empty(),
            },
        );
        Ok(())
    }

    fn shaders_reloaded(
        &mut self,
        _ctx: &mut ExampleContext<'_>,
        shaders: Vec<ReloadedShader<GpuShader>>,
    ) -> Result<(), ExampleError> {
        if let Some(state) = &mut self.state {
            state.blitter.shaders_reloaded(shaders);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shown_level_is_smallest_generated() {
        // cube0.bmp is 32x32.
        assert_eq!(mip_size((32, 32), SHOWN_LEVEL), (8, 8));
        let full_chain = 32u32.ilog2() + 1;
        assert!(MIP_LEVELS <= full_chain);
    }
}
