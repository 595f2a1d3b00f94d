//! Blits one texture into the four window quadrants, mirrored each way.

use gpu_examples_app::{Example, ExampleContext, ExampleError, Frame, GpuShader};
use gpu_examples_shaders::ReloadedShader;

use crate::blit::{BlitInfo, Blitter, FlipMode, Rect, level_view};
use crate::textured;

/// Flip per quadrant: top-left, top-right, bottom-left, bottom-right.
pub const QUADRANT_FLIPS: [FlipMode; 4] = [
    FlipMode::empty(),
    FlipMode::HORIZONTAL,
    FlipMode::VERTICAL,
    FlipMode::HORIZONTAL.union(FlipMode::VERTICAL),
];

/// Destination rectangle of quadrant `index` in a `width` x `height` target.
pub fn quadrant(index: usize, width: u32, height: u32) -> Rect {
    let (w, h) = (width / 2, height / 2);
    let x = if index % 2 == 1 { w } else { 0 };
    let y = if index >= 2 { h } else { 0 };
    Rect::new(x, y, w, h)
}

struct State {
    blitter: Blitter,
    texture: wgpu::Texture,
    size: (u32, u32),
}

#[derive(Default)]
pub struct BlitMirror {
    state: Option<State>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(BlitMirror::default())
}

impl Example for BlitMirror {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let blitter = Blitter::new(ctx)?;
        let image = ctx.load_image("ravioli.bmp")?;
        let texture = textured::upload_texture(
            ctx.gpu,
            "Ravioli",
            &image,
            wgpu::TextureUsages::TEXTURE_BINDING,
        );
        self.state = Some(State {
            blitter,
            texture,
            size: (image.width, image.height),
        });
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        let (width, height) = frame.gpu.size();
        let source = level_view(&state.texture, 0, 0);
        for (i, flip) in QUADRANT_FLIPS.into_iter().enumerate() {
            let load = if i == 0 {
                wgpu::LoadOp::Clear(wgpu::Color::BLACK)
            } else {
                wgpu::LoadOp::Load
            };
            state.blitter.blit(
                frame.gpu,
                frame.encoder,
                &BlitInfo {
                    source: &source,
                    source_size: state.size,
                    source_rect: Rect::full(state.size.0, state.size.1),
                    destination: frame.target,
                    destination_format: frame.gpu.surface_format(),
                    destination_rect: quadrant(i, width, height),
                    load,
                    filter: wgpu::FilterMode::Nearest,
                    flip,
                },
            );
        }
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
    fn test_quadrants_tile_the_target() {
        assert_eq!(quadrant(0, 640, 480), Rect::new(0, 0, 320, 240));
        assert_eq!(quadrant(1, 640, 480), Rect::new(320, 0, 320, 240));
        assert_eq!(quadrant(2, 640, 480), Rect::new(0, 240, 320, 240));
        assert_eq!(quadrant(3, 640, 480), Rect::new(320, 240, 320, 240));
    }

    #[test]
    fn test_each_quadrant_mirrors_differently() {
        assert_eq!(QUADRANT_FLIPS[0], FlipMode::empty());
        assert_eq!(QUADRANT_FLIPS[3], FlipMode::all());
        for (i, a) in QUADRANT_FLIPS.iter().enumerate() {
            assert!(QUADRANT_FLIPS[i + 1..].iter().all(|b| a != b));
        }
    }
}
