//! Clears two windows, each to its own color, in one frame.

use gpu_examples_app::{Example, ExampleContext, ExampleError, Frame, GpuContext, SurfaceWindow};

const MAIN_COLOR: wgpu::Color = wgpu::Color {
    r: 0.3,
    g: 0.4,
    b: 0.5,
    a: 1.0,
};

const SECOND_COLOR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 0.5,
    b: 0.6,
    a: 1.0,
};

#[derive(Default)]
pub struct ClearScreenMultiWindow {
    second: Option<SurfaceWindow>,
}

pub fn create() -> Box<dyn Example> {
    Box::new(ClearScreenMultiWindow::default())
}

impl Example for ClearScreenMultiWindow {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        self.second = Some(ctx.create_window("ClearScreenMultiWindow (2)")?);
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        frame.clear_pass(MAIN_COLOR);

        let Some(second) = &mut self.second else {
            return Ok(());
        };
        if let Some(texture) = second.acquire(frame.gpu)? {
            let view = texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            frame.clear_pass_on(&view, SECOND_COLOR);
            frame.present_after_submit(texture);
        }
        Ok(())
    }

    fn quit(&mut self, _gpu: &GpuContext) {
        self.second = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_use_distinct_opaque_colors() {
        assert_ne!(MAIN_COLOR, SECOND_COLOR);
        assert_eq!(MAIN_COLOR.a, 1.0);
        assert_eq!(SECOND_COLOR.a, 1.0);
    }

    #[test]
    fn test_starts_without_second_window() {
        let example = ClearScreenMultiWindow::default();
        assert!(example.second.is_none());
    }
}
