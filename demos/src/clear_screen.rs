//! Clears the window to a fixed color.

use gpu_examples_app::{Example, ExampleContext, ExampleError, Frame};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.3,
    g: 0.4,
    b: 0.5,
    a: 1.0,
};

#[derive(Default)]
pub struct ClearScreen;

pub fn create() -> Box<dyn Example> {
    Box::new(ClearScreen)
}

impl Example for ClearScreen {
    fn init(&mut self, _ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        frame.clear_pass(CLEAR_COLOR);
        Ok(())
    }
}
