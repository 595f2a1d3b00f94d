//! Additional windows sharing the example's device.

use std::sync::Arc;

use winit::window::Window;

use crate::context::{GpuContext, surface_config};
use crate::error::ExampleError;

/// A window with its own swapchain, rendered with the main device.
pub struct SurfaceWindow {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl SurfaceWindow {
    pub(crate) fn new(gpu: &GpuContext, window: Arc<Window>) -> Result<Self, ExampleError> {
        let surface = gpu
            .instance
            .create_surface(window.clone())
            .map_err(|e| ExampleError::Gpu(format!("failed to create surface: {e}")))?;
        let config = surface_config(&surface, &gpu.adapter, &window)
            .map_err(|e| ExampleError::Gpu(e.to_string()))?;
        surface.configure(&gpu.device, &config);
        log::debug!(
            "Window {:?} configured: {}x{}",
            window.id(),
            config.width,
            config.height
        );
        Ok(Self {
            window,
            surface,
            config,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Acquire the next swapchain texture, following window size changes.
    ///
    /// Returns `Ok(None)` when this frame should skip the window.
    pub fn acquire(
        &mut self,
        gpu: &GpuContext,
    ) -> Result<Option<wgpu::SurfaceTexture>, ExampleError> {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(None);
        }
        if (size.width, size.height) != self.size() {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&gpu.device, &self.config);
        }
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.surface.configure(&gpu.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => Ok(None),
            Err(e) => Err(ExampleError::Gpu(format!(
                "failed to acquire swapchain of {:?}: {e}",
                self.window.id()
            ))),
        }
    }
}
