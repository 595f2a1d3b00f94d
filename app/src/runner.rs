//! Runs examples in windows, one after another, on a single event loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gpu_examples_shaders::{ShaderHotReloader, ShaderResolver};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::platform::run_on_demand::EventLoopExtRunOnDemand;
use winit::window::{Window, WindowId};

use crate::args::RunnerSettings;
use crate::context::GpuContext;
use crate::error::{AppError, ExampleError};
use crate::example::{Example, ExampleContext, Frame};
use crate::input::{InputState, Key, map_winit_key};
use crate::registry::{ExampleEntry, ExampleRegistry};

/// Owns the event loop and the shader resolver shared by all examples.
pub struct ExampleRunner {
    event_loop: EventLoop<()>,
    settings: RunnerSettings,
    resolver: ShaderResolver,
    content_root: PathBuf,
}

impl ExampleRunner {
    pub fn new(
        settings: RunnerSettings,
        resolver: ShaderResolver,
        content_root: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        let event_loop = EventLoop::new().map_err(|e| AppError::EventLoop(e.to_string()))?;
        Ok(Self {
            event_loop,
            settings,
            resolver,
            content_root: content_root.into(),
        })
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    pub fn resolver(&self) -> &ShaderResolver {
        &self.resolver
    }

    /// Run one example until it is closed, fails or hits the frame limit.
    pub fn run(&mut self, entry: &ExampleEntry) -> Result<(), AppError> {
        log::info!("Running example {}", entry.name);

        let mut app = ExampleApp {
            name: entry.name,
            example: (entry.create)(),
            settings: &self.settings,
            resolver: &self.resolver,
            content_root: &self.content_root,
            gpu: None,
            reloader: None,
            input: InputState::default(),
            frame_number: 0,
            started: false,
            initialized: false,
            finished: false,
            result: Ok(()),
        };

        self.event_loop
            .run_app_on_demand(&mut app)
            .map_err(|e| AppError::EventLoop(e.to_string()))?;

        // Dropping the app closes the window before the next example opens.
        let result = std::mem::replace(&mut app.result, Ok(()));
        drop(app);
        result
    }

    /// Run every registered example in order. Example failures are logged
    /// and skipped; the number of failed examples is returned.
    pub fn run_all(&mut self, registry: &ExampleRegistry) -> Result<usize, AppError> {
        let mut failures = 0;
        for entry in registry.iter() {
            match self.run(entry) {
                Ok(()) => {}
                Err(err @ AppError::Example { .. }) => {
                    log::error!("{err}");
                    failures += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(failures)
    }
}

/// Per-example window state driven by winit.
struct ExampleApp<'a> {
    name: &'static str,
    example: Box<dyn Example>,
    settings: &'a RunnerSettings,
    resolver: &'a ShaderResolver,
    content_root: &'a Path,
    gpu: Option<GpuContext>,
    reloader: Option<ShaderHotReloader>,
    input: InputState,
    frame_number: u64,
    started: bool,
    initialized: bool,
    finished: bool,
    result: Result<(), AppError>,
}

impl ExampleApp<'_> {
    fn start(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        let attributes = Window::default_attributes()
            .with_title(self.name)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.width,
                self.settings.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, AppError::Window(e.to_string()));
                return;
            }
        };

        let gpu = match GpuContext::new(window) {
            Ok(gpu) => gpu,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };

        if self.settings.hot_reload {
            let source_root = self.resolver.config().source_root();
            match ShaderHotReloader::new(&source_root) {
                Ok(reloader) => self.reloader = Some(reloader),
                Err(e) => log::warn!("Shader hot reload disabled: {e}"),
            }
        }

        let gpu = self.gpu.insert(gpu);
        let mut ctx = ExampleContext::new(
            gpu,
            self.resolver,
            self.reloader.as_mut(),
            self.content_root,
        )
        .with_event_loop(event_loop);
        if let Err(e) = self.example.init(&mut ctx) {
            let err = self.example_error(e);
            self.fail(event_loop, err);
            return;
        }
        self.initialized = true;
        gpu.window.request_redraw();
    }

    fn example_error(&self, source: ExampleError) -> AppError {
        AppError::Example {
            name: self.name.to_string(),
            source,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::error!("{err}");
        self.result = Err(err);
        self.finish(event_loop);
    }

    fn finish(&mut self, event_loop: &ActiveEventLoop) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Some(gpu) = &self.gpu {
            gpu.wait_idle();
            if self.initialized {
                self.example.quit(gpu);
            }
        }
        event_loop.exit();
    }

    /// Run one frame. Returns `Ok(false)` when the example should stop.
    fn frame(&mut self) -> Result<bool, ExampleError> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(true);
        };

        if let Some(reloader) = self.reloader.as_mut() {
            let reloaded = reloader.reload(self.resolver, &*gpu);
            if !reloaded.is_empty() {
                let mut ctx =
                    ExampleContext::new(gpu, self.resolver, Some(reloader), self.content_root);
                self.example.shaders_reloaded(&mut ctx, reloaded)?;
            }
        }

        {
            let mut ctx = ExampleContext::new(
                gpu,
                self.resolver,
                self.reloader.as_mut(),
                self.content_root,
            );
            self.example.update(&mut ctx, &self.input)?;
        }
        self.input.clear();

        let surface_texture = match gpu.acquire() {
            Ok(Some(texture)) => texture,
            Ok(None) => return Ok(true),
            Err(e) => return Err(ExampleError::Gpu(format!("failed to acquire swapchain: {e}"))),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let gpu = &*gpu;
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(self.name),
            });
        let mut frame = Frame::new(gpu, &mut encoder, &view, self.frame_number);
        self.example.draw(&mut frame)?;
        let presents = std::mem::take(&mut frame.presents);
        drop(frame);
        gpu.queue.submit(Some(encoder.finish()));
        gpu.window.pre_present_notify();
        surface_texture.present();
        for texture in presents {
            texture.present();
        }

        self.frame_number += 1;
        if let Some(max_frames) = self.settings.max_frames
            && self.frame_number >= max_frames
        {
            log::info!("Reached max frames limit ({}), exiting", max_frames);
            return Ok(false);
        }
        Ok(true)
    }
}

impl ApplicationHandler for ExampleApp<'_> {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        if cause == StartCause::Init {
            self.start(event_loop);
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.start(event_loop);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.finished {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested by {:?}", id);
                self.finish(event_loop);
            }

            // Extra windows follow their size when they acquire a frame.
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu
                    && gpu.window.id() == id
                {
                    gpu.resize(size.width, size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && let PhysicalKey::Code(code) = event.physical_key
                    && let Some(key) = map_winit_key(code)
                {
                    if key == Key::Escape {
                        self.finish(event_loop);
                    } else {
                        self.input.press(key);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                let main_window = self.gpu.as_ref().is_some_and(|gpu| gpu.window.id() == id);
                if !self.initialized || !main_window {
                    return;
                }
                match self.frame() {
                    Ok(true) => {
                        if let Some(gpu) = &self.gpu {
                            gpu.window.request_redraw();
                        }
                    }
                    Ok(false) => self.finish(event_loop),
                    Err(e) => {
                        let err = self.example_error(e);
                        self.fail(event_loop, err);
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.finished
            && let Some(gpu) = &self.gpu
        {
            gpu.window.request_redraw();
        }
    }
}
