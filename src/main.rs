use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use model_viewer::cli::Cli;
use model_viewer::config::{ViewerConfig, INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH};
use model_viewer::input::PointerInput;
use model_viewer::loaders::{source_for_location, ThreadedLoader};
use model_viewer::loading::LoadPhase;
use model_viewer::renderer::Renderer;
use model_viewer::viewer::Viewer;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    viewer: Viewer,
    pointer: PointerInput,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        let source = source_for_location(&config.asset_root);
        let loader = ThreadedLoader::new(source);
        Self {
            window: None,
            renderer: None,
            viewer: Viewer::new(config, Box::new(loader), INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT),
            pointer: PointerInput::new(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };

        if !renderer.wants_pointer() {
            self.viewer.apply_pointer(&self.pointer);
        }
        self.pointer.reset_deltas();
        self.viewer.tick();

        match renderer.render(&self.viewer, window) {
            Ok(actions) => {
                if actions.reset_camera {
                    self.viewer.reset_camera();
                }
                if actions.toggle_rotation {
                    self.viewer.toggle_rotation();
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window = match event_loop.create_window(
                Window::default_attributes()
                    .with_title("3D Model Viewer")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        INITIAL_WINDOW_WIDTH,
                        INITIAL_WINDOW_HEIGHT,
                    )),
            ) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let config = &self.viewer.config;
            let renderer = match pollster::block_on(Renderer::new(
                window.clone(),
                &self.viewer.scene,
                config.msaa_samples,
                config.show_ui,
            )) {
                Ok(r) => r,
                Err(e) => {
                    log::error!("Failed to initialize renderer: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let size = window.inner_size();
            self.viewer.resize(size.width, size.height);
            self.window = Some(window);
            self.renderer = Some(renderer);
        }

        if self.viewer.load_phase() == LoadPhase::Idle {
            self.viewer.start();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                self.pointer.process_consumed_event(&event);
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
                if self.viewer.resize(size.width, size.height) {
                    log::debug!("Viewport resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => self.pointer.process_event(&other),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = ViewerConfig::default();
    cli.apply(&mut config);
    log::debug!("Viewer config: {}", config.to_json());

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    log::info!("Model viewer - drag to orbit, right-drag to pan, scroll to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
