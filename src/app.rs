use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::input::Input;
use crate::renderer::Renderer;
use crate::settings::{Config, Settings};

/// Interval between movement ticks (60 Hz).
pub const TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Opens a window for `settings` and runs until it is closed.
///
/// `settings_path` is re-read when the operator presses F5.
///
/// | Key            | Action                         |
/// |----------------|--------------------------------|
/// | W/A/S/D        | Fly forward/left/back/right    |
/// | Space / Ctrl   | Fly up / down                  |
/// | Left drag      | Turn the camera                |
/// | F5             | Reload settings and scene      |
/// | F12            | Save a snapshot                |
/// | Escape         | Quit                           |
pub fn run(settings_path: PathBuf, settings: Settings) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = SceneryApp::Pending {
        settings_path,
        settings: Some(settings),
    };
    event_loop.run_app(&mut app)
}

enum SceneryApp {
    Pending {
        settings_path: PathBuf,
        settings: Option<Settings>,
    },
    Running {
        window: Arc<Window>,
        renderer: Renderer,
        input: Input,
        settings_path: PathBuf,
        last_tick: Instant,
    },
}

impl SceneryApp {
    /// Re-reads the settings file; the scene is always reloaded from disk.
    fn reload(renderer: &mut Renderer, settings_path: &Path) {
        let settings = match Settings::load_or_default(settings_path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("failed to reload {}: {e}", settings_path.display());
                return;
            }
        };
        log::info!("reloaded settings from {}", settings_path.display());

        let same_scene = renderer.settings().scene_file == settings.scene_file;
        renderer.apply_settings(settings);
        if same_scene {
            renderer.reload_scene();
        }
    }
}

impl ApplicationHandler for SceneryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let SceneryApp::Pending {
            settings_path,
            settings,
        } = self
        else {
            return;
        };
        let Some(settings) = settings.take() else {
            return;
        };
        let settings_path = std::mem::take(settings_path);

        let window_attrs = WindowAttributes::default()
            .with_title(&settings.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                settings.window.width,
                settings.window.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let renderer = match Renderer::new(window.clone(), settings) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("failed to initialize renderer: {e}");
                event_loop.exit();
                return;
            }
        };

        let now = Instant::now();
        event_loop.set_control_flow(ControlFlow::WaitUntil(now + TICK_INTERVAL));
        window.request_redraw();

        *self = SceneryApp::Running {
            window,
            renderer,
            input: Input::new(),
            settings_path,
            last_tick: now,
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let SceneryApp::Running {
            window,
            renderer,
            input,
            ..
        } = self
        else {
            return;
        };

        input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                renderer.resize(size.width, size.height);
                window.request_redraw();
            }
            WindowEvent::CursorMoved { .. } => {
                if let Some(drag) = input.take_drag() {
                    renderer.orbit(drag.x, drag.y);
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = renderer.paint() {
                    log::error!("frame failed: {e}");
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let SceneryApp::Running {
            window,
            renderer,
            input,
            settings_path,
            last_tick,
        } = self
        else {
            return;
        };

        let now = Instant::now();
        if now < *last_tick + TICK_INTERVAL {
            event_loop.set_control_flow(ControlFlow::WaitUntil(*last_tick + TICK_INTERVAL));
            return;
        }
        let dt = now.duration_since(*last_tick).as_secs_f32();
        *last_tick = now;

        if input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }

        let mut changed = false;
        if input.key_pressed(KeyCode::F5) {
            Self::reload(renderer, settings_path);
            changed = true;
        }
        if input.key_pressed(KeyCode::F12) {
            let path = renderer.settings().snapshot_path.clone();
            if let Err(e) = renderer.snapshot(&path) {
                log::error!("snapshot failed: {e}");
            }
        }
        changed |= renderer.tick(input, dt);
        input.end_tick();

        if changed {
            window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(now + TICK_INTERVAL));
    }
}
