use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use super::clock::{Clock, FrameScheduler, SystemClock};
use super::config::{ConfigError, LoopConfig};
use super::input::InputCapture;
use super::queue::MessageQueue;
use super::rendering::PixelsRenderer;
use super::sim_loop::{FrameOutcome, SimulationLoop};
use super::TICKS_PER_SECOND;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Frame scheduling through winit: one redraw request per call.
struct WindowFrameScheduler<'a> {
    window: &'a Window,
}

impl FrameScheduler for WindowFrameScheduler<'_> {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

pub fn run_app(config: LoopConfig) -> Result<(), AppError> {
    let grid = config.validate()?;
    let surface = config.surface_viewport(grid)?;

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                surface.width as f64,
                surface.height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );

    let renderer = match PixelsRenderer::new(Arc::clone(&window), surface) {
        Ok(renderer) => Some(renderer),
        Err(error) => {
            warn!(error = %error, "renderer_init_failed");
            None
        }
    };

    let clock = SystemClock::new();
    let messages = MessageQueue::new();
    let mut input = InputCapture::new(messages.sink());
    let mut sim = SimulationLoop::new(&config, clock.now(), messages, renderer)?;
    let slow_frame_delay = config.slow_frame_delay();

    info!(
        columns = grid.columns(),
        rows = grid.rows(),
        tile_size = config.tile_size,
        surface_width = surface.width,
        surface_height = surface.height,
        "scene_loaded"
    );
    info!(
        target_tps = TICKS_PER_SECOND,
        max_ticks_per_frame = %format_tick_cap(config.max_ticks_per_frame()),
        metrics_log_interval_ms = config.metrics_log_interval().as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        "loop_config"
    );

    // Frames come only from explicit redraw requests; the loop re-arms itself.
    event_loop.set_control_flow(ControlFlow::Wait);
    sim.start(&mut WindowFrameScheduler { window: &window });

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    let resized = sim
                        .renderer_mut()
                        .map(|renderer| renderer.resize_surface(new_size.width, new_size.height));
                    if let Some(Err(error)) = resized {
                        sim.surface_lost(&error);
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input.handle_key_event(&event);
                    if input.quit_requested() {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    if !sim.is_running() {
                        return;
                    }
                    if slow_frame_delay > Duration::ZERO {
                        // Debug perturbation to exercise catch-up ticks.
                        thread::sleep(slow_frame_delay);
                    }
                    let mut frames = WindowFrameScheduler { window: &window };
                    if sim.on_frame(clock.now(), &mut frames) == FrameOutcome::Stopped {
                        info!(
                            frames_rendered = sim.frames_rendered(),
                            "frame_chain_stopped"
                        );
                    }
                }
                _ => {}
            },
            Event::LoopExiting => {
                info!(
                    ticks = sim.state().tick_count(),
                    frames_rendered = sim.frames_rendered(),
                    "shutdown"
                );
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn format_tick_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}
