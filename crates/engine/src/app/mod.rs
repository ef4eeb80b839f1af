mod clock;
mod config;
mod input;
mod loop_runner;
mod metrics;
mod queue;
mod rendering;
mod scheduler;
mod sim_loop;
mod simulation;

pub use clock::{Clock, FrameScheduler, ManualClock, ManualFrameScheduler, SystemClock};
pub use config::{
    ConfigError, LoopConfig, CONFIG_PATH_ENV_VAR, MAX_TICKS_ENV_VAR, SLOW_FRAME_ENV_VAR,
};
pub use input::{Direction, InputCapture, Intent};
pub use loop_runner::{run_app, AppError};
pub use metrics::LoopMetricsSnapshot;
pub use queue::{DrainQueue, Message, MessageQueue, MessageSink};
pub use rendering::{
    surface_viewport, tile_origin_px, FrameRenderer, PixelsRenderer, RenderError, SceneView,
    Viewport, MARKER_COLOR, TILE_FILL_COLOR, TILE_OUTLINE_COLOR,
};
pub use scheduler::{FixedStepScheduler, FrameReport, TICKS_PER_SECOND, TICK_DURATION};
pub use sim_loop::{FrameOutcome, SimulationLoop};
pub use simulation::{GridSize, Position, SimAction, SimEvent, SimulationState};
