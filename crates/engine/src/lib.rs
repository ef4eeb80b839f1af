pub mod app;

pub use app::{
    run_app, surface_viewport, tile_origin_px, AppError, Clock, ConfigError, Direction,
    DrainQueue, FixedStepScheduler, FrameOutcome, FrameRenderer, FrameReport, FrameScheduler,
    GridSize, InputCapture, Intent, LoopConfig, LoopMetricsSnapshot, ManualClock,
    ManualFrameScheduler, Message, MessageQueue, MessageSink, PixelsRenderer, Position,
    RenderError, SceneView, SimAction, SimEvent, SimulationLoop, SimulationState, SystemClock,
    Viewport, CONFIG_PATH_ENV_VAR, MARKER_COLOR, MAX_TICKS_ENV_VAR, SLOW_FRAME_ENV_VAR,
    TICKS_PER_SECOND, TICK_DURATION, TILE_FILL_COLOR, TILE_OUTLINE_COLOR,
};
