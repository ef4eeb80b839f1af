use std::time::Duration;

use tracing::{info, warn};

use super::clock::FrameScheduler;
use super::config::{ConfigError, LoopConfig};
use super::metrics::{LoopMetricsSnapshot, MetricsAccumulator};
use super::queue::{MessageQueue, MessageSink};
use super::rendering::{FrameRenderer, RenderError, SceneView};
use super::scheduler::{FixedStepScheduler, FrameReport};
use super::simulation::{Position, SimulationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame ran, drew, and asked for the next one.
    Continue(FrameReport),
    /// No surface to draw on; no further frames are requested.
    Stopped,
}

/// Owns everything one running scene needs: the fixed-step scheduler, the
/// simulation state, the capture queue and the renderer.
///
/// A missing renderer means there is no surface. The loop then stops quietly
/// instead of failing.
pub struct SimulationLoop<R> {
    scheduler: FixedStepScheduler,
    state: SimulationState,
    messages: MessageQueue,
    renderer: Option<R>,
    tile_size: u32,
    metrics: MetricsAccumulator,
    last_metrics: Option<LoopMetricsSnapshot>,
    frames_rendered: u64,
}

impl<R: FrameRenderer> SimulationLoop<R> {
    pub fn new(
        config: &LoopConfig,
        start_time: Duration,
        messages: MessageQueue,
        renderer: Option<R>,
    ) -> Result<Self, ConfigError> {
        let grid = config.validate()?;
        Ok(Self {
            scheduler: FixedStepScheduler::new(start_time, config.max_ticks_per_frame()),
            state: SimulationState::new(grid, Position::default()),
            messages,
            renderer,
            tile_size: config.tile_size,
            metrics: MetricsAccumulator::new(start_time, config.metrics_log_interval()),
            last_metrics: None,
            frames_rendered: 0,
        })
    }

    pub fn message_sink(&self) -> MessageSink {
        self.messages.sink()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn scheduler(&self) -> &FixedStepScheduler {
        &self.scheduler
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    pub fn is_running(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Most recent interval published by the `loop_metrics` log line.
    pub fn last_metrics(&self) -> Option<LoopMetricsSnapshot> {
        self.last_metrics
    }

    /// Registers the first frame. Returns `false` when there is nothing to
    /// draw on, in which case no frame is ever requested.
    pub fn start(&mut self, frames: &mut dyn FrameScheduler) -> bool {
        if self.renderer.is_none() {
            warn!("render_surface_missing");
            return false;
        }
        frames.request_frame();
        true
    }

    /// Drops the renderer after its surface went away; later frames stop.
    pub fn surface_lost(&mut self, error: &RenderError) {
        if self.renderer.take().is_some() {
            warn!(error = %error, "render_surface_lost");
        }
    }

    /// One frame callback: advance the simulation, draw once, then request the
    /// next frame.
    pub fn on_frame(
        &mut self,
        timestamp: Duration,
        frames: &mut dyn FrameScheduler,
    ) -> FrameOutcome {
        let Some(renderer) = self.renderer.as_mut() else {
            return FrameOutcome::Stopped;
        };

        let report = self
            .scheduler
            .advance(timestamp, &self.messages, &mut self.state);

        let view = SceneView {
            grid: self.state.grid(),
            tile_size: self.tile_size,
            position: self.state.position(),
        };
        if let Err(error) = renderer.draw(&view) {
            warn!(error = %error, "renderer_draw_failed");
            self.renderer = None;
            return FrameOutcome::Stopped;
        }
        self.frames_rendered = self.frames_rendered.saturating_add(1);

        self.metrics.record_frame(&report);
        if let Some(snapshot) = self.metrics.maybe_snapshot(timestamp) {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                events_applied = snapshot.events_applied,
                col = view.position.col,
                row = view.position.row,
                "loop_metrics"
            );
            self.last_metrics = Some(snapshot);
        }

        frames.request_frame();
        FrameOutcome::Continue(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Clock, Direction, Intent, ManualClock, ManualFrameScheduler, TICK_DURATION};

    #[derive(Debug, Default)]
    struct RecordingRenderer {
        views: Vec<SceneView>,
        fail_after: Option<usize>,
    }

    impl FrameRenderer for RecordingRenderer {
        fn draw(&mut self, view: &SceneView) -> Result<(), RenderError> {
            if self.fail_after == Some(self.views.len()) {
                return Err(RenderError::FrameSizeMismatch {
                    expected_len: 0,
                    actual_len: 0,
                });
            }
            self.views.push(*view);
            Ok(())
        }
    }

    struct Harness {
        clock: ManualClock,
        frames: ManualFrameScheduler,
        sim: SimulationLoop<RecordingRenderer>,
    }

    impl Harness {
        fn new(config: LoopConfig, renderer: Option<RecordingRenderer>) -> Self {
            let clock = ManualClock::new();
            let sim = SimulationLoop::new(&config, clock.now(), MessageQueue::new(), renderer)
                .expect("valid config");
            Self {
                clock,
                frames: ManualFrameScheduler::new(),
                sim,
            }
        }

        fn with_renderer() -> Self {
            Self::new(LoopConfig::default(), Some(RecordingRenderer::default()))
        }

        /// Fires the pending frame after `delta`; returns `None` if the loop
        /// had not asked for one.
        fn step(&mut self, delta: Duration) -> Option<FrameOutcome> {
            if !self.frames.take_request() {
                return None;
            }
            self.clock.advance(delta);
            Some(self.sim.on_frame(self.clock.now(), &mut self.frames))
        }

        fn report(&mut self, delta: Duration) -> FrameReport {
            match self.step(delta) {
                Some(FrameOutcome::Continue(report)) => report,
                other => panic!("frame did not run: {other:?}"),
            }
        }

        fn views(&self) -> &[SceneView] {
            &self.sim.renderer().expect("renderer").views
        }
    }

    #[test]
    fn start_requests_exactly_one_frame() {
        let mut harness = Harness::with_renderer();
        assert!(harness.sim.start(&mut harness.frames));
        assert_eq!(harness.frames.requested_total(), 1);
    }

    #[test]
    fn each_frame_reschedules_itself_and_renders_once() {
        let mut harness = Harness::with_renderer();
        harness.sim.start(&mut harness.frames);

        for _ in 0..5 {
            harness.report(TICK_DURATION);
        }

        assert_eq!(harness.views().len(), 5);
        assert_eq!(harness.sim.frames_rendered(), 5);
        assert!(harness.frames.is_pending());
        assert_eq!(harness.frames.requested_total(), 6);
    }

    #[test]
    fn delayed_frame_catches_up_before_a_single_render() {
        let mut harness = Harness::with_renderer();
        harness.sim.start(&mut harness.frames);

        let report = harness.report(TICK_DURATION * 10);

        assert_eq!(report.ticks_run, 10);
        assert!(report.accumulator < TICK_DURATION);
        assert_eq!(harness.sim.state().tick_count(), 10);
        assert_eq!(harness.views().len(), 1);
    }

    #[test]
    fn frames_without_ticks_still_redraw_unchanged_state() {
        let mut harness = Harness::with_renderer();
        harness.sim.start(&mut harness.frames);

        let first = harness.report(Duration::from_millis(4));
        let second = harness.report(Duration::from_millis(4));

        assert_eq!(first.ticks_run, 0);
        assert_eq!(second.ticks_run, 0);
        let views = harness.views();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0], views[1]);
    }

    #[test]
    fn intents_from_one_frame_net_out_in_order() {
        let config = LoopConfig::default();
        let mut harness = Harness::new(config, Some(RecordingRenderer::default()));
        harness.sim.start(&mut harness.frames);
        let sink = harness.sim.message_sink();

        sink.append(Intent::Move(Direction::Up));
        sink.append(Intent::Move(Direction::Up));
        sink.append(Intent::Move(Direction::Down));
        let report = harness.report(TICK_DURATION);

        assert_eq!(report.events_applied, 3);
        assert_eq!(harness.sim.state().position(), Position::new(0, 1));
        assert_eq!(harness.views()[0].position, Position::new(0, 1));
    }

    #[test]
    fn render_sees_state_after_all_ticks_of_the_frame() {
        let mut harness = Harness::with_renderer();
        harness.sim.start(&mut harness.frames);
        let sink = harness.sim.message_sink();

        sink.append(Intent::Move(Direction::Right));
        harness.report(Duration::from_millis(3));
        assert_eq!(harness.views()[0].position, Position::new(0, 0));

        sink.append(Intent::Move(Direction::Right));
        harness.report(TICK_DURATION * 3);
        assert_eq!(harness.views()[1].position, Position::new(2, 0));
    }

    #[test]
    fn missing_surface_never_schedules_a_frame() {
        let mut harness = Harness::new(LoopConfig::default(), None);

        assert!(!harness.sim.start(&mut harness.frames));
        assert!(!harness.sim.is_running());
        assert_eq!(harness.frames.requested_total(), 0);
        assert_eq!(harness.step(TICK_DURATION), None);
    }

    #[test]
    fn draw_failure_stops_the_frame_chain() {
        let renderer = RecordingRenderer {
            fail_after: Some(2),
            ..RecordingRenderer::default()
        };
        let mut harness = Harness::new(LoopConfig::default(), Some(renderer));
        harness.sim.start(&mut harness.frames);

        harness.report(TICK_DURATION);
        harness.report(TICK_DURATION);
        let outcome = harness.step(TICK_DURATION);

        assert_eq!(outcome, Some(FrameOutcome::Stopped));
        assert!(!harness.sim.is_running());
        assert_eq!(harness.step(TICK_DURATION), None);
        assert_eq!(harness.frames.requested_total(), 3);
    }

    #[test]
    fn surface_loss_reported_by_host_stops_later_frames() {
        let mut harness = Harness::with_renderer();
        harness.sim.start(&mut harness.frames);
        harness.report(TICK_DURATION);

        harness.sim.surface_lost(&RenderError::FrameSizeMismatch {
            expected_len: 4,
            actual_len: 0,
        });

        assert_eq!(harness.step(TICK_DURATION), Some(FrameOutcome::Stopped));
        assert!(!harness.frames.is_pending());
    }

    #[test]
    fn tick_cap_from_config_bounds_catch_up() {
        let config = LoopConfig {
            max_ticks_per_frame: Some(3),
            ..LoopConfig::default()
        };
        let mut harness = Harness::new(config, Some(RecordingRenderer::default()));
        harness.sim.start(&mut harness.frames);

        let report = harness.report(TICK_DURATION * 10);

        assert_eq!(report.ticks_run, 3);
        assert_eq!(report.dropped_backlog, TICK_DURATION * 7);
        assert_eq!(harness.sim.scheduler().accumulator(), Duration::ZERO);
    }

    #[test]
    fn metrics_publish_once_per_interval() {
        let mut harness = Harness::with_renderer();
        harness.sim.start(&mut harness.frames);

        for _ in 0..59 {
            harness.report(TICK_DURATION);
        }
        assert_eq!(harness.sim.last_metrics(), None);

        harness.report(Duration::from_millis(20));
        let metrics = harness.sim.last_metrics().expect("metrics after one second");
        assert!((metrics.fps - 60.0).abs() < 1.0);
        assert!((metrics.tps - 60.0).abs() < 1.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = LoopConfig {
            rows: 0,
            ..LoopConfig::default()
        };
        let result = SimulationLoop::<RecordingRenderer>::new(
            &config,
            Duration::ZERO,
            MessageQueue::new(),
            None,
        );
        assert!(result.is_err());
    }
}
