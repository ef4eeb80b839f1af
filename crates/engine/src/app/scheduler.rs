use std::time::Duration;

use tracing::{debug, warn};

use super::queue::MessageQueue;
use super::simulation::SimulationState;

pub const TICKS_PER_SECOND: u32 = 60;
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICKS_PER_SECOND as u64);

/// What one frame callback did to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame_delta: Duration,
    pub events_promoted: usize,
    pub ticks_run: u32,
    pub events_applied: usize,
    pub dropped_backlog: Duration,
    pub accumulator: Duration,
}

/// Converts variable frame deltas into whole fixed ticks.
///
/// Unconsumed time carries over between frames; after every frame the
/// accumulator is below [`TICK_DURATION`].
#[derive(Debug)]
pub struct FixedStepScheduler {
    accumulator: Duration,
    previous_time: Duration,
    max_ticks_per_frame: Option<u32>,
}

impl FixedStepScheduler {
    pub fn new(start_time: Duration, max_ticks_per_frame: Option<u32>) -> Self {
        Self {
            accumulator: Duration::ZERO,
            previous_time: start_time,
            max_ticks_per_frame: max_ticks_per_frame.filter(|cap| *cap > 0),
        }
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    pub fn previous_time(&self) -> Duration {
        self.previous_time
    }

    /// Runs the simulation side of one frame: promote this frame's messages,
    /// then run every tick the accumulated time pays for.
    pub fn advance(
        &mut self,
        timestamp: Duration,
        messages: &MessageQueue,
        state: &mut SimulationState,
    ) -> FrameReport {
        let frame_delta = timestamp.saturating_sub(self.previous_time);
        self.accumulator = self.accumulator.saturating_add(frame_delta);

        let events_promoted = messages.drain_each(|message| state.promote(message));
        if events_promoted > 0 {
            debug!(
                events_promoted,
                pending_events = state.pending_events(),
                "messages_promoted"
            );
        }

        let step_plan = plan_sim_steps(self.accumulator, TICK_DURATION, self.max_ticks_per_frame);
        let mut events_applied = 0usize;
        for _ in 0..step_plan.ticks_to_run {
            events_applied = events_applied.saturating_add(state.run_tick());
        }
        self.accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame = self.max_ticks_per_frame.unwrap_or_default(),
                "sim_clamp_triggered"
            );
        }

        self.previous_time = timestamp;

        FrameReport {
            frame_delta,
            events_promoted,
            ticks_run: step_plan.ticks_to_run,
            events_applied,
            dropped_backlog: step_plan.dropped_backlog,
            accumulator: self.accumulator,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: Option<u32>,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    let under_cap = |ticks: u32| max_ticks_per_frame.map_or(true, |max| ticks < max);

    while accumulator >= fixed_dt && under_cap(ticks_to_run) {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}
