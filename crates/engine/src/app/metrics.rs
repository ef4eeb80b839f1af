use std::time::Duration;

use super::scheduler::FrameReport;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub events_applied: u64,
}

/// Frame/tick counters over a rolling interval of clock time.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Duration,
    interval: Duration,
    frames: u32,
    ticks: u32,
    events_applied: u64,
    frame_time_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(start: Duration, interval: Duration) -> Self {
        Self {
            interval_start: start,
            interval,
            frames: 0,
            ticks: 0,
            events_applied: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, report: &FrameReport) {
        self.frames = self.frames.saturating_add(1);
        self.ticks = self.ticks.saturating_add(report.ticks_run);
        self.events_applied = self
            .events_applied
            .saturating_add(report.events_applied as u64);
        self.frame_time_sum = self.frame_time_sum.saturating_add(report.frame_delta);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Duration) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_sub(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            events_applied: self.events_applied,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.events_applied = 0;
        self.frame_time_sum = Duration::ZERO;

        Some(snapshot)
    }
}
