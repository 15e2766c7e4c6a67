use std::time::Duration;

/// What a frame loop asks the client to run for one host frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTicks {
    /// Number of fixed update steps to run, in order.
    pub updates: u32,
    /// Whether a render pass follows the updates.
    pub render: bool,
    /// Render delta in seconds (real elapsed time, capped).
    pub delta: f64,
}

impl FrameTicks {
    /// A frame that runs nothing.
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Frame loop driver: decides how many update/render phases run per host frame.
///
/// The loop does not guard its own transitions: callers must not `start()` a
/// running loop or `stop()` a stopped one.
pub trait FrameLoop {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;

    /// Feed real elapsed time since the previous host frame.
    fn advance(&mut self, elapsed: Duration) -> FrameTicks;
}

/// Fixed-timestep loop with an accumulator.
///
/// Elapsed time is capped at `max_frame_time` before it is accumulated so a
/// long stall cannot trigger an unbounded burst of catch-up steps. Starting
/// the loop clears the accumulator, and the first `advance` after a start
/// counts as zero elapsed time: the host's elapsed for that frame spans the
/// stopped period, which a resumed loop never replays.
#[derive(Debug, Clone)]
pub struct FixedStepLoop {
    fixed_dt: f64,
    max_frame_time: f64,
    accumulator: f64,
    running: bool,
    just_started: bool,
    total_steps: u64,
    frames: u64,
}

impl FixedStepLoop {
    pub fn new(tick_rate_hz: f64, max_frame_time: f64) -> Self {
        let hz = if tick_rate_hz.is_finite() && tick_rate_hz > 0.0 {
            tick_rate_hz
        } else {
            60.0
        };
        Self {
            fixed_dt: 1.0 / hz,
            max_frame_time: max_frame_time.max(1.0 / hz),
            accumulator: 0.0,
            running: false,
            just_started: false,
            total_steps: 0,
            frames: 0,
        }
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Fraction of a step left in the accumulator, for interpolation.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.fixed_dt
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FixedStepLoop {
    fn default() -> Self {
        Self::new(60.0, 0.25)
    }
}

impl FrameLoop for FixedStepLoop {
    fn start(&mut self) {
        self.accumulator = 0.0;
        self.running = true;
        self.just_started = true;
        tracing::debug!("frame loop started");
    }

    fn stop(&mut self) {
        self.running = false;
        tracing::debug!("frame loop stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn advance(&mut self, elapsed: Duration) -> FrameTicks {
        if !self.running {
            return FrameTicks::idle();
        }

        let mut real_dt = elapsed.as_secs_f64();
        if self.just_started {
            self.just_started = false;
            real_dt = 0.0;
        } else if real_dt > self.max_frame_time {
            tracing::warn!(
                "frame took {:.1}ms, capping to {:.1}ms",
                real_dt * 1000.0,
                self.max_frame_time * 1000.0
            );
            real_dt = self.max_frame_time;
        }

        self.accumulator += real_dt;
        let mut updates = 0;
        while self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            updates += 1;
        }
        self.total_steps += u64::from(updates);
        self.frames += 1;

        FrameTicks {
            updates,
            render: true,
            delta: real_dt,
        }
    }
}
