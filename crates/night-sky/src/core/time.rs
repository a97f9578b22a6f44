/// What the host's frame callback should do this refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameDecision {
    /// Frame cap not reached; reschedule without work.
    Skip,
    /// Host is scrolling; skip simulation and redraw, keep rescheduling.
    Frozen,
    /// Simulate `dt` seconds and redraw.
    Step { dt: f32 },
}

/// Turns host refresh callbacks into simulation steps.
///
/// Enforces the tier frame-rate cap, clamps the step after stalls, and
/// freezes while the host reports an active scroll gesture.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    /// Minimum seconds between simulated frames.
    min_interval: f32,
    /// Largest dt handed to the simulation.
    max_step: f32,
    /// Host timestamp (ms) of the last frame that did work or froze.
    last_ms: Option<f64>,
}

impl FrameScheduler {
    /// Nominal step for the very first frame.
    pub const FIRST_STEP: f32 = 1.0 / 60.0;
    /// Timestamps may jitter slightly early; accept frames this close to the cap.
    const CAP_TOLERANCE_MS: f64 = 1.0;

    pub fn new(min_interval: f32, max_step: f32) -> Self {
        Self {
            min_interval: min_interval.max(0.0),
            max_step: max_step.max(Self::FIRST_STEP),
            last_ms: None,
        }
    }

    /// Decide what to do for a refresh at host time `now_ms`.
    pub fn on_frame(&mut self, now_ms: f64, scrolling: bool) -> FrameDecision {
        let Some(last) = self.last_ms else {
            self.last_ms = Some(now_ms);
            if scrolling {
                return FrameDecision::Frozen;
            }
            return FrameDecision::Step { dt: Self::FIRST_STEP };
        };

        let elapsed_ms = (now_ms - last).max(0.0);
        if elapsed_ms + Self::CAP_TOLERANCE_MS < self.min_interval as f64 * 1000.0 {
            return FrameDecision::Skip;
        }

        self.last_ms = Some(now_ms);
        if scrolling {
            return FrameDecision::Frozen;
        }

        let dt = (elapsed_ms / 1000.0) as f32;
        FrameDecision::Step { dt: dt.min(self.max_step) }
    }

    /// Forget the last timestamp, e.g. after the page was hidden.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
