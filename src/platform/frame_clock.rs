//=========================================================================
// Frame Clock
//=========================================================================
//
// Measures wall-clock time between redraws for `Runtime::tick`.
//
// Deltas are clamped to `max_delta` so a stall (debugger break, window
// drag on some platforms, minimization) does not feed one huge step into
// timers and coroutines.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use log::trace;

//=== FrameClock ==========================================================

#[derive(Debug, Clone)]
pub(crate) struct FrameClock {
    last: Instant,
    max_delta: Duration,
}

impl FrameClock {
    pub(crate) fn new(max_delta_secs: f32) -> Self {
        Self {
            last: Instant::now(),
            max_delta: Duration::from_secs_f32(max_delta_secs),
        }
    }

    /// Restarts measurement from now (e.g. after regaining focus).
    pub(crate) fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Seconds since the previous call, clamped.
    pub(crate) fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&mut self, now: Instant) -> f32 {
        let mut delta = now.saturating_duration_since(self.last);
        if delta > self.max_delta {
            trace!(target: "platform", "Frame delta {:?} clamped", delta);
            delta = self.max_delta;
        }

        self.last = now;
        delta.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_elapsed_time() {
        let mut clock = FrameClock::new(0.25);
        let start = clock.last;

        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn clamps_long_stalls() {
        let mut clock = FrameClock::new(0.25);
        let start = clock.last;

        assert_eq!(clock.tick_at(start + Duration::from_secs(3)), 0.25);
    }

    #[test]
    fn time_going_backwards_is_zero() {
        let mut clock = FrameClock::new(0.25);
        let start = clock.last;
        clock.tick_at(start + Duration::from_millis(10));

        assert_eq!(clock.tick_at(start), 0.0);
    }
}
