//=========================================================================
// Time
//=========================================================================
//
// Global time accumulator advanced once per tick.
//
// Step (1) of every tick feeds the host-measured elapsed seconds into
// `Time::advance()`. Everything downstream (timers, coroutines, the update
// hook) reads the frame delta from here instead of measuring wall time.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::warn;

//=== Time ================================================================

/// Frame timing snapshot shared with every system during a tick.
///
/// `delta` and `total` are scaled by `time_scale`; the `unscaled_*`
/// variants always follow the host clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Time {
    delta: f32,
    unscaled_delta: f32,
    total: f32,
    unscaled_total: f32,
    time_scale: f32,
    frame_count: u64,
}

impl Time {
    /// Creates a clock at time zero with a time scale of 1.0.
    pub fn new() -> Self {
        Self {
            delta: 0.0,
            unscaled_delta: 0.0,
            total: 0.0,
            unscaled_total: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }

    //--- Advance ----------------------------------------------------------

    /// Advances the accumulator by `elapsed` seconds.
    ///
    /// Negative or non-finite input is treated as a zero-length frame.
    pub(crate) fn advance(&mut self, elapsed: f32) {
        let elapsed = if elapsed.is_finite() && elapsed >= 0.0 {
            elapsed
        } else {
            warn!("Ignoring invalid elapsed time {}, using 0", elapsed);
            0.0
        };

        self.unscaled_delta = elapsed;
        self.delta = elapsed * self.time_scale;
        self.unscaled_total += self.unscaled_delta;
        self.total += self.delta;
        self.frame_count += 1;
    }

    pub(crate) fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    //--- Queries ----------------------------------------------------------

    /// Scaled seconds elapsed during the current frame.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Host seconds elapsed during the current frame, ignoring `time_scale`.
    pub fn unscaled_delta(&self) -> f32 {
        self.unscaled_delta
    }

    /// Scaled seconds accumulated since the runtime started.
    pub fn total(&self) -> f32 {
        self.total
    }

    /// Host seconds accumulated since the runtime started.
    pub fn unscaled_total(&self) -> f32 {
        self.unscaled_total
    }

    /// Multiplier applied to the host delta (1.0 is real time).
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Number of ticks processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns `true` if the scaled total crossed a multiple of `interval`
    /// during the current frame.
    ///
    /// Handy for "do this roughly every N seconds" checks inside an update
    /// hook without scheduling a timer.
    pub fn check_every(&self, interval: f32) -> bool {
        if interval <= 0.0 {
            return false;
        }
        let now = (self.total / interval).floor();
        let before = ((self.total - self.delta) / interval).floor();
        now > before
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
