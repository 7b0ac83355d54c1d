//=========================================================================
// Frame Context
//=========================================================================
//
// Explicit orchestrator context handed to every system during a tick.
//
// Managers, timer callbacks, coroutine steps and the update hook receive
// `&mut FrameContext` instead of reaching for a global instance. The draw
// hook gets the read-only `DrawContext`.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::coroutines::CoroutineScheduler;
use crate::core::events::{CoreEvent, Emitter};
use crate::core::input::InputState;
use crate::core::managers::ManagerRegistry;
use crate::core::time::Time;
use crate::core::timers::TimerScheduler;

//=== FrameContext ========================================================

/// Everything a system may touch while the runtime is ticking.
///
/// # Available Data
///
/// - `time`: frame delta and accumulated time for this tick
/// - `input`: input snapshot sampled at the start of this tick
/// - `managers`: the manager registry (register/unregister/toggle)
/// - `events`: the runtime's event emitter
/// - `timers` / `coroutines`: schedulers; work added here mid-tick runs
///   from the next tick on
pub struct FrameContext<'a> {
    /// Timing for the current tick.
    pub time: &'a Time,

    /// Input sampled during step (2) of the current tick.
    pub input: &'a InputState,

    /// Registry of global managers.
    ///
    /// The manager currently being updated is not reachable through
    /// `get`/`get_mut`, but it can still unregister or disable itself.
    pub managers: &'a mut ManagerRegistry,

    /// Runtime-wide event emitter.
    pub events: &'a Emitter<CoreEvent>,

    /// Deferred callback scheduler.
    pub timers: &'a TimerScheduler,

    /// Cooperative routine scheduler.
    pub coroutines: &'a CoroutineScheduler,

    exit_requested: &'a mut bool,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(
        time: &'a Time,
        input: &'a InputState,
        managers: &'a mut ManagerRegistry,
        events: &'a Emitter<CoreEvent>,
        timers: &'a TimerScheduler,
        coroutines: &'a CoroutineScheduler,
        exit_requested: &'a mut bool,
    ) -> Self {
        Self {
            time,
            input,
            managers,
            events,
            timers,
            coroutines,
            exit_requested,
        }
    }

    /// Asks the host to shut down after the current frame.
    pub fn exit(&mut self) {
        *self.exit_requested = true;
    }

    /// Returns `true` once anything requested shutdown.
    pub fn is_exit_requested(&self) -> bool {
        *self.exit_requested
    }
}

//=== DrawContext =========================================================

/// Read-only view handed to the draw hook.
pub struct DrawContext<'a> {
    /// Timing of the most recent tick.
    pub time: &'a Time,

    /// Input snapshot of the most recent tick.
    pub input: &'a InputState,
}

//=========================================================================
// Test Fixture
//=========================================================================

/// Standalone owner of every `FrameContext` part, for exercising
/// schedulers and managers without a full runtime.
#[cfg(test)]
pub(crate) struct TestFrame {
    pub time: Time,
    pub input: InputState,
    pub managers: ManagerRegistry,
    pub events: Emitter<CoreEvent>,
    pub timers: TimerScheduler,
    pub coroutines: CoroutineScheduler,
    pub exit_requested: bool,
}

#[cfg(test)]
impl TestFrame {
    pub fn new() -> Self {
        Self {
            time: Time::new(),
            input: InputState::new(),
            managers: ManagerRegistry::new(),
            events: Emitter::new(),
            timers: TimerScheduler::new(),
            coroutines: CoroutineScheduler::new(),
            exit_requested: false,
        }
    }

    /// Advances the clock by `dt`, opens the frame on the timers and returns
    /// a context for that tick.
    pub fn step(&mut self, dt: f32) -> FrameContext<'_> {
        self.time.advance(dt);
        self.timers.enter_frame(self.time.frame_count());
        self.ctx()
    }

    pub fn ctx(&mut self) -> FrameContext<'_> {
        FrameContext::new(
            &self.time,
            &self.input,
            &mut self.managers,
            &self.events,
            &self.timers,
            &self.coroutines,
            &mut self.exit_requested,
        )
    }
}
