//=========================================================================
// Timer Handle
//=========================================================================
//
// Shared view of one scheduled timer.
//
// The scheduler keeps the callback; the handle only shares the timer's
// small mutable state (remaining delay, status). Operations on a handle
// whose timer already completed or was cancelled are no-ops.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use log::trace;

//=== TimerId =============================================================

/// Unique identity of a timer within its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

//=== TimerStatus =========================================================

/// Lifecycle of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Counting down.
    Scheduled,

    /// A repeating timer whose callback is running right now.
    Fired,

    /// Stopped through its handle; will never fire again.
    Cancelled,

    /// A one-shot timer that already fired.
    Completed,
}

//=== TimerState ==========================================================

pub(super) struct TimerState {
    pub(super) id: TimerId,
    pub(super) delay: f32,
    pub(super) repeats: bool,
    pub(super) remaining: Cell<f32>,
    pub(super) status: Cell<TimerStatus>,
    pub(super) context: Option<Rc<dyn Any>>,
}

//=== TimerHandle =========================================================

/// Cloneable handle used to reset or stop a timer.
#[derive(Clone)]
pub struct TimerHandle(pub(super) Rc<TimerState>);

impl TimerHandle {
    //--- Operations -------------------------------------------------------

    /// Restores the full delay. Repeat and cancel state are unchanged.
    pub fn reset(&self) {
        if self.is_active() {
            trace!("Timer {:?} reset to {}s", self.0.id, self.0.delay);
            self.0.remaining.set(self.0.delay);
        }
    }

    /// Cancels the timer; its callback will not run again.
    pub fn stop(&self) {
        if self.is_active() {
            trace!("Timer {:?} stopped", self.0.id);
            self.0.status.set(TimerStatus::Cancelled);
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Identity of this timer.
    pub fn id(&self) -> TimerId {
        self.0.id
    }

    /// Current lifecycle state.
    pub fn status(&self) -> TimerStatus {
        self.0.status.get()
    }

    /// Returns `true` while the timer may still fire.
    pub fn is_active(&self) -> bool {
        matches!(self.status(), TimerStatus::Scheduled | TimerStatus::Fired)
    }

    /// Returns `true` for repeating timers.
    pub fn repeats(&self) -> bool {
        self.0.repeats
    }

    /// Seconds left before the next fire.
    pub fn remaining(&self) -> f32 {
        self.0.remaining.get()
    }

    /// Returns the context passed to
    /// [`schedule_with_context`](super::TimerScheduler::schedule_with_context)
    /// if it has type `C`.
    pub fn context<C: Any>(&self) -> Option<Rc<C>> {
        let context = Rc::clone(self.0.context.as_ref()?);
        context.downcast::<C>().ok()
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.0.id)
            .field("status", &self.status())
            .field("remaining", &self.remaining())
            .field("repeats", &self.0.repeats)
            .finish()
    }
}
