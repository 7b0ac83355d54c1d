//=========================================================================
// Coroutine Handle
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use log::debug;

//=== CoroutineId =========================================================

/// Unique identity of a coroutine within its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoroutineId(pub(crate) u64);

//=== CoroutineStatus =====================================================

/// Lifecycle of a coroutine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoroutineStatus {
    /// Started and not yet finished.
    Running,

    /// The routine returned [`Yield::Done`](super::Yield::Done).
    Completed,

    /// Stopped through its handle or the scheduler.
    Stopped,
}

//=== CoroutineState ======================================================

pub(super) struct CoroutineState {
    pub(super) id: CoroutineId,
    pub(super) status: Cell<CoroutineStatus>,

    // Scheduler tick during which the coroutine stopped running. Waiters
    // are released on the first tick after it.
    pub(super) finished_tick: Cell<u64>,
    pub(super) use_unscaled_time: Cell<bool>,

    // Shared with the scheduler; counts calls to `advance()`.
    pub(super) clock: Rc<Cell<u64>>,
}

impl CoroutineState {
    pub(super) fn finish(&self, status: CoroutineStatus) {
        self.status.set(status);
        self.finished_tick.set(self.clock.get());
    }
}

//=== CoroutineHandle =====================================================

/// Cloneable handle to a running coroutine.
///
/// Operations on a finished coroutine are no-ops.
#[derive(Clone)]
pub struct CoroutineHandle(pub(super) Rc<CoroutineState>);

impl CoroutineHandle {
    /// Stops the coroutine. It is never resumed again, and coroutines
    /// waiting on it are released as if it had completed.
    ///
    /// Returns `false` if it had already finished.
    pub fn stop(&self) -> bool {
        if !self.is_running() {
            return false;
        }

        debug!("Coroutine {:?} stopped", self.0.id);
        self.0.finish(CoroutineStatus::Stopped);
        true
    }

    /// Makes `WaitSeconds` count unscaled frame time.
    pub fn set_use_unscaled_time(&self, unscaled: bool) {
        self.0.use_unscaled_time.set(unscaled);
    }

    pub fn uses_unscaled_time(&self) -> bool {
        self.0.use_unscaled_time.get()
    }

    pub fn id(&self) -> CoroutineId {
        self.0.id
    }

    pub fn status(&self) -> CoroutineStatus {
        self.0.status.get()
    }

    pub fn is_running(&self) -> bool {
        self.status() == CoroutineStatus::Running
    }

    /// Whether a coroutine waiting on this one may resume at `tick`.
    pub(super) fn releases_waiters_at(&self, tick: u64) -> bool {
        !self.is_running() && self.0.finished_tick.get() < tick
    }
}

impl PartialEq for CoroutineHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CoroutineHandle {}

impl fmt::Debug for CoroutineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoroutineHandle")
            .field("id", &self.0.id)
            .field("status", &self.status())
            .finish()
    }
}
