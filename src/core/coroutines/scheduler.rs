//=========================================================================
// Coroutine Scheduler
//=========================================================================
//
// Cooperative routines resumed at most once per tick.
//
// Architecture:
//   start() → incoming ─┐
//                       ↓ advance(): clock += 1, merge, then in start order
//   active → wait satisfied? → Routine::resume() → next wait | finished
//
// Each entry is held outside the queue while it runs, so routines may
// start, stop or query coroutines (including themselves) mid-step.
// Coroutines started during `advance()` first resume on the next tick.
// A routine that panics is stopped; the others go back into the queue.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::{debug, error, trace, warn};

//=== Internal Dependencies ===============================================

use super::handle::{CoroutineHandle, CoroutineId, CoroutineState, CoroutineStatus};
use super::routine::{Routine, Yield};
use crate::core::context::FrameContext;
use crate::core::managers::{GlobalManager, ManagerKind};

//=== Internal Storage ====================================================

enum Wait {
    /// Resume on the next advance.
    Ready,
    Seconds(f32),
    For(CoroutineHandle),
}

struct CoroutineEntry {
    handle: CoroutineHandle,
    routine: Box<dyn Routine>,
    wait: Wait,
}

#[derive(Default)]
struct CoroutineQueue {
    active: Vec<CoroutineEntry>,
    incoming: Vec<CoroutineEntry>,
    in_flight: Vec<CoroutineHandle>,
    next_id: u64,
    last_frame: Option<u64>,
}

//=== CoroutineScheduler ==================================================

/// Scheduler for [`Routine`]s.
///
/// Cloning yields another handle to the same set of coroutines.
#[derive(Clone, Default)]
pub struct CoroutineScheduler {
    queue: Rc<RefCell<CoroutineQueue>>,
    clock: Rc<Cell<u64>>,
}

impl CoroutineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Lifecycle --------------------------------------------------------

    /// Starts `routine`. Its first resume happens on the next tick.
    pub fn start<R>(&self, routine: R) -> CoroutineHandle
    where
        R: Routine + 'static,
    {
        let mut queue = self.queue.borrow_mut();
        let id = CoroutineId(queue.next_id);
        queue.next_id += 1;

        let handle = CoroutineHandle(Rc::new(CoroutineState {
            id,
            status: Cell::new(CoroutineStatus::Running),
            finished_tick: Cell::new(0),
            use_unscaled_time: Cell::new(false),
            clock: Rc::clone(&self.clock),
        }));

        debug!("Coroutine {:?} started", id);
        queue.incoming.push(CoroutineEntry {
            handle: handle.clone(),
            routine: Box::new(routine),
            wait: Wait::Ready,
        });
        handle
    }

    /// Starts a closure routine.
    ///
    /// Same as [`start`](Self::start), but pins the closure signature so
    /// parameter types need no annotation.
    pub fn start_fn<F>(&self, routine: F) -> CoroutineHandle
    where
        F: FnMut(&mut FrameContext<'_>) -> Yield + 'static,
    {
        self.start(routine)
    }

    /// Stops `handle`'s coroutine. Returns `false` if it already finished.
    pub fn stop(&self, handle: &CoroutineHandle) -> bool {
        handle.stop()
    }

    /// Stops every coroutine, including the one currently resuming.
    pub fn stop_all(&self) {
        let dropped: Vec<CoroutineEntry> = {
            let mut guard = self.queue.borrow_mut();
            let queue = &mut *guard;
            debug!("Stopping all coroutines");

            for handle in queue.in_flight.iter() {
                handle.stop();
            }
            queue.active.drain(..).chain(queue.incoming.drain(..)).collect()
        };

        // Routines are dropped after the queue is released.
        for entry in dropped.iter() {
            entry.handle.stop();
        }
    }

    //--- Query API --------------------------------------------------------

    /// Number of coroutines still running.
    pub fn len(&self) -> usize {
        let queue = self.queue.borrow();
        queue
            .active
            .iter()
            .chain(queue.incoming.iter())
            .map(|entry| &entry.handle)
            .chain(queue.in_flight.iter())
            .filter(|handle| handle.is_running())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    //--- Update Loop ------------------------------------------------------

    /// Resumes every coroutine whose wait is satisfied, in start order.
    ///
    /// Runs at most once per frame; further calls for the same frame are
    /// ignored.
    pub(crate) fn advance(&self, ctx: &mut FrameContext<'_>) {
        let frame = ctx.time.frame_count();

        let entries = {
            let mut queue = self.queue.borrow_mut();
            if queue.last_frame == Some(frame) {
                warn!("Coroutines already advanced for frame {}, ignoring", frame);
                return;
            }
            queue.last_frame = Some(frame);

            let mut entries = std::mem::take(&mut queue.active);
            entries.append(&mut queue.incoming);
            queue.in_flight = entries.iter().map(|entry| entry.handle.clone()).collect();
            entries
        };

        let tick = self.clock.get() + 1;
        self.clock.set(tick);

        let mut guard = ResumeGuard::new(&self.queue, entries);
        while let Some(mut entry) = guard.pending.next() {
            guard.current = Some(entry.handle.clone());
            let keep = Self::step_entry(&mut entry, tick, ctx);
            guard.current = None;

            if keep {
                guard.kept.push(entry);
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    /// Resumes one coroutine if its wait is over. Returns `false` once it
    /// should be purged.
    fn step_entry(entry: &mut CoroutineEntry, tick: u64, ctx: &mut FrameContext<'_>) -> bool {
        if !entry.handle.is_running() {
            return false;
        }

        let ready = match &mut entry.wait {
            Wait::Ready => true,
            Wait::Seconds(remaining) => {
                let delta = if entry.handle.uses_unscaled_time() {
                    ctx.time.unscaled_delta()
                } else {
                    ctx.time.delta()
                };
                *remaining -= delta;
                *remaining <= 0.0
            }
            Wait::For(target) => target.releases_waiters_at(tick),
        };
        if !ready {
            return true;
        }

        trace!("Resuming coroutine {:?}", entry.handle.id());
        let next = entry.routine.resume(ctx);

        // Stopped from inside its own step.
        if !entry.handle.is_running() {
            return false;
        }

        entry.wait = match next {
            Yield::Done => {
                debug!("Coroutine {:?} completed", entry.handle.id());
                entry.handle.0.finish(CoroutineStatus::Completed);
                return false;
            }
            Yield::NextFrame => Wait::Ready,
            Yield::WaitSeconds(seconds) if seconds.is_nan() => {
                warn!("Coroutine {:?} yielded NaN seconds", entry.handle.id());
                Wait::Ready
            }
            Yield::WaitSeconds(seconds) => Wait::Seconds(seconds),
            Yield::WaitFor(target) => Wait::For(target),
        };
        true
    }
}

//=== ResumeGuard ==========================================================

/// Owns the entries of one `advance()` and hands them back to the queue on
/// drop, including while unwinding out of a routine.
struct ResumeGuard<'a> {
    queue: &'a RefCell<CoroutineQueue>,
    kept: Vec<CoroutineEntry>,
    pending: std::vec::IntoIter<CoroutineEntry>,
    current: Option<CoroutineHandle>,
}

impl<'a> ResumeGuard<'a> {
    fn new(queue: &'a RefCell<CoroutineQueue>, entries: Vec<CoroutineEntry>) -> Self {
        Self {
            queue,
            kept: Vec::with_capacity(entries.len()),
            pending: entries.into_iter(),
            current: None,
        }
    }
}

impl Drop for ResumeGuard<'_> {
    fn drop(&mut self) {
        // Waiters on a routine that panicked are released like for a stop.
        if let Some(handle) = self.current.take() {
            warn!("Coroutine {:?} panicked, stopping it", handle.id());
            handle.stop();
        }

        let Ok(mut queue) = self.queue.try_borrow_mut() else {
            error!("Coroutine queue busy while unwinding, pending coroutines dropped");
            return;
        };

        let mut restored = std::mem::take(&mut self.kept);
        restored.extend(self.pending.by_ref());
        restored.append(&mut queue.active);
        queue.active = restored;
        queue.in_flight.clear();
    }
}

impl GlobalManager for CoroutineScheduler {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Coroutines
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.advance(ctx);
    }
}

impl fmt::Debug for CoroutineScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoroutineScheduler")
            .field("running", &self.len())
            .field("tick", &self.clock.get())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
