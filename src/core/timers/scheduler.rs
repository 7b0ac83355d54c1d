//=========================================================================
// Timer Scheduler
//=========================================================================
//
// One-shot and repeating deferred callbacks, advanced once per tick.
//
// Architecture:
//   schedule() → incoming ─┐
//                          ↓ advance(): merge, then for each timer in order
//   active ← keep ← remaining -= delta → fire when remaining <= 0
//
// Each timer remembers the frame it was scheduled in and is not charged
// that frame's delta: time that passed before it existed never counts.
// Timers scheduled between ticks start counting down on the next tick.
// Repeating timers reset to their full interval after each fire
// (overshoot is not carried over, so drift accumulates with frame
// granularity).
//
// While `advance()` fires callbacks, the entries live in a `FiringGuard`.
// If a callback unwinds, the guard cancels the firing timer and puts the
// rest back into the queue so the scheduler keeps working.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::{debug, error, trace, warn};

//=== Internal Dependencies ===============================================

use super::handle::{TimerHandle, TimerId, TimerState, TimerStatus};
use crate::core::context::FrameContext;
use crate::core::managers::{GlobalManager, ManagerKind};

//=== Internal Storage ====================================================

type TimerCallback = Box<dyn FnMut(&TimerHandle, &mut FrameContext<'_>)>;

struct TimerEntry {
    handle: TimerHandle,
    on_fire: TimerCallback,

    // Frame during which `schedule()` was called.
    scheduled_frame: u64,
}

#[derive(Default)]
struct TimerQueue {
    active: Vec<TimerEntry>,
    incoming: Vec<TimerEntry>,

    // Handles of the entries `advance()` currently holds outside the queue.
    firing: Vec<TimerHandle>,
    next_id: u64,

    // Frame the runtime is currently ticking (0 before the first tick).
    frame: u64,
    last_advanced: Option<u64>,
}

//=== TimerScheduler ======================================================

/// Deferred callback scheduler.
///
/// Cloning yields another handle to the same queue: the runtime keeps one
/// to hand out through [`FrameContext::timers`] and registers another as
/// a global manager so the timers advance every tick.
#[derive(Clone, Default)]
pub struct TimerScheduler {
    queue: Rc<RefCell<TimerQueue>>,
}

impl TimerScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Scheduling -------------------------------------------------------

    /// Schedules `on_fire` to run after `delay` seconds.
    ///
    /// With `repeats`, the callback keeps firing every `delay` seconds
    /// until the returned handle is stopped.
    pub fn schedule<F>(&self, delay: f32, repeats: bool, on_fire: F) -> TimerHandle
    where
        F: FnMut(&TimerHandle, &mut FrameContext<'_>) + 'static,
    {
        self.insert(delay, repeats, None, Box::new(on_fire))
    }

    /// Like [`schedule`](Self::schedule) but attaches an opaque context
    /// retrievable through [`TimerHandle::context`].
    pub fn schedule_with_context<C, F>(
        &self,
        delay: f32,
        repeats: bool,
        context: C,
        on_fire: F,
    ) -> TimerHandle
    where
        C: Any,
        F: FnMut(&TimerHandle, &mut FrameContext<'_>) + 'static,
    {
        let context: Rc<dyn Any> = Rc::new(context);
        self.insert(delay, repeats, Some(context), Box::new(on_fire))
    }

    /// Cancels every scheduled timer, including ones firing right now.
    pub fn stop_all(&self) {
        let mut guard = self.queue.borrow_mut();
        let queue = &mut *guard;
        debug!("Stopping all timers");

        for handle in queue.firing.iter() {
            handle.stop();
        }
        for entry in queue.active.drain(..).chain(queue.incoming.drain(..)) {
            entry.handle.stop();
        }
    }

    //--- Query API --------------------------------------------------------

    /// Number of timers that may still fire.
    pub fn len(&self) -> usize {
        let queue = self.queue.borrow();
        queue
            .active
            .iter()
            .chain(queue.incoming.iter())
            .map(|entry| &entry.handle)
            .chain(queue.firing.iter())
            .filter(|handle| handle.is_active())
            .count()
    }

    /// Returns `true` if no timer may fire anymore.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    //--- Update Loop ------------------------------------------------------

    /// Marks the start of `frame`. Timers scheduled from here until the
    /// end of the frame are not charged its delta.
    pub(crate) fn enter_frame(&self, frame: u64) {
        self.queue.borrow_mut().frame = frame;
    }

    /// Counts every timer down by the frame delta and fires matured ones in
    /// scheduling order. A second call for the same frame is ignored.
    pub(crate) fn advance(&self, ctx: &mut FrameContext<'_>) {
        let delta = ctx.time.delta();
        let frame = ctx.time.frame_count();

        let entries = {
            let mut queue = self.queue.borrow_mut();
            if queue.last_advanced == Some(frame) {
                warn!("Timers already advanced for frame {}, ignoring", frame);
                return;
            }
            queue.last_advanced = Some(frame);

            let mut entries = std::mem::take(&mut queue.active);
            entries.append(&mut queue.incoming);
            queue.firing = entries.iter().map(|entry| entry.handle.clone()).collect();
            entries
        };

        let mut guard = FiringGuard::new(&self.queue, entries);
        while let Some(mut entry) = guard.pending.next() {
            guard.current = Some(entry.handle.clone());
            let keep = Self::tick_entry(&mut entry, delta, frame, ctx);
            guard.current = None;

            if keep {
                guard.kept.push(entry);
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn insert(
        &self,
        delay: f32,
        repeats: bool,
        context: Option<Rc<dyn Any>>,
        on_fire: TimerCallback,
    ) -> TimerHandle {
        let delay = if delay.is_finite() && delay >= 0.0 {
            delay
        } else {
            warn!("Invalid timer delay {}, firing on next tick", delay);
            0.0
        };

        let mut queue = self.queue.borrow_mut();
        let id = TimerId(queue.next_id);
        queue.next_id += 1;

        let handle = TimerHandle(Rc::new(TimerState {
            id,
            delay,
            repeats,
            remaining: Cell::new(delay),
            status: Cell::new(TimerStatus::Scheduled),
            context,
        }));

        trace!("Timer {:?} scheduled ({}s, repeats: {})", id, delay, repeats);
        let scheduled_frame = queue.frame;
        queue.incoming.push(TimerEntry {
            handle: handle.clone(),
            on_fire,
            scheduled_frame,
        });
        handle
    }

    /// Advances one timer. Returns `false` once it should be purged.
    fn tick_entry(
        entry: &mut TimerEntry,
        delta: f32,
        frame: u64,
        ctx: &mut FrameContext<'_>,
    ) -> bool {
        let state = &entry.handle.0;
        if !entry.handle.is_active() {
            return false;
        }
        if entry.scheduled_frame >= frame {
            return true;
        }

        let remaining = state.remaining.get() - delta;
        state.remaining.set(remaining);
        if remaining > 0.0 {
            return true;
        }

        trace!("Timer {:?} fired", state.id);
        if state.repeats {
            state.status.set(TimerStatus::Fired);
        }

        (entry.on_fire)(&entry.handle, ctx);

        match state.status.get() {
            TimerStatus::Cancelled => false,
            _ if state.repeats => {
                state.status.set(TimerStatus::Scheduled);
                state.remaining.set(state.delay);
                true
            }
            _ => {
                state.status.set(TimerStatus::Completed);
                false
            }
        }
    }
}

//=== FiringGuard ==========================================================

/// Holds the entries of one `advance()` outside the queue and writes them
/// back when dropped, also when a callback unwinds.
struct FiringGuard<'a> {
    queue: &'a RefCell<TimerQueue>,
    kept: Vec<TimerEntry>,
    pending: std::vec::IntoIter<TimerEntry>,

    // Timer whose callback is running.
    current: Option<TimerHandle>,
}

impl<'a> FiringGuard<'a> {
    fn new(queue: &'a RefCell<TimerQueue>, entries: Vec<TimerEntry>) -> Self {
        Self {
            queue,
            kept: Vec::with_capacity(entries.len()),
            pending: entries.into_iter(),
            current: None,
        }
    }
}

impl Drop for FiringGuard<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            warn!("Timer {:?} callback panicked, cancelling it", handle.id());
            handle.stop();
        }

        let Ok(mut queue) = self.queue.try_borrow_mut() else {
            error!("Timer queue busy while unwinding, pending timers dropped");
            return;
        };

        let mut restored = std::mem::take(&mut self.kept);
        restored.extend(self.pending.by_ref());
        restored.append(&mut queue.active);
        queue.active = restored;
        queue.firing.clear();
    }
}

impl GlobalManager for TimerScheduler {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Timers
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.advance(ctx);
    }
}

impl fmt::Debug for TimerScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerScheduler")
            .field("active", &self.len())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::TestFrame;
    use crate::core::events::CoreEvent;
    use std::cell::Cell;
    use std::panic::{self, AssertUnwindSafe};

    fn counter() -> Rc<Cell<u32>> {
        Rc::new(Cell::new(0))
    }

    fn tick(frame: &mut TestFrame, dt: f32) {
        let timers = frame.timers.clone();
        let mut ctx = frame.step(dt);
        timers.advance(&mut ctx);
    }

    //=====================================================================
    // One-shot Timers
    //=====================================================================

    #[test]
    fn one_shot_fires_exactly_once() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        let handle = frame.timers.schedule(1.0, false, move |_, _| f.set(f.get() + 1));

        tick(&mut frame, 0.5);
        assert_eq!(fired.get(), 0);

        tick(&mut frame, 0.5);
        assert_eq!(fired.get(), 1, "Fires when remaining reaches zero");
        assert_eq!(handle.status(), TimerStatus::Completed);

        for _ in 0..10 {
            tick(&mut frame, 1.0);
        }
        assert_eq!(fired.get(), 1);
        assert!(frame.timers.is_empty(), "Completed timers are purged");
    }

    #[test]
    fn emits_once_after_cumulative_delay() {
        let mut frame = TestFrame::new();
        let emitted = counter();
        let e = Rc::clone(&emitted);
        frame.events.add_observer(CoreEvent::GraphicsDeviceReset, move |_| e.set(e.get() + 1));

        frame.timers.schedule(0.05, false, |_, ctx| {
            ctx.events.emit(CoreEvent::GraphicsDeviceReset);
        });

        tick(&mut frame, 0.03);
        assert_eq!(emitted.get(), 0);

        tick(&mut frame, 0.03);
        assert_eq!(emitted.get(), 1);

        tick(&mut frame, 0.03);
        tick(&mut frame, 0.03);
        assert_eq!(emitted.get(), 1);
    }

    #[test]
    fn zero_delay_fires_next_tick() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        frame.timers.schedule(0.0, false, move |_, _| f.set(f.get() + 1));

        tick(&mut frame, 0.0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn negative_delay_is_clamped() {
        let frame = TestFrame::new();
        let handle = frame.timers.schedule(-3.0, false, |_, _| {});
        assert_eq!(handle.remaining(), 0.0);
    }

    //=====================================================================
    // Repeating Timers
    //=====================================================================

    #[test]
    fn repeating_fires_every_interval() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        frame.timers.schedule(0.5, true, move |_, _| f.set(f.get() + 1));

        for _ in 0..10 {
            tick(&mut frame, 0.25);
        }
        assert_eq!(fired.get(), 5, "2.5s of ticks at 0.5s interval");
    }

    #[test]
    fn repeating_fire_count_stays_within_frame_tolerance() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        frame.timers.schedule(1.0, true, move |_, _| f.set(f.get() + 1));

        let mut total = 0.0_f32;
        let mut last = 0;
        for _ in 0..300 {
            tick(&mut frame, 0.033);
            total += 0.033;

            let expected = (total / 1.0).floor() as i64;
            let actual = fired.get() as i64;
            assert!((actual - expected).abs() <= 1, "{} fires after {}s", actual, total);
            assert!(fired.get() >= last, "Fire count never decreases");
            last = fired.get();
        }
    }

    #[test]
    fn repeating_reset_ignores_overshoot() {
        let mut frame = TestFrame::new();
        let handle = frame.timers.schedule(1.0, true, |_, _| {});

        tick(&mut frame, 1.25);
        assert_eq!(handle.remaining(), 1.0, "Interval restarts from the fire tick");
        assert_eq!(handle.status(), TimerStatus::Scheduled);
    }

    #[test]
    fn repeating_reports_fired_during_callback() {
        let mut frame = TestFrame::new();
        let seen = Rc::new(Cell::new(None));
        let s = Rc::clone(&seen);
        frame.timers.schedule(0.1, true, move |timer, _| s.set(Some(timer.status())));

        tick(&mut frame, 0.1);
        assert_eq!(seen.get(), Some(TimerStatus::Fired));
    }

    //=====================================================================
    // Handle Operations
    //=====================================================================

    #[test]
    fn stop_before_delay_prevents_fire() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        let handle = frame.timers.schedule(1.0, false, move |_, _| f.set(f.get() + 1));

        tick(&mut frame, 0.5);
        handle.stop();
        tick(&mut frame, 1.0);

        assert_eq!(fired.get(), 0);
        assert_eq!(handle.status(), TimerStatus::Cancelled);
        assert!(frame.timers.is_empty());
    }

    #[test]
    fn stop_inside_callback_ends_repeating_timer() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        frame.timers.schedule(0.1, true, move |timer, _| {
            f.set(f.get() + 1);
            if f.get() == 3 {
                timer.stop();
            }
        });

        for _ in 0..10 {
            tick(&mut frame, 0.1);
        }
        assert_eq!(fired.get(), 3);
    }

    #[test]
    fn reset_restores_full_delay() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        let handle = frame.timers.schedule(1.0, false, move |_, _| f.set(f.get() + 1));

        tick(&mut frame, 0.75);
        handle.reset();
        assert_eq!(handle.remaining(), 1.0);

        tick(&mut frame, 0.75);
        assert_eq!(fired.get(), 0, "Reset pushed the deadline back");

        tick(&mut frame, 0.25);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn stale_handle_operations_are_noops() {
        let mut frame = TestFrame::new();
        let handle = frame.timers.schedule(0.1, false, |_, _| {});
        tick(&mut frame, 0.1);
        assert_eq!(handle.status(), TimerStatus::Completed);

        handle.stop();
        handle.stop();
        handle.reset();
        assert_eq!(handle.status(), TimerStatus::Completed);
        assert!(!handle.is_active());
    }

    #[test]
    fn context_is_retrievable_by_type() {
        let mut frame = TestFrame::new();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let handle = frame.timers.schedule_with_context(0.1, false, 42_u32, move |timer, _| {
            if let Some(value) = timer.context::<u32>() {
                s.set(*value);
            }
        });

        assert!(handle.context::<String>().is_none(), "Wrong type yields None");
        tick(&mut frame, 0.1);
        assert_eq!(seen.get(), 42);
    }

    //=====================================================================
    // Ordering & Mutation During Advance
    //=====================================================================

    #[test]
    fn same_tick_maturities_fire_in_schedule_order() {
        let mut frame = TestFrame::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (i, delay) in [0.3_f32, 0.1, 0.2].into_iter().enumerate() {
            let order = Rc::clone(&order);
            frame.timers.schedule(delay, false, move |_, _| order.borrow_mut().push(i));
        }

        tick(&mut frame, 0.5);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn timer_scheduled_in_callback_starts_next_tick() {
        let mut frame = TestFrame::new();
        let inner_fired = counter();
        let inner = Rc::clone(&inner_fired);

        frame.timers.schedule(0.1, false, move |_, ctx| {
            let inner = Rc::clone(&inner);
            ctx.timers.schedule(0.0, false, move |_, _| inner.set(inner.get() + 1));
        });

        tick(&mut frame, 0.1);
        assert_eq!(inner_fired.get(), 0, "Not fired in the tick it was scheduled");
        assert_eq!(frame.timers.len(), 1);

        tick(&mut frame, 0.0);
        assert_eq!(inner_fired.get(), 1);
    }

    #[test]
    fn timer_scheduled_earlier_in_frame_skips_that_delta() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        let timers = frame.timers.clone();

        let mut ctx = frame.step(0.03);
        let handle = ctx.timers.schedule(0.05, false, move |_, _| f.set(f.get() + 1));
        timers.advance(&mut ctx);
        drop(ctx);
        assert_eq!(handle.remaining(), 0.05, "Scheduled after this frame's time passed");

        tick(&mut frame, 0.03);
        assert_eq!(fired.get(), 0);

        tick(&mut frame, 0.03);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn second_advance_in_same_frame_is_ignored() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        frame.timers.schedule(0.1, true, move |_, _| f.set(f.get() + 1));

        let timers = frame.timers.clone();
        let mut ctx = frame.step(0.1);
        timers.advance(&mut ctx);
        timers.advance(&mut ctx);
        drop(ctx);
        assert_eq!(fired.get(), 1);

        tick(&mut frame, 0.1);
        assert_eq!(fired.get(), 2);
    }

    //=====================================================================
    // Panicking Callbacks
    //=====================================================================

    #[test]
    fn panicking_callback_cancels_only_that_timer() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        let failing = frame.timers.schedule(0.1, false, |_, _| panic!("callback failed"));
        let healthy = frame.timers.schedule(0.1, true, move |_, _| f.set(f.get() + 1));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| tick(&mut frame, 0.1)));
        assert!(outcome.is_err());
        assert_eq!(failing.status(), TimerStatus::Cancelled);
        assert_eq!(healthy.status(), TimerStatus::Scheduled);
        assert_eq!(frame.timers.len(), 1, "Survivor is back in the queue");

        tick(&mut frame, 0.1);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn stop_all_cancels_everything() {
        let mut frame = TestFrame::new();
        let fired = counter();
        let f = Rc::clone(&fired);
        let a = frame.timers.schedule(0.1, true, move |_, ctx| {
            f.set(f.get() + 1);
            ctx.timers.stop_all();
        });
        let b = frame.timers.schedule(5.0, false, |_, _| {});

        tick(&mut frame, 0.1);
        tick(&mut frame, 0.1);

        assert_eq!(fired.get(), 1);
        assert_eq!(a.status(), TimerStatus::Cancelled);
        assert_eq!(b.status(), TimerStatus::Cancelled);
        assert!(frame.timers.is_empty());
    }

    #[test]
    fn registered_as_timers_manager() {
        let timers = TimerScheduler::new();
        assert_eq!(timers.kind(), ManagerKind::Timers);
    }
}
