//=========================================================================
// Debouncer
//=========================================================================
//
// Coalesces bursts of notifications into a single event emitted once the
// burst has been quiet for a fixed window.
//
// State machine:
//   Idle ──trigger──→ Pending(timer) ──timer fires──→ Idle + emit(event)
//                       │    ↑
//                       └────┘ trigger: reset the timer's deadline
//
// The pending deadline is a one-shot timer on the runtime's scheduler, so
// the emission happens during the timer manager's update.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::events::CoreEvent;
use crate::core::timers::{TimerHandle, TimerScheduler};

//=== DebounceState =======================================================

#[derive(Debug)]
enum DebounceState {
    Idle,
    Pending(TimerHandle),
}

//=== Debouncer ===========================================================

/// Trailing-edge debouncer for one [`CoreEvent`].
#[derive(Debug)]
pub struct Debouncer {
    window: f32,
    event: CoreEvent,
    state: Rc<RefCell<DebounceState>>,
}

impl Debouncer {
    /// Creates an idle debouncer emitting `event` after `window` quiet
    /// seconds.
    pub fn new(window: f32, event: CoreEvent) -> Self {
        Self {
            window: window.max(0.0),
            event,
            state: Rc::new(RefCell::new(DebounceState::Idle)),
        }
    }

    /// Records one notification.
    ///
    /// Arms the timer when idle, otherwise pushes the pending deadline
    /// back to a full window. A pending timer is always reset rather than
    /// scheduled twice.
    pub fn trigger(&self, timers: &TimerScheduler) {
        let mut state = self.state.borrow_mut();

        if let DebounceState::Pending(handle) = &*state {
            if handle.is_active() {
                trace!("Debounce for {:?} reset", self.event);
                handle.reset();
                return;
            }
        }

        let shared = Rc::clone(&self.state);
        let event = self.event;
        let handle = timers.schedule(self.window, false, move |_, ctx| {
            *shared.borrow_mut() = DebounceState::Idle;
            debug!("Debounce window elapsed, emitting {:?}", event);
            ctx.events.emit(event);
        });

        debug!("Debounce for {:?} armed ({}s)", self.event, self.window);
        *state = DebounceState::Pending(handle);
    }

    /// Returns `true` while an emission is scheduled.
    pub fn is_pending(&self) -> bool {
        matches!(&*self.state.borrow(), DebounceState::Pending(handle) if handle.is_active())
    }

    /// Quiet period in seconds.
    pub fn window(&self) -> f32 {
        self.window
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::TestFrame;
    use std::cell::Cell;

    fn setup() -> (TestFrame, Debouncer, Rc<Cell<u32>>) {
        let frame = TestFrame::new();
        let emitted = Rc::new(Cell::new(0));
        let e = Rc::clone(&emitted);
        frame
            .events
            .add_observer(CoreEvent::GraphicsDeviceReset, move |_| e.set(e.get() + 1));

        let debouncer = Debouncer::new(0.05, CoreEvent::GraphicsDeviceReset);
        (frame, debouncer, emitted)
    }

    fn tick(frame: &mut TestFrame, dt: f32) {
        let timers = frame.timers.clone();
        let mut ctx = frame.step(dt);
        timers.advance(&mut ctx);
    }

    //=====================================================================
    // Coalescing
    //=====================================================================

    #[test]
    fn burst_emits_once() {
        let (mut frame, debouncer, emitted) = setup();

        debouncer.trigger(&frame.timers);
        tick(&mut frame, 0.005);
        debouncer.trigger(&frame.timers);
        tick(&mut frame, 0.005);
        debouncer.trigger(&frame.timers);

        for _ in 0..6 {
            tick(&mut frame, 0.01);
        }
        assert_eq!(emitted.get(), 1, "Three notifications coalesce into one");
        assert!(!debouncer.is_pending());

        for _ in 0..10 {
            tick(&mut frame, 0.01);
        }
        assert_eq!(emitted.get(), 1);
    }

    #[test]
    fn trigger_pushes_deadline_back() {
        let (mut frame, debouncer, emitted) = setup();

        debouncer.trigger(&frame.timers);
        tick(&mut frame, 0.04);
        debouncer.trigger(&frame.timers);
        tick(&mut frame, 0.04);
        assert_eq!(emitted.get(), 0, "Window restarted by second trigger");
        assert!(debouncer.is_pending());

        tick(&mut frame, 0.02);
        assert_eq!(emitted.get(), 1);
    }

    #[test]
    fn reset_never_schedules_a_second_timer() {
        let (frame, debouncer, _) = setup();

        for _ in 0..5 {
            debouncer.trigger(&frame.timers);
        }
        assert_eq!(frame.timers.len(), 1);
    }

    #[test]
    fn separate_bursts_emit_separately() {
        let (mut frame, debouncer, emitted) = setup();

        debouncer.trigger(&frame.timers);
        tick(&mut frame, 0.06);
        assert_eq!(emitted.get(), 1);

        debouncer.trigger(&frame.timers);
        assert!(debouncer.is_pending(), "Idle again after emitting");
        tick(&mut frame, 0.06);
        assert_eq!(emitted.get(), 2);
    }

    #[test]
    fn rearms_after_external_stop_all() {
        let (mut frame, debouncer, emitted) = setup();

        debouncer.trigger(&frame.timers);
        frame.timers.stop_all();
        assert!(!debouncer.is_pending());

        debouncer.trigger(&frame.timers);
        tick(&mut frame, 0.06);
        assert_eq!(emitted.get(), 1);
    }

    #[test]
    fn negative_window_clamps_to_zero() {
        let debouncer = Debouncer::new(-1.0, CoreEvent::OrientationChanged);
        assert_eq!(debouncer.window(), 0.0);
    }
}
