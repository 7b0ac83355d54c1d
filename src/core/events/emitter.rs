//=========================================================================
// Emitter
//=========================================================================
//
// Typed publish/subscribe channel keyed by event kind.
//
// Architecture:
//   add_observer(kind, fn) → HashMap<E, Vec<(ListenerId, Listener)>>
//                                  ↓
//   emit(kind) → snapshot listeners → call each in subscription order
//
// Listeners are snapshotted before dispatch, so observers added or removed
// by a listener only affect later emissions.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use log::{trace, warn};

//=== Event Kind Trait ====================================================

/// Marker trait for types usable as emitter keys.
///
/// Automatically implemented for every small, copyable, hashable type.
pub trait EventKind: Copy + Eq + Hash + fmt::Debug + 'static {}

// Blanket implementation
impl<T: Copy + Eq + Hash + fmt::Debug + 'static> EventKind for T {}

//=== ListenerId ==========================================================

/// Token returned by [`Emitter::add_observer`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

//=== Internal Storage ====================================================

type Listener<E> = Rc<RefCell<dyn FnMut(E)>>;

struct Observers<E: EventKind> {
    next_id: u64,
    by_kind: HashMap<E, Vec<(ListenerId, Listener<E>)>>,
}

//=== Emitter =============================================================

/// Synchronous, single-threaded event channel.
///
/// Cloning an `Emitter` yields another handle to the same observer table,
/// which lets listeners capture the emitter they are registered on.
pub struct Emitter<E: EventKind> {
    observers: Rc<RefCell<Observers<E>>>,
}

impl<E: EventKind> Emitter<E> {
    /// Creates an emitter with no observers.
    pub fn new() -> Self {
        Self {
            observers: Rc::new(RefCell::new(Observers {
                next_id: 0,
                by_kind: HashMap::new(),
            })),
        }
    }

    //--- Subscription -----------------------------------------------------

    /// Subscribes `listener` to `kind`.
    ///
    /// Listeners for the same kind run in the order they were added.
    pub fn add_observer<F>(&self, kind: E, listener: F) -> ListenerId
    where
        F: FnMut(E) + 'static,
    {
        let mut observers = self.observers.borrow_mut();
        let id = ListenerId(observers.next_id);
        observers.next_id += 1;

        let listener: Listener<E> = Rc::new(RefCell::new(listener));
        observers.by_kind.entry(kind).or_default().push((id, listener));

        trace!("Observer {:?} added for {:?}", id, kind);
        id
    }

    /// Unsubscribes a listener. Returns `false` if it was not subscribed.
    pub fn remove_observer(&self, kind: E, id: ListenerId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let Some(list) = observers.by_kind.get_mut(&kind) else {
            return false;
        };

        let before = list.len();
        list.retain(|(listener_id, _)| *listener_id != id);
        before != list.len()
    }

    //--- Dispatch ---------------------------------------------------------

    /// Invokes every listener currently subscribed to `kind`.
    ///
    /// Emitting a kind nobody listens to is a no-op.
    pub fn emit(&self, kind: E) {
        let snapshot: Vec<Listener<E>> = {
            let observers = self.observers.borrow();
            match observers.by_kind.get(&kind) {
                Some(list) => list.iter().map(|(_, l)| Rc::clone(l)).collect(),
                None => return,
            }
        };

        trace!("Emitting {:?} to {} observers", kind, snapshot.len());

        for listener in snapshot {
            match listener.try_borrow_mut() {
                Ok(mut call) => (&mut *call)(kind),
                Err(_) => warn!("Skipping re-entrant observer for {:?}", kind),
            }
        }
    }

    //--- Query API --------------------------------------------------------

    /// Returns the number of listeners subscribed to `kind`.
    pub fn observer_count(&self, kind: E) -> usize {
        self.observers
            .borrow()
            .by_kind
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl<E: EventKind> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            observers: Rc::clone(&self.observers),
        }
    }
}

impl<E: EventKind> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EventKind> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observers = self.observers.borrow();
        let counts: Vec<_> = observers
            .by_kind
            .iter()
            .map(|(kind, list)| format!("{:?}: {}", kind, list.len()))
            .collect();

        f.debug_struct("Emitter").field("observers", &counts).finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestEvent {
        Ping,
        Pong,
    }

    #[test]
    fn emit_without_observers_is_noop() {
        let emitter = Emitter::<TestEvent>::new();
        emitter.emit(TestEvent::Ping);
        assert_eq!(emitter.observer_count(TestEvent::Ping), 0);
    }

    #[test]
    fn emit_reaches_only_matching_kind() {
        let emitter = Emitter::new();
        let pings = Rc::new(Cell::new(0));
        let pongs = Rc::new(Cell::new(0));

        let p = Rc::clone(&pings);
        emitter.add_observer(TestEvent::Ping, move |_| p.set(p.get() + 1));
        let p = Rc::clone(&pongs);
        emitter.add_observer(TestEvent::Pong, move |_| p.set(p.get() + 1));

        emitter.emit(TestEvent::Ping);
        emitter.emit(TestEvent::Ping);

        assert_eq!(pings.get(), 2);
        assert_eq!(pongs.get(), 0);
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let emitter = Emitter::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let order = Rc::clone(&order);
            emitter.add_observer(TestEvent::Ping, move |_| order.borrow_mut().push(i));
        }

        emitter.emit(TestEvent::Ping);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn listener_receives_kind() {
        let emitter = Emitter::new();
        let seen = Rc::new(Cell::new(None));
        let s = Rc::clone(&seen);
        emitter.add_observer(TestEvent::Pong, move |kind| s.set(Some(kind)));

        emitter.emit(TestEvent::Pong);
        assert_eq!(seen.get(), Some(TestEvent::Pong));
    }

    #[test]
    fn remove_observer_stops_delivery() {
        let emitter = Emitter::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let id = emitter.add_observer(TestEvent::Ping, move |_| c.set(c.get() + 1));

        assert!(emitter.remove_observer(TestEvent::Ping, id));
        assert!(!emitter.remove_observer(TestEvent::Ping, id), "Second removal is a no-op");
        assert!(!emitter.remove_observer(TestEvent::Pong, id));

        emitter.emit(TestEvent::Ping);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn observer_added_during_emit_waits_for_next_emit() {
        let emitter = Emitter::new();
        let late_calls = Rc::new(Cell::new(0));

        let handle = emitter.clone();
        let late = Rc::clone(&late_calls);
        let added = Rc::new(Cell::new(false));
        emitter.add_observer(TestEvent::Ping, move |_| {
            if !added.get() {
                added.set(true);
                let late = Rc::clone(&late);
                handle.add_observer(TestEvent::Ping, move |_| late.set(late.get() + 1));
            }
        });

        emitter.emit(TestEvent::Ping);
        assert_eq!(late_calls.get(), 0, "New observer must not run in the same emission");

        emitter.emit(TestEvent::Ping);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn observer_removed_during_emit_still_runs_this_time() {
        let emitter = Emitter::new();
        let second_calls = Rc::new(Cell::new(0));
        let second_id = Rc::new(Cell::new(None));

        let handle = emitter.clone();
        let id_slot = Rc::clone(&second_id);
        emitter.add_observer(TestEvent::Ping, move |kind| {
            if let Some(id) = id_slot.get() {
                handle.remove_observer(kind, id);
            }
        });

        let s = Rc::clone(&second_calls);
        let id = emitter.add_observer(TestEvent::Ping, move |_| s.set(s.get() + 1));
        second_id.set(Some(id));

        emitter.emit(TestEvent::Ping);
        assert_eq!(second_calls.get(), 1, "Snapshot still includes the removed observer");

        emitter.emit(TestEvent::Ping);
        assert_eq!(second_calls.get(), 1);
    }

    #[test]
    fn reentrant_emit_skips_busy_listener() {
        let emitter = Emitter::new();
        let calls = Rc::new(Cell::new(0));

        let handle = emitter.clone();
        let c = Rc::clone(&calls);
        emitter.add_observer(TestEvent::Ping, move |kind| {
            c.set(c.get() + 1);
            handle.emit(kind);
        });

        emitter.emit(TestEvent::Ping);
        assert_eq!(calls.get(), 1, "Nested emission must not re-enter the running listener");
    }
}
