//=========================================================================
// Event Collector
//=========================================================================
//
// Host event collector with bounded per-frame draining.
//
// Architecture:
//   Sender<HostEvent> (any thread) → Receiver<HostEvent>
//                                      ↓ collect_frame()
//                                    events → Runtime dispatch
//
// Bounded draining prevents a flooding host from starving the tick;
// anything left over is picked up next frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::HostEvent;

//=== Constants ===========================================================

/// Upper bound of host events dispatched in a single tick.
pub(crate) const MAX_EVENTS_PER_FRAME: usize = 100;

//=== EventCollector ======================================================

/// Owns the host channel and collects its events once per frame.
pub(crate) struct EventCollector {
    // Kept so the channel never disconnects while the runtime lives.
    sender: Sender<HostEvent>,
    receiver: Receiver<HostEvent>,
    events: Vec<HostEvent>,
}

impl EventCollector {
    /// Creates a collector over a bounded channel of `capacity` events.
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self::from_channel(sender, receiver)
    }

    pub(crate) fn from_channel(sender: Sender<HostEvent>, receiver: Receiver<HostEvent>) -> Self {
        Self {
            sender,
            receiver,
            events: Vec::with_capacity(8),
        }
    }

    /// Returns a new sending end of the host channel.
    pub(crate) fn sender(&self) -> Sender<HostEvent> {
        self.sender.clone()
    }

    /// Collects pending host events (bounded to prevent starvation).
    ///
    /// Returns the number of events collected this frame.
    pub(crate) fn collect_frame(&mut self) -> usize {
        self.events.clear();

        while self.events.len() < MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => self.events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if self.events.len() >= MAX_EVENTS_PER_FRAME && !self.receiver.is_empty() {
            warn!(
                "Host event backlog: drained {} events this frame, {} left",
                self.events.len(),
                self.receiver.len()
            );
        }

        self.events.len()
    }

    /// Returns the events collected this frame.
    #[cfg(test)]
    pub(crate) fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Takes ownership of the collected events, leaving an empty vec.
    pub(crate) fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
