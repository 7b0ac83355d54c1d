//=========================================================================
// Manager Registry
//=========================================================================
//
// Ordered collection of global managers.
//
// Managers are stored in registration order. Updating walks a snapshot of
// the slot count taken when iteration starts; each manager is moved out of
// its slot for the duration of its own update so it can freely use the
// registry through `FrameContext::managers`.
//
// Mutation during iteration:
// - register   → appended past the snapshot, first updated next tick
// - unregister → slot marked removed (tombstone), swept after iteration
//
// A panicking update still propagates, but only after the manager is put
// back into its slot and the pass is closed, so the next tick sees an
// intact registry.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::panic::{self, AssertUnwindSafe};

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::{GlobalManager, ManagerId, ManagerKind};
use crate::core::context::FrameContext;

//=== Slot ================================================================

struct Slot {
    id: ManagerId,
    kind: ManagerKind,
    enabled: bool,
    removed: bool,

    // `None` only while this manager's own update is running.
    manager: Option<Box<dyn GlobalManager>>,
}

//=== ManagerRegistry =====================================================

/// Owns every registered [`GlobalManager`] and ticks them in order.
pub struct ManagerRegistry {
    slots: Vec<Slot>,
    next_id: u64,
    updating: bool,
}

impl ManagerRegistry {
    //--- Construction -----------------------------------------------------

    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
            updating: false,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Appends a manager and enables it.
    ///
    /// Managers registered while the registry is updating are first
    /// updated on the next tick.
    pub fn register<M>(&mut self, manager: M) -> ManagerId
    where
        M: GlobalManager + 'static,
    {
        self.register_boxed(Box::new(manager))
    }

    /// Boxed variant of [`register`](Self::register).
    pub fn register_boxed(&mut self, manager: Box<dyn GlobalManager>) -> ManagerId {
        let id = ManagerId(self.next_id);
        self.next_id += 1;

        let kind = manager.kind();
        debug!("Registering manager {:?} ({:?})", id, kind);

        self.slots.push(Slot {
            id,
            kind,
            enabled: true,
            removed: false,
            manager: Some(manager),
        });
        id
    }

    /// Disables and removes a manager, returning ownership of it.
    ///
    /// Unknown ids are ignored. When a manager unregisters itself from
    /// inside its own update there is nothing to hand back: it is dropped
    /// as soon as that update returns and `None` is returned.
    pub fn unregister(&mut self, id: ManagerId) -> Option<Box<dyn GlobalManager>> {
        let Some(index) = self.position(id) else {
            trace!("Unregister ignored: manager {:?} not registered", id);
            return None;
        };

        debug!("Unregistering manager {:?} ({:?})", id, self.slots[index].kind);

        if !self.updating {
            return self.slots.remove(index).manager;
        }

        let slot = &mut self.slots[index];
        slot.removed = true;
        slot.enabled = false;
        let manager = slot.manager.take();
        if manager.is_none() {
            debug!("Manager {:?} unregistered during its own update", id);
        }
        manager
    }

    //--- Lookup -----------------------------------------------------------

    /// Returns the first registered manager tagged with `kind`.
    pub fn find(&self, kind: ManagerKind) -> Option<ManagerId> {
        self.live().find(|slot| slot.kind == kind).map(|slot| slot.id)
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: ManagerId) -> bool {
        self.position(id).is_some()
    }

    /// Borrows a registered manager.
    ///
    /// Returns `None` for unknown ids and for the manager currently
    /// running its update.
    pub fn get(&self, id: ManagerId) -> Option<&(dyn GlobalManager + 'static)> {
        let index = self.position(id)?;
        self.slots[index].manager.as_deref()
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, id: ManagerId) -> Option<&mut (dyn GlobalManager + 'static)> {
        let index = self.position(id)?;
        self.slots[index].manager.as_deref_mut()
    }

    /// Ids of all registered managers, in update order.
    pub fn ids(&self) -> Vec<ManagerId> {
        self.live().map(|slot| slot.id).collect()
    }

    /// Number of registered managers.
    pub fn len(&self) -> usize {
        self.live().count()
    }

    /// Returns `true` if no managers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    //--- Enable / Disable -------------------------------------------------

    /// Toggles whether a manager is ticked. Returns `false` for unknown ids.
    pub fn set_enabled(&mut self, id: ManagerId, enabled: bool) -> bool {
        match self.position(id) {
            Some(index) => {
                trace!("Manager {:?} enabled = {}", id, enabled);
                self.slots[index].enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `id` is registered and enabled.
    pub fn is_enabled(&self, id: ManagerId) -> bool {
        self.position(id)
            .map(|index| self.slots[index].enabled)
            .unwrap_or(false)
    }

    //--- Update Loop ------------------------------------------------------

    /// Updates every enabled manager once, in registration order.
    ///
    /// Managers may register or unregister any manager (themselves
    /// included) while this runs; see the module notes for the rules.
    pub(crate) fn update_all(ctx: &mut FrameContext<'_>) {
        let snapshot = ctx.managers.begin_update();

        for index in 0..snapshot {
            let Some(mut manager) = ctx.managers.take_for_update(index) else {
                continue;
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| manager.update(ctx)));
            ctx.managers.finish_update(index, manager);

            if let Err(payload) = outcome {
                warn!("Manager update panicked, aborting this pass");
                ctx.managers.end_update();
                panic::resume_unwind(payload);
            }
        }

        ctx.managers.end_update();
    }

    //--- Internal Helpers -------------------------------------------------

    fn live(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|slot| !slot.removed)
    }

    fn position(&self, id: ManagerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.id == id && !slot.removed)
    }

    fn begin_update(&mut self) -> usize {
        self.updating = true;
        self.slots.len()
    }

    fn take_for_update(&mut self, index: usize) -> Option<Box<dyn GlobalManager>> {
        let slot = &mut self.slots[index];
        if slot.removed || !slot.enabled {
            return None;
        }
        slot.manager.take()
    }

    fn finish_update(&mut self, index: usize, manager: Box<dyn GlobalManager>) {
        let slot = &mut self.slots[index];
        if slot.removed {
            trace!("Dropping manager {:?} after its final update", slot.id);
            return;
        }
        slot.manager = Some(manager);
    }

    fn end_update(&mut self) {
        self.slots.retain(|slot| !slot.removed);
        self.updating = false;
    }
}

impl Default for ManagerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
