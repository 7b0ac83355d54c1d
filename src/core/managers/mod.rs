//=========================================================================
// Global Managers
//=========================================================================
//
// Independently owned subsystems ticked once per frame by the runtime.
//
// Architecture:
//   ManagerRegistry
//     └─ slots: Vec<Slot { id, kind, enabled, manager }>
//
// Flow:
//   Runtime::tick() → ManagerRegistry::update_all() → GlobalManager::update()
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::context::FrameContext;

//=== Module Declarations =================================================

mod registry;

//=== Public API ==========================================================

pub use registry::ManagerRegistry;

//=== ManagerKind =========================================================

/// Capability tag carried by every manager, used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerKind {
    /// The built-in [`CoroutineScheduler`](crate::core::coroutines::CoroutineScheduler).
    Coroutines,

    /// The built-in [`TimerScheduler`](crate::core::timers::TimerScheduler).
    Timers,

    /// Tween/animation drivers.
    Tweens,

    /// Render-target bookkeeping.
    RenderTargets,

    /// Any other user-defined subsystem.
    Custom(&'static str),
}

//=== ManagerId ===========================================================

/// Identity of a registered manager, returned by
/// [`ManagerRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManagerId(pub(crate) u64);

//=== GlobalManager Trait =================================================

/// A subsystem the runtime ticks every frame while it is enabled.
///
/// The enabled flag lives in the registry, not in the manager, so
/// implementations only describe what they are and what a tick does.
///
/// ```rust
/// # use cadence_runtime::prelude::*;
/// struct FrameCounter(u64);
///
/// impl GlobalManager for FrameCounter {
///     fn kind(&self) -> ManagerKind {
///         ManagerKind::Custom("frame-counter")
///     }
///
///     fn update(&mut self, _ctx: &mut FrameContext<'_>) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait GlobalManager {
    /// Tag used by [`ManagerRegistry::find`].
    fn kind(&self) -> ManagerKind;

    /// Called once per tick, in registration order, while enabled.
    fn update(&mut self, ctx: &mut FrameContext<'_>);
}
