//=========================================================================
// Event System
//=========================================================================
//
// Coarse lifecycle and environment-change notifications.
//
// The runtime owns one `Emitter<CoreEvent>` for its whole lifetime and
// hands it to systems through `FrameContext::events`.
//
//=========================================================================

//=== Module Declarations =================================================

mod emitter;

//=== Public API ==========================================================

pub use emitter::{Emitter, EventKind, ListenerId};

//=== CoreEvent ===========================================================

/// Runtime-level events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreEvent {
    /// The graphics device or back buffer changed (debounced).
    GraphicsDeviceReset,

    /// The display switched between portrait and landscape.
    OrientationChanged,

    /// The host is shutting down.
    Exiting,
}
