//=========================================================================
// Host Bridge Interface
//=========================================================================
//
// Host-to-runtime notification types.
//
// Defines the contract between the host (window system, OS callbacks,
// other threads) and the single-threaded runtime core.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;

//=== HostEvent ===========================================================

/// Notifications sent from the host to the runtime over its channel.
///
/// Drained during step (2) of every tick; see
/// [`Runtime::host_sender`](crate::Runtime::host_sender).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Display or graphics device changed (resize, scale change, ...).
    DeviceChanged,

    /// Screen orientation flipped.
    OrientationChanged,

    /// Host is shutting down.
    Exiting,

    /// Raw input to feed the sampler.
    Input(InputEvent),
}

impl From<InputEvent> for HostEvent {
    fn from(event: InputEvent) -> Self {
        HostEvent::Input(event)
    }
}
