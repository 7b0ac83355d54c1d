//=========================================================================
// Host Bridge
//=========================================================================
//
// Bridges the host layer (winit driver, OS callbacks, worker threads)
// with the single-threaded runtime core.
//
// Components:
// - `interface`: `HostEvent`, the contract
// - `event_collector`: core-side channel draining
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub(crate) use event_collector::EventCollector;
pub use interface::HostEvent;
