//=========================================================================
// Input Sampling
//=========================================================================
//
// Minimal input collaborator for the frame loop: hosts push events, the
// runtime samples them once per tick, systems query the snapshot.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;
mod state;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, Modifiers, MouseButton};
pub use state::InputState;
