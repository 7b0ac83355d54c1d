//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use cadence_runtime::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime facade
pub use crate::runtime::{App, Runtime, RuntimeBuilder};
pub use crate::config::RuntimeConfig;
pub use crate::error::RuntimeError;

// Frame context
pub use crate::core::context::{DrawContext, FrameContext};

// Managers
pub use crate::core::managers::{GlobalManager, ManagerId, ManagerKind};

// Scheduling
pub use crate::core::coroutines::{CoroutineHandle, Routine, Steps, Yield};
pub use crate::core::timers::TimerHandle;

// Events and input
pub use crate::core::events::CoreEvent;
pub use crate::core::input::{KeyCode, MouseButton};
pub use crate::core::platform_bridge::HostEvent;
