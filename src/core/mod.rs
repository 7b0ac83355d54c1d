//=========================================================================
// Core Systems
//
// Engine-independent building blocks driven by the `Runtime` each tick.
//
// Responsibilities:
// - Global time accumulation (`time`)
// - Input sampling (`input`)
// - Global manager registry and lifecycle (`managers`)
// - Deferred callbacks and cooperative routines (`timers`, `coroutines`)
// - Lifecycle notifications (`events`, `debounce`)
// - Host-to-core notification channel (`platform_bridge`)
//
// Notes:
// Everything here is single-threaded. Systems receive the explicit
// `FrameContext` instead of reaching for a global instance; only the
// host bridge's sender may cross threads.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod context;
pub mod coroutines;
pub mod debounce;
pub mod events;
pub mod input;
pub mod managers;
pub mod platform_bridge;
pub mod time;
pub mod timers;

//=== Public API ==========================================================

pub use context::{DrawContext, FrameContext};
pub use coroutines::{CoroutineHandle, CoroutineScheduler, CoroutineStatus, Routine, Steps, Yield};
pub use debounce::Debouncer;
pub use events::{CoreEvent, Emitter, ListenerId};
pub use input::{InputEvent, InputState, KeyCode, Modifiers, MouseButton};
pub use managers::{GlobalManager, ManagerId, ManagerKind, ManagerRegistry};
pub use platform_bridge::HostEvent;
pub use time::Time;
pub use timers::{TimerHandle, TimerScheduler, TimerStatus};
