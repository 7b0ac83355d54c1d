//=========================================================================
// Timers
//=========================================================================
//
// Deferred callbacks driven by frame time.
//
//=========================================================================

mod handle;
mod scheduler;

pub use handle::{TimerHandle, TimerId, TimerStatus};
pub use scheduler::TimerScheduler;
