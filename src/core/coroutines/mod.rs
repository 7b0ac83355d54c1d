//=========================================================================
// Coroutines
//=========================================================================
//
// Cooperative multi-step routines that suspend on time, on the next
// frame, or on another coroutine.
//
//=========================================================================

mod handle;
mod routine;
mod scheduler;

pub use handle::{CoroutineHandle, CoroutineId, CoroutineStatus};
pub use routine::{Routine, Steps, Yield};
pub use scheduler::CoroutineScheduler;
