//=========================================================================
// Cadence Runtime Library Root
//
// Per-frame orchestration core for small real-time applications.
//
// Responsibilities:
// - Expose the `Runtime` facade and its `RuntimeBuilder`
// - Expose the core systems (`core`) for apps and custom managers
// - Keep the winit host (`platform`) hidden from end users
//
// Typical usage:
// ```no_run
// use cadence_runtime::prelude::*;
//
// struct Game;
// impl App for Game {}
//
// fn main() -> Result<(), RuntimeError> {
//     Runtime::new(Game).run()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the scheduling systems and is public so apps can write
// their own managers and routines. `config`, `error` and `logging` are
// the ambient surface around it.
//
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` holds the winit integration and is only reachable through
// `Runtime::run`.
//
mod platform;
mod runtime;

//--- Public Exports ------------------------------------------------------

pub use config::{RuntimeConfig, WindowConfig};
pub use error::RuntimeError;
pub use logging::{init_logging, LoggingConfig};
pub use runtime::{App, Runtime, RuntimeBuilder};
