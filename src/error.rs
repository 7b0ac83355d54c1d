//=========================================================================
// Runtime Errors
//=========================================================================
//
// Failures of the fallible outer surface: configuration loading and the
// winit host. Scheduling itself is infallible; stale handles and missing
// managers are reported through `bool`/`Option` instead.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use thiserror::Error;

//=== RuntimeError ========================================================

/// Errors returned by configuration loading and [`Runtime::run`](crate::Runtime::run).
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`RuntimeConfig`](crate::RuntimeConfig).
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config parsed but holds values the runtime cannot use.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to create the event loop (rare, indicates an OS-level issue).
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    /// Event loop terminated with an error.
    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),
}

/// Result alias for runtime operations.
pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;
