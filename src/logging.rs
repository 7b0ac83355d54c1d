//=========================================================================
// Logging
//=========================================================================
//
// Optional `env_logger` backend for the `log` facade.
//
// The library only logs through `log` macros; installing a backend is
// the application's call. `Runtime::run` installs this one when
// `RuntimeConfig::logging.init` is set.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Once;

use serde::{Deserialize, Serialize};

//=== LoggingConfig =======================================================

/// Logger configuration.
///
/// `filter` follows the `env_logger` filter syntax (e.g. "info",
/// "cadence_runtime=debug,winit=warn"). `write_style` is one of "auto",
/// "always" or "never".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Install the logger from `Runtime::run`.
    pub init: bool,
    pub filter: Option<String>,
    pub write_style: Option<String>,
}

impl LoggingConfig {
    fn parse_write_style(&self) -> env_logger::WriteStyle {
        match self.write_style.as_deref() {
            Some("always") => env_logger::WriteStyle::Always,
            Some("never") => env_logger::WriteStyle::Never,
            _ => env_logger::WriteStyle::Auto,
        }
    }
}

//=== init_logging ========================================================

static INIT: Once = Once::new();

/// Installs the global logger once.
///
/// Idempotent; subsequent calls are ignored. The filter comes from
/// `config.filter`, else `RUST_LOG`, else `info`.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.parse_write_style());

        // Another backend may already be installed by the host application.
        if builder.try_init().is_err() {
            log::debug!("logger already installed, keeping it");
            return;
        }

        log::debug!("logging initialized");
    });
}
