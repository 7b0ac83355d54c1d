//=========================================================================
// Runtime Configuration
//=========================================================================
//
// Serializable settings for the runtime and its winit host.
//
// Every field has a default, so a TOML file only lists what it changes:
//
// ```toml
// device_reset_debounce = 0.1
//
// [window]
// title = "Sandbox"
// width = 1920
// height = 1080
//
// [logging]
// init = true
// filter = "cadence_runtime=debug"
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::error::{Result, RuntimeError};
use crate::logging::LoggingConfig;

//=== WindowConfig ========================================================

/// Initial window settings used by the platform driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Logical width in pixels.
    pub width: u32,

    /// Logical height in pixels.
    pub height: u32,

    /// Borderless fullscreen on the current monitor.
    pub fullscreen: bool,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            title: "Cadence".to_string(),
        }
    }
}

//=== RuntimeConfig =======================================================

/// Complete runtime configuration.
///
/// # Default Values
///
/// - **Window**: 1280x720, windowed, titled "Cadence"
/// - **Device reset debounce**: 0.05 s
/// - **Max frame delta**: 0.25 s
/// - **Host channel capacity**: 128 events
/// - **Pause on focus lost / exit on escape**: off
/// - **Logging**: not installed by the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub window: WindowConfig,

    /// Quiet period, in seconds, before a burst of device-changed
    /// notifications emits `GraphicsDeviceReset`.
    pub device_reset_debounce: f32,

    /// Upper bound on the wall-clock delta the platform driver feeds into
    /// a single tick (stalls, debugger breaks).
    pub max_frame_delta: f32,

    /// Capacity of the bounded host event channel.
    pub host_channel_capacity: usize,

    /// Skip ticking while the window is unfocused.
    pub pause_on_focus_lost: bool,

    /// Request exit when Escape is pressed.
    pub exit_on_escape: bool,

    pub logging: LoggingConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            device_reset_debounce: 0.05,
            max_frame_delta: 0.25,
            host_channel_capacity: 128,
            pause_on_focus_lost: false,
            exit_on_escape: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl RuntimeConfig {
    //--- Loading ----------------------------------------------------------

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading runtime config from {}", path.display());

        let source = std::fs::read_to_string(path).map_err(|source| RuntimeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RuntimeError::InvalidConfig(e.to_string()))
    }

    //--- Validation -------------------------------------------------------

    /// Rejects values the runtime cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(RuntimeError::InvalidConfig(format!(
                "window size must be positive, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !(self.device_reset_debounce.is_finite() && self.device_reset_debounce >= 0.0) {
            return Err(RuntimeError::InvalidConfig(format!(
                "device_reset_debounce must be a non-negative number, got {}",
                self.device_reset_debounce
            )));
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(RuntimeError::InvalidConfig(format!(
                "max_frame_delta must be positive, got {}",
                self.max_frame_delta
            )));
        }
        if self.host_channel_capacity == 0 {
            return Err(RuntimeError::InvalidConfig(
                "host_channel_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.device_reset_debounce, 0.05);
        assert_eq!(config.host_channel_capacity, 128);
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn partial_document_overrides_listed_fields() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            device_reset_debounce = 0.1
            exit_on_escape = true

            [window]
            title = "Sandbox"
            width = 640

            [logging]
            filter = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.device_reset_debounce, 0.1);
        assert!(config.exit_on_escape);
        assert_eq!(config.window.title, "Sandbox");
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720, "Unlisted fields keep defaults");
        assert_eq!(config.logging.filter.as_deref(), Some("debug"));
        assert!(!config.logging.init);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = RuntimeConfig::from_toml_str("window = [").unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigParse(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            "host_channel_capacity = 0",
            "device_reset_debounce = -1.0",
            "max_frame_delta = 0.0",
            "[window]\nwidth = 0",
        ];

        for source in cases {
            let err = RuntimeConfig::from_toml_str(source).unwrap_err();
            assert!(
                matches!(err, RuntimeError::InvalidConfig(_)),
                "{:?} should be rejected",
                source
            );
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RuntimeConfig::load("/nonexistent/cadence.toml").unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigIo { .. }));
        assert!(err.to_string().contains("/nonexistent/cadence.toml"));
    }

    #[test]
    fn toml_output_parses_back() {
        let mut config = RuntimeConfig::default();
        config.window.title = "Again".into();

        let text = config.to_toml_string().unwrap();
        assert_eq!(RuntimeConfig::from_toml_str(&text).unwrap(), config);
    }
}
