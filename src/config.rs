//! Bridge configuration types and defaults.
//!
//! This module defines the configuration options for the bridge, including
//! the per-stream capture bound and the script-side callback registry.

use serde::{Deserialize, Serialize};

/// Default usable capture bound per stream, in bytes.
pub const DEFAULT_CAPTURE_LIMIT_BYTES: usize = 4095;

/// Default callback registry expression in the script environment.
pub const DEFAULT_CALLBACK_REGISTRY: &str = "window.__webshell_callbacks";

/// Configuration for the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Maximum bytes captured from each of stdout and stderr; output beyond
    /// this bound is drained and discarded (default: 4095).
    #[serde(default = "default_capture_limit")]
    pub capture_limit_bytes: usize,

    /// Expression naming the callback registry object in the script
    /// environment (default: `window.__webshell_callbacks`).
    ///
    /// Restricted to a dotted identifier path; anything else fails
    /// [`validate`](Self::validate), since this string is interpolated into
    /// evaluated script source.
    #[serde(default = "default_callback_registry")]
    pub callback_registry: String,

    /// Enable debug mode (default: false).
    #[serde(default)]
    pub debug: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            capture_limit_bytes: DEFAULT_CAPTURE_LIMIT_BYTES,
            callback_registry: DEFAULT_CALLBACK_REGISTRY.to_string(),
            debug: false,
        }
    }
}

impl BridgeConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the per-stream capture bound.
    pub fn with_capture_limit(mut self, bytes: usize) -> Self {
        self.capture_limit_bytes = bytes;
        self
    }

    /// Set the callback registry expression.
    pub fn with_callback_registry(mut self, registry: impl Into<String>) -> Self {
        self.callback_registry = registry.into();
        self
    }

    /// Enable debug mode.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture_limit_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "capture_limit_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if !is_identifier_path(&self.callback_registry) {
            return Err(ConfigError::InvalidValue {
                field: "callback_registry".into(),
                reason: "must be a dotted identifier path".into(),
            });
        }

        Ok(())
    }
}

/// Check that `expr` is a dot-separated sequence of script identifiers.
///
/// The registry expression ends up inside evaluated script source, so it must
/// not be able to carry arbitrary code.
fn is_identifier_path(expr: &str) -> bool {
    if expr.is_empty() {
        return false;
    }
    expr.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    })
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// The field name.
        field: String,
        /// The reason it's invalid.
        reason: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Default value functions for serde
fn default_capture_limit() -> usize {
    DEFAULT_CAPTURE_LIMIT_BYTES
}

fn default_callback_registry() -> String {
    DEFAULT_CALLBACK_REGISTRY.to_string()
}
