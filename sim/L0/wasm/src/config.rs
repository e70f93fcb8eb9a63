//! Registry configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handle::MAX_CAPACITY;

/// Errors from [`RegistryConfig::validate`] and [`RegistryConfig::from_json`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Table size outside `2..=256`.
    #[error("capacity must be between 2 and {MAX_CAPACITY}, got {0}")]
    Capacity(usize),
    /// Error buffers need room for at least the terminator.
    #[error("error message capacity must be at least 1, got {0}")]
    MessageCapacity(usize),
    /// The JSON document could not be parsed.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for a [`Registry`](crate::Registry).
///
/// Missing JSON fields take their default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of slots, including the reserved slot 0. At most `N - 1`
    /// instances are live at once.
    pub capacity: usize,
    /// Size of each error message buffer in bytes, terminator included.
    pub error_message_capacity: usize,
    /// Tag handles with a per-slot generation so a handle from a freed and
    /// reused slot is rejected. When off, handles are bare slot indices.
    pub stale_handle_check: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            error_message_capacity: 256,
            stale_handle_check: true,
        }
    }
}

impl RegistryConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of slots.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the error message buffer size.
    #[must_use]
    pub fn error_message_capacity(mut self, bytes: usize) -> Self {
        self.error_message_capacity = bytes;
        self
    }

    /// Enable or disable generation tagging.
    #[must_use]
    pub fn stale_handle_check(mut self, enabled: bool) -> Self {
        self.stale_handle_check = enabled;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity cannot hold one live slot or
    /// does not fit the handle encoding, or if the message capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_CAPACITY).contains(&self.capacity) {
            return Err(ConfigError::Capacity(self.capacity));
        }
        if self.error_message_capacity == 0 {
            return Err(ConfigError::MessageCapacity(self.error_message_capacity));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input, otherwise the
    /// errors of [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
