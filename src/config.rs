//! Client configuration: how many requests per window, and how long a window is.

use std::time::Duration;

/// Validated configuration for a rate-limited client.
///
/// A client dispatches at most `request_limit` requests per `window`. Both
/// values are fixed for the lifetime of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    window: Duration,
    request_limit: u32,
}

/// Errors produced when validating client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Request limit must be > 0.
    InvalidRequestLimit {
        /// Value provided by caller.
        provided: u32,
    },
    /// Window must be > 0.
    InvalidWindow(Duration),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidRequestLimit { provided } => {
                write!(f, "request_limit must be > 0 (got {})", provided)
            }
            ConfigError::InvalidWindow(window) => {
                write!(f, "window must be > 0 (got {:?})", window)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ClientConfig {
    /// Create a config with validation.
    pub fn new(window: Duration, request_limit: u32) -> Result<Self, ConfigError> {
        if request_limit == 0 {
            return Err(ConfigError::InvalidRequestLimit { provided: request_limit });
        }
        if window.is_zero() {
            return Err(ConfigError::InvalidWindow(window));
        }
        Ok(Self { window, request_limit })
    }

    /// At most `request_limit` requests per second.
    pub fn per_second(request_limit: u32) -> Result<Self, ConfigError> {
        Self::new(Duration::from_secs(1), request_limit)
    }

    /// At most `request_limit` requests per minute.
    pub fn per_minute(request_limit: u32) -> Result<Self, ConfigError> {
        Self::new(Duration::from_secs(60), request_limit)
    }

    /// Length of one rate-limit window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Maximum requests dispatched per window.
    pub fn request_limit(&self) -> u32 {
        self.request_limit
    }
}
