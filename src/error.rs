//! Error types for hydrafit.

use std::time::Duration;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("No channel registered under {name}")]
    UnknownChannel { name: String },
}

/// Failures from the weather and food lookup services.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("City not found: {city}")]
    CityNotFound { city: String },

    #[error("Product not found: {query}")]
    ProductNotFound { query: String },

    #[error("{service} is not configured: {reason}")]
    NotConfigured { service: String, reason: String },

    #[error("{service} request failed: {reason}")]
    RequestFailed { service: String, reason: String },

    #[error("{service} timed out after {timeout:?}")]
    Timeout { service: String, timeout: Duration },

    #[error("Invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },
}

/// Errors raised by ledger operations and dialogue transitions.
///
/// Every variant is recoverable: the dispatcher turns it into a reply and the
/// user's state is left as it was before the failing event.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("No profile for user {user_id}")]
    NoProfile { user_id: String },

    #[error("Expected {expected}, got {input:?}")]
    MalformedInput { expected: String, input: String },

    #[error("Unknown activity type: {name}")]
    UnknownActivity { name: String },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl TrackerError {
    pub fn malformed(expected: impl Into<String>, input: impl Into<String>) -> Self {
        Self::MalformedInput {
            expected: expected.into(),
            input: input.into(),
        }
    }

    /// Text shown to the user when this error ends a command.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoProfile { .. } => "Set up your profile first with /set_profile".to_string(),
            Self::MalformedInput { expected, .. } => format!("Please enter {expected}."),
            Self::UnknownActivity { name } => format!(
                "Unknown workout \"{name}\". Known workouts: {}",
                crate::tracker::workout::WorkoutKind::known_names().join(", ")
            ),
            Self::Lookup(LookupError::CityNotFound { city }) => {
                format!("City \"{city}\" not found. Run /set_profile again with another city.")
            }
            Self::Lookup(LookupError::ProductNotFound { query }) => {
                format!("Product \"{query}\" not found.")
            }
            Self::Lookup(other) => {
                format!("Lookup service is unavailable right now ({other}). Try again later.")
            }
        }
    }
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
