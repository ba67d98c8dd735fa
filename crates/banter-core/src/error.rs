//! Error types for the banter application.

use thiserror::Error;

/// A shared error type for the banter crates.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. All variants are expected,
/// recoverable conditions surfaced to the caller as values.
#[derive(Error, Debug, Clone)]
pub enum BanterError {
    /// Persona key not present in the registry. State is never mutated when
    /// this is returned.
    #[error("Unknown persona '{key}'. Valid personas: {}", .available.join(", "))]
    UnknownPersona {
        key: String,
        available: Vec<String>,
    },

    /// Completion provider failure (network error, non-2xx status, or an
    /// unusable payload).
    #[error("Completion API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        timed_out: bool,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Content does not match an expected serialized shape
    #[error("Format error: {message}")]
    Format { message: String },

    /// Configuration error (missing credential, invalid persona file)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BanterError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an UnknownPersona error listing the valid keys.
    pub fn unknown_persona(key: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownPersona {
            key: key.into(),
            available,
        }
    }

    /// Creates an Api error without an HTTP status.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status_code: None,
            timed_out: false,
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an UnknownPersona error
    pub fn is_unknown_persona(&self) -> bool {
        matches!(self, Self::UnknownPersona { .. })
    }

    /// Check if this is an Api error
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a Format error
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    /// Check if this is an Api error caused by a request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Api { timed_out: true, .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for BanterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for BanterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format {
            message: format!("JSON: {err}"),
        }
    }
}

impl From<toml::de::Error> for BanterError {
    fn from(err: toml::de::Error) -> Self {
        Self::Format {
            message: format!("TOML: {err}"),
        }
    }
}

impl From<reqwest::Error> for BanterError {
    fn from(err: reqwest::Error) -> Self {
        Self::Api {
            message: err.to_string(),
            status_code: err.status().map(|s| s.as_u16()),
            timed_out: err.is_timeout(),
        }
    }
}

/// A type alias for `Result<T, BanterError>`.
pub type Result<T> = std::result::Result<T, BanterError>;
