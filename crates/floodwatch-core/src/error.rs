//! Error types for the floodwatch client

use std::{error::Error as StdError, fmt};

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the floodwatch client
#[derive(Debug)]
pub enum Error {
    /// HTTP transport error (request never produced a usable response)
    Http {
        /// Error message
        message: String,
    },

    /// Backend returned a non-success status code
    Api {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Response body could not be decoded
    Decode {
        /// Error message
        message: String,
    },

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Session persistence error
    Session {
        /// Error message
        message: String,
    },

    /// Resource not found
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// Service already running
    ServiceAlreadyRunning,

    /// I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(serde_json::Error),
}

impl Error {
    /// Create a new HTTP transport error
    #[must_use]
    pub fn http<S: Into<String>>(message: S) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// Create a new API error from a status code
    #[must_use]
    pub fn api<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a new decode error
    #[must_use]
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new session error
    #[must_use]
    pub fn session<S: Into<String>>(message: S) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { message } => write!(f, "HTTP error: {message}"),
            Self::Api { status, message } => write!(f, "API error ({status}): {message}"),
            Self::Decode { message } => write!(f, "Decode error: {message}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Session { message } => write!(f, "Session error: {message}"),
            Self::NotFound { resource } => write!(f, "Resource not found: {resource}"),
            Self::ServiceAlreadyRunning => write!(f, "Monitor service is already running"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}
