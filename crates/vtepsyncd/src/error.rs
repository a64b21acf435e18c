//! Error types for vtepsyncd.
//!
//! Errors fall into three groups: text that cannot be interpreted
//! ([`VtepsyncError::Parse`]), failures talking to the switch
//! ([`GatewayError`]), and bad operator input rejected before any network
//! interaction ([`VtepsyncError::Validation`]).

use thiserror::Error;

/// Result type for vtepsyncd operations.
pub type Result<T> = std::result::Result<T, VtepsyncError>;

/// Failures reported by a device command gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The HTTP request could not be completed (connect, TLS, timeout).
    #[error("Transport error talking to {endpoint}: {message}")]
    Transport {
        /// Endpoint the request was sent to.
        endpoint: String,
        /// Underlying error message.
        message: String,
        /// Whether the request timed out.
        is_timeout: bool,
    },

    /// The device answered with a non-success HTTP status.
    #[error("HTTP status {status} from {endpoint}")]
    Status {
        /// Endpoint the request was sent to.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// The device rejected one of the commands.
    #[error("Command API error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the device.
        message: String,
    },

    /// The response body was not a usable command API response.
    #[error("Malformed command API response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on the next polling cycle.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport { .. } => true,
            GatewayError::Status { status, .. } => *status >= 500,
            GatewayError::Rpc { .. } | GatewayError::MalformedResponse(_) => false,
        }
    }
}

/// vtepsyncd errors
#[derive(Debug, Error)]
pub enum VtepsyncError {
    /// Device output could not be interpreted; neither snapshot can be trusted.
    #[error("Failed to parse {source_name}: {message}")]
    Parse {
        /// Which snapshot was being parsed (e.g. "running-config").
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Command gateway failure while fetching a snapshot.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Operator input rejected at startup.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VtepsyncError {
    /// Creates a parse error.
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if a failed cycle may succeed on the next poll without
    /// operator intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            VtepsyncError::Gateway(e) => e.is_retryable(),
            VtepsyncError::Parse { .. }
            | VtepsyncError::Validation { .. }
            | VtepsyncError::Config(_)
            | VtepsyncError::Io(_) => false,
        }
    }
}
