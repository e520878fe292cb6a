// Normalized error shape for everything that crosses the API client boundary
use std::collections::HashMap;

/// Default message when the backend rejects a request without saying why
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Single error shape surfaced to callers of the portal client and session
/// store. Raw transport errors never cross this boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum PortalError {
    /// Network or transport failure, including timeouts
    Transport(String),

    /// Backend accepted the request but rejected its content
    Rejected {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    /// Authentication rejected (401); the client has already invalidated
    /// the local session by the time this is returned
    Unauthorized(String),

    /// Tenant-scoped storage could not be read or written
    Storage(String),
}

impl PortalError {
    pub fn transport(message: impl Into<String>) -> Self {
        PortalError::Transport(message.into())
    }

    pub fn rejected(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, Vec<String>>>,
    ) -> Self {
        PortalError::Rejected {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        PortalError::Unauthorized(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        PortalError::Storage(message.into())
    }

    /// Human-readable message for display in UI surfaces
    pub fn message(&self) -> &str {
        match self {
            PortalError::Transport(msg) => msg,
            PortalError::Rejected { message, .. } => message,
            PortalError::Unauthorized(msg) => msg,
            PortalError::Storage(msg) => msg,
        }
    }

    /// Per-field validation errors from the backend envelope, when present
    pub fn field_errors(&self) -> Option<&HashMap<String, Vec<String>>> {
        match self {
            PortalError::Rejected { field_errors, .. } => field_errors.as_ref(),
            _ => None,
        }
    }

    /// Stable code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            PortalError::Transport(_) => "TRANSPORT",
            PortalError::Rejected { .. } => "REJECTED",
            PortalError::Unauthorized(_) => "UNAUTHORIZED",
            PortalError::Storage(_) => "STORAGE",
        }
    }
}

impl std::fmt::Display for PortalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PortalError {}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return PortalError::transport("The request timed out. Please try again.");
        }
        if err.is_connect() {
            return PortalError::transport("Unable to reach the service. Please check your connection.");
        }
        if err.is_decode() {
            return PortalError::transport("Received an invalid response from the service.");
        }
        tracing::debug!("Unclassified transport error: {}", err);
        PortalError::transport(DEFAULT_ERROR_MESSAGE)
    }
}
