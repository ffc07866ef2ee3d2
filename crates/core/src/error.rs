//! Core Error Types
//!
//! Defines the foundational error taxonomy used across the Oncall Desk
//! workspace. These error types are dependency-free (only thiserror + std)
//! to keep the core crate lightweight.
//!
//! The split matters at the transport boundary: `ClientInput` maps to a
//! 4xx-equivalent status, `Configuration` to a 5xx-equivalent that requires
//! operator intervention, and `ToolExecution` stays inline on the tool part
//! that produced it without aborting the run.

use thiserror::Error;

/// Core error type for the Oncall Desk workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed request from the caller (missing messages, unknown provider)
    #[error("Invalid request: {0}")]
    ClientInput(String),

    /// Deployment misconfiguration (missing credentials)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A tool ran and failed; captured per part, never fatal to the loop
    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    /// An approval response referenced no open approval request.
    /// Logged and ignored: arrival order between the stream and the user's
    /// action is not guaranteed.
    #[error("Approval not found: {0}")]
    ApprovalNotFound(String),

    /// A tool part was asked to leave a terminal state or re-enter approval
    #[error("Illegal tool state transition: {0}")]
    IllegalTransition(String),

    /// Not found errors (unknown tool, unknown documentation path)
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a client input error
    pub fn client_input(msg: impl Into<String>) -> Self {
        Self::ClientInput(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a tool execution error
    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create an approval-not-found error
    pub fn approval_not_found(id: impl Into<String>) -> Self {
        Self::ApprovalNotFound(id.into())
    }

    /// Create an illegal transition error
    pub fn illegal_transition(msg: impl Into<String>) -> Self {
        Self::IllegalTransition(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::client_input("messages array is required");
        assert_eq!(err.to_string(), "Invalid request: messages array is required");
    }

    #[test]
    fn test_configuration_error() {
        let err = CoreError::configuration("OPENAI_API_KEY is not set");
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_approval_not_found() {
        let err = CoreError::approval_not_found("appr-1");
        assert_eq!(err.to_string(), "Approval not found: appr-1");
    }

    #[test]
    fn test_error_conversion() {
        let err = CoreError::tool_execution("readFile blew up");
        let msg: String = err.into();
        assert!(msg.contains("Tool execution failed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
    }
}
