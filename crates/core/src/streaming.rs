//! Unified Stream Event Types
//!
//! Provider-agnostic event types and adapter trait for processing real-time
//! LLM responses. These types are shared by the LLM crate (provider
//! implementations) and the application crate (orchestrator, transport).
//!
//! Events mirror the tool-call lifecycle: provider adapters emit the input
//! side (`ToolInputStart`/`ToolInputAvailable`), the orchestrator emits the
//! approval and output side after dispatching the tool.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unified streaming event that all provider adapters convert to.
/// The caller observes one consistent stream regardless of provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatStreamEvent {
    /// Text content delta from the model
    TextDelta { content: String },

    /// The model started a tool call; arguments are still streaming
    ToolInputStart {
        tool_id: String,
        tool_name: String,
    },

    /// Tool call arguments are complete and parsed
    ToolInputAvailable {
        tool_id: String,
        tool_name: String,
        input: Value,
    },

    /// A tool in the approval-gated set is suspended pending a human decision
    ApprovalRequested {
        tool_id: String,
        tool_name: String,
        approval_id: String,
        input: Value,
    },

    /// A human resolved an approval request
    ApprovalResponded {
        approval_id: String,
        approved: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Tool executed successfully
    ToolOutputAvailable { tool_id: String, output: Value },

    /// Tool execution failed (or was denied); the run continues
    ToolOutputError { tool_id: String, error_text: String },

    /// Token usage information
    Usage {
        input_tokens: u32,
        output_tokens: u32,
    },

    /// Error during streaming
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },

    /// Stream complete
    Complete {
        #[serde(skip_serializing_if = "Option::is_none")]
        stop_reason: Option<String>,
    },
}

/// Errors that can occur during stream adaptation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AdapterError {
    /// Invalid format that couldn't be parsed
    InvalidFormat(String),
    /// JSON/data parsing error
    ParseError(String),
    /// Event type not supported by this adapter
    UnsupportedEvent(String),
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            AdapterError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AdapterError::UnsupportedEvent(msg) => write!(f, "Unsupported event: {}", msg),
        }
    }
}

impl std::error::Error for AdapterError {}

/// Trait for adapting provider-specific stream formats to unified events.
///
/// Both provider adapters (OpenAI Chat Completions, Gemini) implement this
/// trait so the HTTP streaming loop stays provider-neutral.
pub trait StreamAdapter: Send + Sync {
    /// Returns the provider name for logging and identification.
    fn provider_name(&self) -> &'static str;

    /// Adapt a raw stream line/chunk to unified events.
    ///
    /// A single input line may produce zero, one, or multiple events.
    fn adapt(&mut self, input: &str) -> Result<Vec<ChatStreamEvent>, AdapterError>;

    /// Reset adapter state for a new stream.
    fn reset(&mut self) {
        // Default implementation does nothing
    }
}
