//! Oncall Desk LLM
//!
//! Provider abstraction for streaming chat completions:
//!
//! - `types` - Wire-level message/tool/response/error types
//! - `provider` - The `LlmProvider` trait and shared HTTP error mapping
//! - `openai` - OpenAI Chat Completions provider
//! - `google` - Google Gemini provider
//! - `streaming_adapters` - SSE to unified-event adapters per provider
//! - `http_client` - reqwest client factory

pub mod http_client;
pub mod google;
pub mod openai;
pub mod provider;
pub mod streaming_adapters;
pub mod types;

pub use google::GoogleProvider;
pub use openai::OpenAiProvider;
pub use provider::{missing_api_key_error, parse_http_error, LlmProvider};
pub use types::{
    LlmError, LlmResponse, LlmResult, Message, MessageContent, MessageRole, ProviderConfig,
    ProviderType, StopReason, ToolCall, ToolDefinition, UsageStats,
};
