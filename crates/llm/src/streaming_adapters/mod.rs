//! Streaming Adapters
//!
//! Per-provider SSE adapters that convert raw stream lines into unified
//! `ChatStreamEvent`s. The provider HTTP loops feed complete lines into an
//! adapter and forward the resulting events.

mod gemini;
mod openai;

pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;
