//! Google Gemini SSE Stream Adapter
//!
//! Handles the `streamGenerateContent?alt=sse` format. Unlike the Chat
//! Completions stream, Gemini delivers function calls whole (arguments fully
//! parsed in a single chunk) and does not assign call ids, so this adapter
//! mints sequential ids for correlation with tool results.

use oncall_desk_core::streaming::{AdapterError, ChatStreamEvent, StreamAdapter};
use serde::Deserialize;
use serde_json::Value;

/// Internal event types from the Gemini SSE format
#[derive(Debug, Deserialize)]
struct GeminiEvent {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "functionCall")]
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount")]
    #[serde(default)]
    candidates_token_count: u32,
}

/// Adapter for the Gemini SSE format
pub struct GeminiAdapter {
    /// Counter for minted function-call ids within one stream
    call_counter: usize,
    /// Whether the current response contained any function call
    saw_function_call: bool,
}

impl GeminiAdapter {
    pub fn new() -> Self {
        Self {
            call_counter: 0,
            saw_function_call: false,
        }
    }

    fn next_call_id(&mut self) -> String {
        self.call_counter += 1;
        format!("gemini-call-{}", self.call_counter)
    }
}

impl Default for GeminiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAdapter for GeminiAdapter {
    fn provider_name(&self) -> &'static str {
        "google"
    }

    fn adapt(&mut self, input: &str) -> Result<Vec<ChatStreamEvent>, AdapterError> {
        let trimmed = input.trim();

        let json_str = if let Some(rest) = trimmed.strip_prefix("data: ") {
            rest
        } else if trimmed.is_empty() {
            return Ok(vec![]);
        } else {
            trimmed
        };

        if json_str.is_empty() {
            return Ok(vec![]);
        }

        let event: GeminiEvent =
            serde_json::from_str(json_str).map_err(|e| AdapterError::ParseError(e.to_string()))?;

        let mut events = vec![];

        if let Some(usage) = event.usage_metadata {
            events.push(ChatStreamEvent::Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            });
        }

        for candidate in event.candidates {
            if let Some(content) = candidate.content {
                for part in content.parts {
                    if let Some(text) = part.text {
                        if !text.is_empty() {
                            events.push(ChatStreamEvent::TextDelta { content: text });
                        }
                    }
                    if let Some(call) = part.function_call {
                        self.saw_function_call = true;
                        let tool_id = self.next_call_id();
                        events.push(ChatStreamEvent::ToolInputStart {
                            tool_id: tool_id.clone(),
                            tool_name: call.name.clone(),
                        });
                        events.push(ChatStreamEvent::ToolInputAvailable {
                            tool_id,
                            tool_name: call.name,
                            input: call.args,
                        });
                    }
                }
            }

            if let Some(finish_reason) = candidate.finish_reason {
                // Gemini reports STOP even for tool-call turns; the stop
                // reason is normalized so the caller sees tool_calls when a
                // function call occurred.
                let reason = if self.saw_function_call {
                    "tool_calls".to_string()
                } else {
                    finish_reason.to_lowercase()
                };
                events.push(ChatStreamEvent::Complete {
                    stop_reason: Some(reason),
                });
            }
        }

        Ok(events)
    }

    fn reset(&mut self) {
        self.call_counter = 0;
        self.saw_function_call = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_delta() {
        let mut adapter = GeminiAdapter::new();
        let events = adapter
            .adapt(r#"data: {"candidates": [{"content": {"parts": [{"text": "Hi there"}]}}]}"#)
            .unwrap();
        assert_eq!(
            events,
            vec![ChatStreamEvent::TextDelta {
                content: "Hi there".to_string()
            }]
        );
    }

    #[test]
    fn test_function_call_arrives_whole() {
        let mut adapter = GeminiAdapter::new();
        let events = adapter
            .adapt(r#"data: {"candidates": [{"content": {"parts": [{"functionCall": {"name": "readFile", "args": {"filePath": "/docs/faq.md"}}}]}}]}"#)
            .unwrap();

        assert_eq!(events.len(), 2);
        match &events[0] {
            ChatStreamEvent::ToolInputStart { tool_id, tool_name } => {
                assert_eq!(tool_id, "gemini-call-1");
                assert_eq!(tool_name, "readFile");
            }
            _ => panic!("Expected ToolInputStart"),
        }
        match &events[1] {
            ChatStreamEvent::ToolInputAvailable { input, .. } => {
                assert_eq!(input["filePath"], "/docs/faq.md");
            }
            _ => panic!("Expected ToolInputAvailable"),
        }
    }

    #[test]
    fn test_stop_normalized_to_tool_calls_after_function_call() {
        let mut adapter = GeminiAdapter::new();
        adapter
            .adapt(r#"data: {"candidates": [{"content": {"parts": [{"functionCall": {"name": "listFiles", "args": {}}}]}}]}"#)
            .unwrap();
        let events = adapter
            .adapt(r#"data: {"candidates": [{"finishReason": "STOP"}]}"#)
            .unwrap();
        assert_eq!(
            events,
            vec![ChatStreamEvent::Complete {
                stop_reason: Some("tool_calls".to_string())
            }]
        );
    }

    #[test]
    fn test_plain_stop() {
        let mut adapter = GeminiAdapter::new();
        let events = adapter
            .adapt(r#"data: {"candidates": [{"finishReason": "STOP"}]}"#)
            .unwrap();
        assert_eq!(
            events,
            vec![ChatStreamEvent::Complete {
                stop_reason: Some("stop".to_string())
            }]
        );
    }

    #[test]
    fn test_usage_metadata() {
        let mut adapter = GeminiAdapter::new();
        let events = adapter
            .adapt(r#"data: {"candidates": [], "usageMetadata": {"promptTokenCount": 8, "candidatesTokenCount": 21}}"#)
            .unwrap();
        assert_eq!(
            events,
            vec![ChatStreamEvent::Usage {
                input_tokens: 8,
                output_tokens: 21
            }]
        );
    }

    #[test]
    fn test_reset_clears_call_counter() {
        let mut adapter = GeminiAdapter::new();
        adapter
            .adapt(r#"data: {"candidates": [{"content": {"parts": [{"functionCall": {"name": "listFiles", "args": {}}}]}}]}"#)
            .unwrap();
        adapter.reset();
        let events = adapter
            .adapt(r#"data: {"candidates": [{"content": {"parts": [{"functionCall": {"name": "listFiles", "args": {}}}]}}]}"#)
            .unwrap();
        match &events[0] {
            ChatStreamEvent::ToolInputStart { tool_id, .. } => {
                assert_eq!(tool_id, "gemini-call-1");
            }
            _ => panic!("Expected ToolInputStart"),
        }
    }
}
