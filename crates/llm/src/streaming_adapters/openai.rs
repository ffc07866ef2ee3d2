//! OpenAI Chat Completions SSE Stream Adapter
//!
//! Handles the Chat Completions streaming format: `data: {...}` lines with
//! delta chunks. Tool call arguments stream as string fragments across
//! chunks and are accumulated here until a finish signal flushes them as a
//! parsed `ToolInputAvailable` event.

use oncall_desk_core::streaming::{AdapterError, ChatStreamEvent, StreamAdapter};
use serde::Deserialize;
use serde_json::Value;

/// Internal event types from the Chat Completions SSE format
#[derive(Debug, Deserialize)]
struct OpenAiEvent {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Adapter for the OpenAI Chat Completions SSE format
pub struct OpenAiAdapter {
    /// Tool call being accumulated across chunks
    tool_id: Option<String>,
    tool_name: Option<String>,
    tool_args_buffer: String,
}

impl OpenAiAdapter {
    pub fn new() -> Self {
        Self {
            tool_id: None,
            tool_name: None,
            tool_args_buffer: String::new(),
        }
    }

    /// Flush any pending tool call, emitting a ToolInputAvailable event
    /// with fully parsed arguments.
    fn flush_pending_tool(&mut self) -> Option<ChatStreamEvent> {
        if let (Some(id), Some(name)) = (self.tool_id.take(), self.tool_name.take()) {
            let args = std::mem::take(&mut self.tool_args_buffer);
            let input = if args.trim().is_empty() {
                Value::Object(Default::default())
            } else {
                serde_json::from_str(&args).unwrap_or(Value::Null)
            };
            Some(ChatStreamEvent::ToolInputAvailable {
                tool_id: id,
                tool_name: name,
                input,
            })
        } else {
            None
        }
    }
}

impl Default for OpenAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAdapter for OpenAiAdapter {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn adapt(&mut self, input: &str) -> Result<Vec<ChatStreamEvent>, AdapterError> {
        let trimmed = input.trim();

        // Handle SSE format: "data: {...}"
        let json_str = if let Some(rest) = trimmed.strip_prefix("data: ") {
            rest
        } else if trimmed.is_empty() {
            return Ok(vec![]);
        } else {
            trimmed
        };

        if json_str.is_empty() || json_str == "[DONE]" {
            // End of stream - flush any pending tool call
            return Ok(self.flush_pending_tool().into_iter().collect());
        }

        let event: OpenAiEvent =
            serde_json::from_str(json_str).map_err(|e| AdapterError::ParseError(e.to_string()))?;

        let mut events = vec![];

        // Usage arrives in a trailing chunk when stream_options requests it
        if let Some(usage) = event.usage {
            events.push(ChatStreamEvent::Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            });
        }

        for choice in event.choices {
            if let Some(finish_reason) = choice.finish_reason {
                // Flush any pending tool call before completing
                if let Some(tool_event) = self.flush_pending_tool() {
                    events.push(tool_event);
                }
                events.push(ChatStreamEvent::Complete {
                    stop_reason: Some(finish_reason),
                });
                continue;
            }

            if let Some(delta) = choice.delta {
                if let Some(content) = delta.content {
                    if !content.is_empty() {
                        events.push(ChatStreamEvent::TextDelta { content });
                    }
                }

                if let Some(tool_calls) = delta.tool_calls {
                    for tc in tool_calls {
                        // A new id starts a new tool call; continuation
                        // chunks carry no id (or an empty one) and only
                        // append to the argument buffer.
                        if let Some(id) = tc.id.as_deref() {
                            if !id.is_empty() && self.tool_id.as_deref() != Some(id) {
                                if let Some(tool_event) = self.flush_pending_tool() {
                                    events.push(tool_event);
                                }
                                self.tool_id = Some(id.to_string());
                                if let Some(func) = &tc.function {
                                    self.tool_name = func.name.clone().filter(|n| !n.is_empty());
                                }
                                self.tool_args_buffer.clear();

                                if let Some(name) = &self.tool_name {
                                    events.push(ChatStreamEvent::ToolInputStart {
                                        tool_id: id.to_string(),
                                        tool_name: name.clone(),
                                    });
                                }
                            }
                        }

                        if let Some(func) = tc.function {
                            if self.tool_name.is_none() {
                                if let Some(name) = func.name.as_ref().filter(|n| !n.is_empty()) {
                                    self.tool_name = Some(name.clone());
                                }
                            }
                            if let Some(args) = func.arguments {
                                self.tool_args_buffer.push_str(&args);
                            }
                        }
                    }
                }
            }
        }

        Ok(events)
    }

    fn reset(&mut self) {
        self.tool_id = None;
        self.tool_name = None;
        self.tool_args_buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_delta() {
        let mut adapter = OpenAiAdapter::new();

        let events = adapter
            .adapt(r#"data: {"choices": [{"delta": {"content": "Hello"}}]}"#)
            .unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ChatStreamEvent::TextDelta { content } => {
                assert_eq!(content, "Hello");
            }
            _ => panic!("Expected TextDelta"),
        }
    }

    #[test]
    fn test_finish_reason() {
        let mut adapter = OpenAiAdapter::new();

        let events = adapter
            .adapt(r#"data: {"choices": [{"finish_reason": "stop"}]}"#)
            .unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ChatStreamEvent::Complete { stop_reason } => {
                assert_eq!(stop_reason, &Some("stop".to_string()));
            }
            _ => panic!("Expected Complete"),
        }
    }

    #[test]
    fn test_done_signal_without_pending_tool() {
        let mut adapter = OpenAiAdapter::new();
        let events = adapter.adapt("data: [DONE]").unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_tool_call_streams_across_chunks() {
        let mut adapter = OpenAiAdapter::new();

        let events = adapter
            .adapt(r#"data: {"choices": [{"delta": {"tool_calls": [{"id": "call_abc", "function": {"name": "readFile", "arguments": "{\"file"}}]}}]}"#)
            .unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ChatStreamEvent::ToolInputStart { tool_id, tool_name } => {
                assert_eq!(tool_id, "call_abc");
                assert_eq!(tool_name, "readFile");
            }
            _ => panic!("Expected ToolInputStart"),
        }

        // Continuation chunk with no id just accumulates arguments
        let events = adapter
            .adapt(r#"data: {"choices": [{"delta": {"tool_calls": [{"function": {"arguments": "Path\": \"/docs/git-basics.md\"}"}}]}}]}"#)
            .unwrap();
        assert!(events.is_empty());

        // Finish flushes the parsed tool call before Complete
        let events = adapter
            .adapt(r#"data: {"choices": [{"finish_reason": "tool_calls"}]}"#)
            .unwrap();
        assert_eq!(events.len(), 2);
        match &events[0] {
            ChatStreamEvent::ToolInputAvailable { tool_id, tool_name, input } => {
                assert_eq!(tool_id, "call_abc");
                assert_eq!(tool_name, "readFile");
                assert_eq!(input["filePath"], "/docs/git-basics.md");
            }
            _ => panic!("Expected ToolInputAvailable, got {:?}", events[0]),
        }
        assert!(matches!(events[1], ChatStreamEvent::Complete { .. }));
    }

    #[test]
    fn test_second_id_flushes_previous_tool() {
        let mut adapter = OpenAiAdapter::new();

        adapter
            .adapt(r#"data: {"choices": [{"delta": {"tool_calls": [{"id": "call_1", "function": {"name": "listFiles", "arguments": "{}"}}]}}]}"#)
            .unwrap();
        let events = adapter
            .adapt(r#"data: {"choices": [{"delta": {"tool_calls": [{"id": "call_2", "function": {"name": "readFile", "arguments": "{\"filePath\": \"/docs/faq.md\"}"}}]}}]}"#)
            .unwrap();

        assert_eq!(events.len(), 2);
        match &events[0] {
            ChatStreamEvent::ToolInputAvailable { tool_id, .. } => assert_eq!(tool_id, "call_1"),
            _ => panic!("Expected ToolInputAvailable for first tool"),
        }
        match &events[1] {
            ChatStreamEvent::ToolInputStart { tool_id, .. } => assert_eq!(tool_id, "call_2"),
            _ => panic!("Expected ToolInputStart for second tool"),
        }
    }

    #[test]
    fn test_usage_chunk() {
        let mut adapter = OpenAiAdapter::new();
        let events = adapter
            .adapt(r#"data: {"choices": [], "usage": {"prompt_tokens": 12, "completion_tokens": 30}}"#)
            .unwrap();
        assert_eq!(
            events,
            vec![ChatStreamEvent::Usage {
                input_tokens: 12,
                output_tokens: 30
            }]
        );
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let mut adapter = OpenAiAdapter::new();
        let err = adapter.adapt("data: {not json").unwrap_err();
        assert!(matches!(err, AdapterError::ParseError(_)));
    }
}
