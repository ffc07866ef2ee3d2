//! Event Projection
//!
//! Pure, order-preserving derivation of a flat event log from the
//! conversation buffer. The projection is referentially transparent and
//! recomputed wholesale on every change; it never accumulates state, so it
//! survives both incremental streaming appends and a full conversation
//! replacement on session reset. Linear in the total number of parts.
//!
//! `(message_index, part_index)` is the sole ordering authority. The
//! optional `at` timestamp is opportunistically lifted out of structured
//! tool outputs for display only and never participates in ordering.

use serde::Serialize;
use serde_json::Value;

use crate::message::{Message, Part, Role};

/// A display-oriented event derived from the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Assistant commentary with non-blank text
    #[serde(rename_all = "camelCase")]
    Note {
        message_index: usize,
        part_index: usize,
        text: String,
    },
    /// A tool invocation in any lifecycle state
    #[serde(rename_all = "camelCase")]
    Tool {
        message_index: usize,
        part_index: usize,
        tool_name: String,
        state: crate::message::ToolState,
        #[serde(skip_serializing_if = "Option::is_none")]
        input: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        at: Option<String>,
    },
}

impl Event {
    /// Tool name when this is a tool event.
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Event::Tool { tool_name, .. } => Some(tool_name),
            Event::Note { .. } => None,
        }
    }
}

/// Project the conversation into a flat event log.
///
/// Text parts become notes only when assistant-authored and non-blank after
/// trimming. Tool parts become exactly one tool event each, regardless of
/// state, so in-flight and approval-gated invocations stay visible.
pub fn project_events(messages: &[Message]) -> Vec<Event> {
    let mut events = Vec::new();
    for (message_index, message) in messages.iter().enumerate() {
        for (part_index, part) in message.parts.iter().enumerate() {
            match part {
                Part::Text { text } => {
                    if message.role == Role::Assistant && !text.trim().is_empty() {
                        events.push(Event::Note {
                            message_index,
                            part_index,
                            text: text.trim().to_string(),
                        });
                    }
                }
                Part::Tool {
                    tool_name,
                    state,
                    input,
                    output,
                    error_text,
                    ..
                } => {
                    events.push(Event::Tool {
                        message_index,
                        part_index,
                        tool_name: tool_name.clone(),
                        state: *state,
                        input: input.clone(),
                        output: output.clone(),
                        error_text: error_text.clone(),
                        at: extract_at(output.as_ref()),
                    });
                }
            }
        }
    }
    events
}

/// Lift a string `at` field out of a structured tool output, when present.
fn extract_at(output: Option<&Value>) -> Option<String> {
    output?
        .get("at")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Conversation, ToolState};
    use serde_json::json;

    #[test]
    fn test_blank_assistant_text_produces_no_note() {
        let messages = vec![Message::assistant("   ")];
        assert!(project_events(&messages).is_empty());
    }

    #[test]
    fn test_user_text_produces_no_note() {
        let messages = vec![Message::user("Investigating the spike")];
        assert!(project_events(&messages).is_empty());
    }

    #[test]
    fn test_assistant_text_produces_one_note() {
        let messages = vec![Message::assistant("Investigating the spike")];
        let events = project_events(&messages);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            Event::Note {
                message_index: 0,
                part_index: 0,
                text: "Investigating the spike".to_string(),
            }
        );
    }

    #[test]
    fn test_tool_part_emitted_in_every_state() {
        let mut conv = Conversation::new();
        conv.push(Message::user("check prod"));
        conv.push_assistant_part(Part::tool("t1", "getDynatraceSnapshot", json!({})));
        conv.request_approval("t1", "appr-1").ok();

        // approval-requested is not terminal, but the event is still emitted
        let events = project_events(conv.messages());
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Tool { state, .. } => assert_eq!(*state, ToolState::ApprovalRequested),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_order_follows_message_and_part_indices() {
        let mut conv = Conversation::new();
        conv.push(Message::user("go"));
        conv.append_text_delta("Checking telemetry.");
        conv.push_assistant_part(Part::tool("t1", "getDynatraceSnapshot", json!({})));
        conv.push(Message::user("and?"));
        conv.append_text_delta("All clear.");

        let events = project_events(conv.messages());
        let keys: Vec<(usize, usize)> = events
            .iter()
            .map(|e| match e {
                Event::Note {
                    message_index,
                    part_index,
                    ..
                }
                | Event::Tool {
                    message_index,
                    part_index,
                    ..
                } => (*message_index, *part_index),
            })
            .collect();
        assert_eq!(keys, vec![(1, 0), (1, 1), (3, 0)]);
    }

    #[test]
    fn test_at_extracted_from_structured_output() {
        let mut conv = Conversation::new();
        conv.push_assistant_part(Part::tool("t1", "getDynatraceSnapshot", json!({})));
        conv.set_tool_output("t1", json!({"phase": "monitoring", "at": "2026-02-10T09:15:00Z"}))
            .unwrap();

        let events = project_events(conv.messages());
        match &events[0] {
            Event::Tool { at, .. } => assert_eq!(at.as_deref(), Some("2026-02-10T09:15:00Z")),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_at_ignored_when_not_a_string() {
        let mut conv = Conversation::new();
        conv.push_assistant_part(Part::tool("t1", "getDynatraceSnapshot", json!({})));
        conv.set_tool_output("t1", json!({"at": 1739178900})).unwrap();

        let events = project_events(conv.messages());
        match &events[0] {
            Event::Tool { at, .. } => assert!(at.is_none()),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_projection_is_pure() {
        let messages = vec![
            Message::user("hello"),
            Message::assistant("Checking the docs."),
        ];
        assert_eq!(project_events(&messages), project_events(&messages));
    }
}
