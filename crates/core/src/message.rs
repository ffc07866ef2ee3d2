//! Conversation Model
//!
//! The append-only, typed representation of a conversation: each message has
//! a role and an ordered sequence of parts (text, or a tool invocation with
//! its lifecycle state). Part ordering inside a message and message ordering
//! inside the conversation are the sole ordering authority for everything
//! derived downstream (event log, status badge).
//!
//! A `Part::Tool` is the one entity mutated in place: its state advances
//! through the tool-call state machine as input streams in, approval is
//! requested/resolved, and output or an error lands. All mutations go through
//! `Conversation` methods that enforce the legal transitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Lifecycle state of a tool invocation.
///
/// Forms a small state machine:
///
/// ```text
/// input-streaming -> input-available -> output-available | output-error
///                         |
///                         v
///              approval-requested -> approval-responded -> output-available | output-error
/// ```
///
/// `output-available` and `output-error` are terminal; no transition leaves
/// them. Re-entering `approval-requested` for the same invocation is
/// forbidden (protects against duplicate approval prompts on re-render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    InputStreaming,
    InputAvailable,
    ApprovalRequested,
    ApprovalResponded,
    OutputAvailable,
    OutputError,
}

impl ToolState {
    /// Whether this state is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, ToolState::OutputAvailable | ToolState::OutputError)
    }

    /// Whether the transition `self -> next` is legal.
    pub fn can_transition_to(self, next: ToolState) -> bool {
        use ToolState::*;
        matches!(
            (self, next),
            (InputStreaming, InputAvailable)
                | (InputAvailable, OutputAvailable)
                | (InputAvailable, OutputError)
                | (InputAvailable, ApprovalRequested)
                | (ApprovalRequested, ApprovalResponded)
                | (ApprovalResponded, OutputAvailable)
                | (ApprovalResponded, OutputError)
        )
    }

    /// Wire-format name of this state (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            ToolState::InputStreaming => "input-streaming",
            ToolState::InputAvailable => "input-available",
            ToolState::ApprovalRequested => "approval-requested",
            ToolState::ApprovalResponded => "approval-responded",
            ToolState::OutputAvailable => "output-available",
            ToolState::OutputError => "output-error",
        }
    }
}

impl std::fmt::Display for ToolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A human approval attached to a tool invocation.
///
/// `approved` is absent while the request is pending. Resolving is terminal:
/// a resolved approval is never written again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    /// Unique per approval request, stable across client/server round trips
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    /// Human-supplied justification (expected when denied, not enforced)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Approval {
    /// Create a pending approval request.
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            approved: None,
            reason: None,
        }
    }

    /// Whether this approval has been resolved (approved or denied).
    pub fn is_resolved(&self) -> bool {
        self.approved.is_some()
    }
}

/// An atomic unit of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// Plain text content
    Text { text: String },
    /// A tool invocation and, as the lifecycle advances, its result
    Tool {
        /// Unique id of this invocation (minted by the orchestrator)
        id: String,
        tool_name: String,
        state: ToolState,
        #[serde(skip_serializing_if = "Option::is_none")]
        input: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        approval: Option<Approval>,
    },
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Create a tool part with fully parsed input, in `input-available`.
    ///
    /// Tool parts enter the conversation only once their input is complete;
    /// a partially parsed argument string never becomes a part.
    pub fn tool(id: impl Into<String>, tool_name: impl Into<String>, input: Value) -> Self {
        Part::Tool {
            id: id.into(),
            tool_name: tool_name.into(),
            state: ToolState::InputAvailable,
            input: Some(input),
            output: None,
            error_text: None,
            approval: None,
        }
    }
}

/// A message in the conversation: a role plus an ordered sequence of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a message with a single text part.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// Create an assistant message with no parts yet (streaming target).
    pub fn assistant_empty() -> Self {
        Self {
            role: Role::Assistant,
            parts: Vec::new(),
        }
    }
}

/// Ordered, append-only conversation buffer.
///
/// Single-writer: one orchestration run (or one UI event queue) owns a
/// conversation at a time, so no interior locking is needed here. The only
/// cross-turn mutation is approval resolution, which is resolve-once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with an existing history.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Discard the whole history (session reset).
    pub fn reset(&mut self) {
        self.messages.clear();
    }

    /// The last message, if it is an assistant message; otherwise a fresh
    /// empty assistant message is appended and returned.
    fn last_assistant_mut(&mut self) -> &mut Message {
        let needs_new = !matches!(
            self.messages.last(),
            Some(Message {
                role: Role::Assistant,
                ..
            })
        );
        if needs_new {
            self.messages.push(Message::assistant_empty());
        }
        self.messages.last_mut().expect("just pushed")
    }

    /// Append streamed text to the last assistant message, extending its
    /// trailing text part when there is one.
    pub fn append_text_delta(&mut self, delta: &str) {
        let message = self.last_assistant_mut();
        if let Some(Part::Text { text }) = message.parts.last_mut() {
            text.push_str(delta);
        } else {
            message.parts.push(Part::text(delta));
        }
    }

    /// Append a part to the last assistant message.
    pub fn push_assistant_part(&mut self, part: Part) {
        self.last_assistant_mut().parts.push(part);
    }

    fn tool_part_mut(&mut self, tool_id: &str) -> Option<&mut Part> {
        self.messages
            .iter_mut()
            .rev()
            .flat_map(|m| m.parts.iter_mut())
            .find(|p| matches!(p, Part::Tool { id, .. } if id == tool_id))
    }

    /// Advance a tool part's state, enforcing the state machine.
    pub fn advance_tool_state(&mut self, tool_id: &str, next: ToolState) -> CoreResult<()> {
        match self.tool_part_mut(tool_id) {
            Some(Part::Tool { state, .. }) => {
                if !state.can_transition_to(next) {
                    return Err(CoreError::illegal_transition(format!(
                        "tool {}: {} -> {}",
                        tool_id, state, next
                    )));
                }
                *state = next;
                Ok(())
            }
            _ => Err(CoreError::not_found(format!("tool part {}", tool_id))),
        }
    }

    /// Record a successful tool result, moving the part to `output-available`.
    pub fn set_tool_output(&mut self, tool_id: &str, value: Value) -> CoreResult<()> {
        self.advance_tool_state(tool_id, ToolState::OutputAvailable)?;
        if let Some(Part::Tool { output, .. }) = self.tool_part_mut(tool_id) {
            *output = Some(value);
        }
        Ok(())
    }

    /// Record a tool failure, moving the part to `output-error`.
    pub fn set_tool_error(&mut self, tool_id: &str, message: impl Into<String>) -> CoreResult<()> {
        self.advance_tool_state(tool_id, ToolState::OutputError)?;
        if let Some(Part::Tool { error_text, .. }) = self.tool_part_mut(tool_id) {
            *error_text = Some(message.into());
        }
        Ok(())
    }

    /// Attach a pending approval request to a tool part and move it to
    /// `approval-requested`. A part that already carries an approval cannot
    /// request another one.
    pub fn request_approval(&mut self, tool_id: &str, approval_id: &str) -> CoreResult<()> {
        match self.tool_part_mut(tool_id) {
            Some(Part::Tool { approval, .. }) if approval.is_some() => {
                Err(CoreError::illegal_transition(format!(
                    "tool {}: approval already requested",
                    tool_id
                )))
            }
            Some(Part::Tool { .. }) => {
                self.advance_tool_state(tool_id, ToolState::ApprovalRequested)?;
                if let Some(Part::Tool { approval, .. }) = self.tool_part_mut(tool_id) {
                    *approval = Some(Approval::pending(approval_id));
                }
                Ok(())
            }
            _ => Err(CoreError::not_found(format!("tool part {}", tool_id))),
        }
    }

    /// Resolve an open approval by id, writing the decision onto the
    /// matching tool part and moving it to `approval-responded`.
    ///
    /// Resolving an id that is unknown, or already resolved, returns
    /// `ApprovalNotFound`. Callers log and ignore it: arrival order between
    /// the stream and the user's action is not guaranteed.
    pub fn resolve_approval(
        &mut self,
        approval_id: &str,
        approved: bool,
        reason: Option<String>,
    ) -> CoreResult<()> {
        let tool_id = self
            .messages
            .iter()
            .flat_map(|m| m.parts.iter())
            .find_map(|p| match p {
                Part::Tool {
                    id,
                    state: ToolState::ApprovalRequested,
                    approval: Some(a),
                    ..
                } if a.id == approval_id && !a.is_resolved() => Some(id.clone()),
                _ => None,
            })
            .ok_or_else(|| CoreError::approval_not_found(approval_id))?;

        self.advance_tool_state(&tool_id, ToolState::ApprovalResponded)?;
        if let Some(Part::Tool {
            approval: Some(a), ..
        }) = self.tool_part_mut(&tool_id)
        {
            a.approved = Some(approved);
            a.reason = reason;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_state_serde_names() {
        let json = serde_json::to_string(&ToolState::ApprovalRequested).unwrap();
        assert_eq!(json, "\"approval-requested\"");
        let state: ToolState = serde_json::from_str("\"output-available\"").unwrap();
        assert_eq!(state, ToolState::OutputAvailable);
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        use ToolState::*;
        for terminal in [OutputAvailable, OutputError] {
            for next in [
                InputStreaming,
                InputAvailable,
                ApprovalRequested,
                ApprovalResponded,
                OutputAvailable,
                OutputError,
            ] {
                assert!(
                    !terminal.can_transition_to(next),
                    "{} -> {} must be illegal",
                    terminal,
                    next
                );
            }
        }
    }

    #[test]
    fn test_legal_transition_chain() {
        use ToolState::*;
        assert!(InputStreaming.can_transition_to(InputAvailable));
        assert!(InputAvailable.can_transition_to(ApprovalRequested));
        assert!(ApprovalRequested.can_transition_to(ApprovalResponded));
        assert!(ApprovalResponded.can_transition_to(OutputAvailable));
        assert!(ApprovalResponded.can_transition_to(OutputError));
        assert!(InputAvailable.can_transition_to(OutputError));
        // skipping approval-responded is illegal
        assert!(!ApprovalRequested.can_transition_to(OutputAvailable));
    }

    #[test]
    fn test_append_text_delta_extends_trailing_part() {
        let mut conv = Conversation::new();
        conv.push(Message::user("hi"));
        conv.append_text_delta("Investigating");
        conv.append_text_delta(" the spike");

        let last = conv.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.parts.len(), 1);
        assert_eq!(
            last.parts[0],
            Part::text("Investigating the spike".to_string())
        );
    }

    #[test]
    fn test_text_delta_after_tool_part_starts_new_part() {
        let mut conv = Conversation::new();
        conv.push_assistant_part(Part::tool("t1", "listFiles", json!({})));
        conv.append_text_delta("Done.");

        let last = conv.messages().last().unwrap();
        assert_eq!(last.parts.len(), 2);
    }

    #[test]
    fn test_tool_output_lifecycle() {
        let mut conv = Conversation::new();
        conv.push_assistant_part(Part::tool("t1", "readFile", json!({"filePath": "/docs/x.md"})));
        conv.set_tool_output("t1", json!({"fileContent": "# X"})).unwrap();

        // terminal: any further mutation is rejected
        let err = conv.set_tool_error("t1", "boom").unwrap_err();
        assert!(matches!(err, CoreError::IllegalTransition(_)));
    }

    #[test]
    fn test_approval_resolve_once() {
        let mut conv = Conversation::new();
        conv.push_assistant_part(Part::tool("t1", "sendF5RedirectEmail", json!({})));
        conv.request_approval("t1", "appr-1").unwrap();

        conv.resolve_approval("appr-1", true, None).unwrap();

        // second resolve attempt must fail and leave the first intact
        let err = conv.resolve_approval("appr-1", false, Some("nope".into()));
        assert!(matches!(err, Err(CoreError::ApprovalNotFound(_))));

        match conv.messages().last().unwrap().parts.last().unwrap() {
            Part::Tool {
                approval: Some(a), ..
            } => {
                assert_eq!(a.approved, Some(true));
                assert_eq!(a.reason, None);
            }
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_approval_request_forbidden() {
        let mut conv = Conversation::new();
        conv.push_assistant_part(Part::tool("t1", "sendF5RedirectEmail", json!({})));
        conv.request_approval("t1", "appr-1").unwrap();
        let err = conv.request_approval("t1", "appr-2").unwrap_err();
        assert!(matches!(err, CoreError::IllegalTransition(_)));
    }

    #[test]
    fn test_resolve_unknown_approval() {
        let mut conv = Conversation::new();
        let err = conv.resolve_approval("missing", true, None);
        assert!(matches!(err, Err(CoreError::ApprovalNotFound(_))));
    }

    #[test]
    fn test_denied_approval_records_reason() {
        let mut conv = Conversation::new();
        conv.push_assistant_part(Part::tool("t1", "sendF5RedirectEmail", json!({})));
        conv.request_approval("t1", "appr-1").unwrap();
        conv.resolve_approval("appr-1", false, Some("Denied by on-call".into()))
            .unwrap();
        conv.set_tool_error("t1", "denied by operator: Denied by on-call")
            .unwrap();

        match conv.messages().last().unwrap().parts.last().unwrap() {
            Part::Tool {
                state, error_text, ..
            } => {
                assert_eq!(*state, ToolState::OutputError);
                assert!(error_text.as_deref().unwrap().contains("Denied by on-call"));
            }
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[test]
    fn test_part_serialization_shape() {
        let part = Part::tool("t1", "listFiles", json!({}));
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("\"type\":\"tool\""));
        assert!(json.contains("\"state\":\"input-available\""));
        assert!(!json.contains("error_text"));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut conv = Conversation::new();
        conv.push(Message::user("hello"));
        assert!(!conv.is_empty());
        conv.reset();
        assert!(conv.is_empty());
    }
}
