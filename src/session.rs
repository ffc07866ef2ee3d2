//! Chat Session
//!
//! One session owns the typed conversation, the approval gate for its
//! pending tool calls, and the cancellation token for the turn in flight.
//! The event log and incident badge are derived views, recomputed from the
//! conversation on demand.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use oncall_desk_core::events::{project_events, Event};
use oncall_desk_core::status::{derive_status, IncidentStatus};
use oncall_desk_core::Conversation;

use crate::approval::ApprovalGate;

pub struct ChatSession {
    id: String,
    conversation: Conversation,
    approvals: Arc<ApprovalGate>,
    cancel: CancellationToken,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation: Conversation::new(),
            approvals: Arc::new(ApprovalGate::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn approvals(&self) -> Arc<ApprovalGate> {
        Arc::clone(&self.approvals)
    }

    /// Token guarding the turn currently in flight.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replace the conversation with the result of a finished turn.
    pub fn set_conversation(&mut self, conversation: Conversation) {
        self.conversation = conversation;
    }

    /// Flat event log derived from the conversation.
    pub fn events(&self) -> Vec<Event> {
        project_events(self.conversation.messages())
    }

    /// Incident badge derived from the event log.
    pub fn status(&self) -> IncidentStatus {
        let events = self.events();
        derive_status(&events, !self.conversation.is_empty())
    }

    /// Cancel the turn in flight and drop pending approvals.
    pub async fn cancel(&mut self) {
        self.cancel.cancel();
        self.approvals.cancel_all().await;
        self.cancel = CancellationToken::new();
    }

    /// Wipe the session back to its initial state.
    pub async fn reset(&mut self) {
        self.cancel().await;
        self.conversation.reset();
        tracing::info!(session_id = %self.id, "session reset");
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oncall_desk_core::{Message, Part};
    use serde_json::json;

    #[tokio::test]
    async fn test_fresh_session_is_idle() {
        let session = ChatSession::new();
        assert!(session.events().is_empty());
        assert_eq!(session.status(), IncidentStatus::Idle);
    }

    #[tokio::test]
    async fn test_status_tracks_conversation() {
        let mut session = ChatSession::new();
        let mut conversation = Conversation::new();
        conversation.push(Message::user("what's on fire?"));
        session.set_conversation(conversation);
        assert_eq!(session.status(), IncidentStatus::Monitoring);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut session = ChatSession::new();
        let mut conversation = Conversation::new();
        conversation.push(Message::user("hi"));
        conversation.push_assistant_part(Part::tool("t1", "listFiles", json!({})));
        session.set_conversation(conversation);
        let (_id, rx) = session.approvals().register().await;

        session.reset().await;

        assert!(session.conversation().is_empty());
        assert_eq!(session.status(), IncidentStatus::Idle);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_cancel_rearms_the_token() {
        let mut session = ChatSession::new();
        let before = session.cancel_token();
        session.cancel().await;
        assert!(before.is_cancelled());
        assert!(!session.cancel_token().is_cancelled());
    }
}
