//! Approval Gate
//!
//! Suspension point for approval-gated tool calls. The orchestrator registers
//! a pending request and awaits its receiver; the operator resolves it exactly
//! once with an approve/deny decision. Dropping the pending senders (via
//! `cancel_all`) wakes every waiter with a cancellation.

use std::collections::HashMap;

use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

use oncall_desk_core::{CoreError, CoreResult};

/// The operator's answer to one approval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalDecision {
    pub approved: bool,
    pub reason: Option<String>,
}

impl ApprovalDecision {
    pub fn approved() -> Self {
        Self {
            approved: true,
            reason: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: Some(reason.into()),
        }
    }
}

/// Tracks in-flight approval requests, keyed by approval id.
pub struct ApprovalGate {
    pending: Mutex<HashMap<String, oneshot::Sender<ApprovalDecision>>>,
}

impl ApprovalGate {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new approval request. Returns the minted approval id and
    /// the receiver the caller awaits. The receiver yields `Err(RecvError)`
    /// if the request is cancelled before it is resolved.
    pub async fn register(&self) -> (String, oneshot::Receiver<ApprovalDecision>) {
        let approval_id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();

        let mut pending = self.pending.lock().await;
        pending.insert(approval_id.clone(), tx);
        tracing::debug!(approval_id, "approval requested");

        (approval_id, rx)
    }

    /// Resolve a pending request. Each request resolves at most once; a
    /// second resolution (or an unknown id) fails with `ApprovalNotFound`.
    pub async fn resolve(&self, approval_id: &str, decision: ApprovalDecision) -> CoreResult<()> {
        let mut pending = self.pending.lock().await;
        let tx = pending
            .remove(approval_id)
            .ok_or_else(|| CoreError::approval_not_found(approval_id))?;

        tracing::info!(approval_id, approved = decision.approved, "approval resolved");

        // the waiter may have gone away (session cancelled mid-decision);
        // that is not an error for the resolver
        let _ = tx.send(decision);
        Ok(())
    }

    /// Drop every pending request, waking all waiters with a cancellation.
    pub async fn cancel_all(&self) {
        let mut pending = self.pending.lock().await;
        let count = pending.len();
        pending.clear();
        if count > 0 {
            tracing::info!(count, "cancelled pending approval requests");
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

impl Default for ApprovalGate {
    fn default() -> Self {
        Self::new()
    }
}
