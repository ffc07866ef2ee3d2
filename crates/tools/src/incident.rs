//! Incident Response Tools
//!
//! The on-call assistant's tools:
//!
//! - `getDynatraceSnapshot` - deterministic mock telemetry; each call walks
//!   one step along a scripted incident timeline
//! - `sendF5RedirectEmail` - mitigation with external side effects, gated
//!   behind human approval
//! - `pageHumanOnCall` - escalation, not gated (paging a human must never
//!   wait on a human)

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use oncall_desk_core::error::CoreResult;
use oncall_desk_core::status::{SnapshotHealth, SnapshotMetrics, SnapshotOutput, SnapshotPhase};
use oncall_desk_core::tool::{Tool, ToolContext};

/// Scripted incident timeline: phase plus the metrics backing it.
const TIMELINE: &[(SnapshotPhase, f64, u64, &str)] = &[
    (
        SnapshotPhase::Degraded,
        4.2,
        1890,
        "checkout-service error rate elevated; EU pool saturated",
    ),
    (
        SnapshotPhase::Degraded,
        5.1,
        2140,
        "checkout-service error rate climbing; EU pool saturated",
    ),
    (
        SnapshotPhase::Rerouted,
        2.3,
        1120,
        "traffic rerouted to US pool; EU pool draining",
    ),
    (
        SnapshotPhase::Monitoring,
        0.9,
        640,
        "error rate falling; watching rerouted traffic",
    ),
    (
        SnapshotPhase::Resolved,
        0.2,
        310,
        "error rate back to baseline",
    ),
];

/// Fetches a mock Dynatrace telemetry snapshot.
///
/// Each call advances one step along the scripted timeline and stays at the
/// final (resolved) step afterwards, so repeated polling within a session
/// shows a plausible incident arc.
pub struct DynatraceSnapshotTool {
    calls: AtomicUsize,
}

impl DynatraceSnapshotTool {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl Default for DynatraceSnapshotTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DynatraceSnapshotTool {
    fn name(&self) -> &str {
        "getDynatraceSnapshot"
    }

    fn description(&self) -> &str {
        "Fetch the current Dynatrace telemetry snapshot for the checkout service: \
         incident phase, health summary, error rate, and p95 latency. Call this to \
         assess the incident before and after any mitigation."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, ctx: &ToolContext, _args: Value) -> CoreResult<Value> {
        let step = self.calls.fetch_add(1, Ordering::SeqCst);
        let (phase, error_rate_pct, p95_latency_ms, summary) =
            TIMELINE[step.min(TIMELINE.len() - 1)];

        tracing::info!(session_id = %ctx.session_id, step, ?phase, "telemetry snapshot");

        let output = SnapshotOutput {
            schema_version: SnapshotOutput::SCHEMA_VERSION,
            phase,
            health: SnapshotHealth {
                summary: summary.to_string(),
            },
            metrics: SnapshotMetrics {
                error_rate_pct,
                p95_latency_ms,
            },
            at: chrono::Utc::now().to_rfc3339(),
        };

        Ok(serde_json::to_value(output)?)
    }
}

/// Requests an F5 traffic redirect via the network operations mailbox.
///
/// Approval-gated: sending the email reroutes production traffic, so the
/// orchestrator suspends and waits for an explicit human decision first.
pub struct F5RedirectEmailTool;

#[async_trait]
impl Tool for F5RedirectEmailTool {
    fn name(&self) -> &str {
        "sendF5RedirectEmail"
    }

    fn description(&self) -> &str {
        "Send an email to network operations requesting an F5 traffic redirect away \
         from the failing pool. This has external side effects and requires human \
         approval before it is sent."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "justification": {
                    "type": "string",
                    "description": "Why the redirect is needed, quoted in the email body"
                }
            },
            "required": ["justification"]
        })
    }

    fn requires_approval(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> CoreResult<Value> {
        let justification = args
            .get("justification")
            .and_then(Value::as_str)
            .unwrap_or("(none given)");
        let ticket_id = format!("NET-{}", &Uuid::new_v4().simple().to_string()[..8]);

        tracing::info!(
            session_id = %ctx.session_id,
            ticket_id,
            justification,
            "redirect email sent to network operations"
        );

        Ok(json!({
            "ticketId": ticket_id,
            "at": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

/// Pages the human on-call engineer.
pub struct PageHumanTool;

#[async_trait]
impl Tool for PageHumanTool {
    fn name(&self) -> &str {
        "pageHumanOnCall"
    }

    fn description(&self) -> &str {
        "Page the human on-call engineer. Use this when the incident cannot be \
         mitigated automatically, or when a requested mitigation was denied."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reason": {
                    "type": "string",
                    "description": "Short reason included in the page"
                }
            },
            "required": ["reason"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> CoreResult<Value> {
        let reason = args
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("(none given)");
        let page_id = format!("PAGE-{}", &Uuid::new_v4().simple().to_string()[..8]);

        tracing::warn!(session_id = %ctx.session_id, page_id, reason, "human on-call paged");

        Ok(json!({
            "pageId": page_id,
            "at": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ToolContext {
        ToolContext::new("test-session", "tc-001")
    }

    #[tokio::test]
    async fn test_snapshot_walks_the_timeline() {
        let tool = DynatraceSnapshotTool::new();

        let first = tool.execute(&ctx(), json!({})).await.unwrap();
        assert_eq!(first["phase"], "degraded");
        assert_eq!(first["schemaVersion"], 1);
        assert!(first["metrics"]["errorRatePct"].as_f64().unwrap() > 4.0);

        // skip to the end of the scripted arc
        for _ in 0..TIMELINE.len() {
            tool.execute(&ctx(), json!({})).await.unwrap();
        }
        let last = tool.execute(&ctx(), json!({})).await.unwrap();
        assert_eq!(last["phase"], "resolved");
    }

    #[tokio::test]
    async fn test_snapshot_output_is_schema_valid() {
        let tool = DynatraceSnapshotTool::new();
        let output = tool.execute(&ctx(), json!({})).await.unwrap();
        let parsed = SnapshotOutput::from_value(&output).unwrap();
        assert_eq!(parsed.phase, SnapshotPhase::Degraded);
        assert!(!parsed.health.summary.is_empty());
    }

    #[tokio::test]
    async fn test_email_tool_is_approval_gated() {
        assert!(F5RedirectEmailTool.requires_approval());
        let output = F5RedirectEmailTool
            .execute(&ctx(), json!({"justification": "EU pool saturated"}))
            .await
            .unwrap();
        assert!(output["ticketId"].as_str().unwrap().starts_with("NET-"));
        assert!(output["at"].is_string());
    }

    #[tokio::test]
    async fn test_pager_is_not_gated() {
        assert!(!PageHumanTool.requires_approval());
        let output = PageHumanTool
            .execute(&ctx(), json!({"reason": "redirect denied"}))
            .await
            .unwrap();
        assert!(output["pageId"].as_str().unwrap().starts_with("PAGE-"));
    }
}
