//! Incident Status Derivation
//!
//! A second pure projection, this one over the event log: collapses the
//! on-call timeline into a single status badge. Last-write-wins per tool
//! name, ordered strictly by event index (`at` timestamps are informational
//! and never compared).
//!
//! Tool outputs are read through a versioned, validated schema
//! (`SnapshotOutput`) rather than ad-hoc field probing, so the derivation
//! never silently reads an absent field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::Event;
use crate::message::ToolState;

/// Tool names the status derivation distinguishes.
pub const SNAPSHOT_TOOL: &str = "getDynatraceSnapshot";
pub const EMAIL_TOOL: &str = "sendF5RedirectEmail";
pub const PAGER_TOOL: &str = "pageHumanOnCall";

/// Incident phase as reported by a telemetry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotPhase {
    /// Elevated error rate, no mitigation active
    Degraded,
    /// Traffic rerouted away from the failing pool
    Rerouted,
    /// Watching metrics after mitigation
    Monitoring,
    /// Error rate back to baseline
    Resolved,
}

/// Service health block inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHealth {
    pub summary: String,
}

/// Key service metrics inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetrics {
    pub error_rate_pct: f64,
    pub p95_latency_ms: u64,
}

/// Versioned output schema of the telemetry snapshot tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOutput {
    pub schema_version: u32,
    pub phase: SnapshotPhase,
    pub health: SnapshotHealth,
    pub metrics: SnapshotMetrics,
    /// RFC 3339 capture time, informational only
    pub at: String,
}

impl SnapshotOutput {
    pub const SCHEMA_VERSION: u32 = 1;

    /// Parse a snapshot output from raw tool-output JSON.
    ///
    /// Returns `None` for malformed or foreign-version payloads; the status
    /// derivation then treats the snapshot as absent instead of guessing.
    pub fn from_value(value: &Value) -> Option<Self> {
        let parsed: Self = serde_json::from_value(value.clone()).ok()?;
        (parsed.schema_version == Self::SCHEMA_VERSION).then_some(parsed)
    }
}

/// The derived incident status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// No conversation yet
    Idle,
    /// Conversation underway, no notable signal
    Monitoring,
    /// A human was paged and no later snapshot shows resolution
    HumanPaged,
    /// Mitigation in flight (redirect email sent, or traffic rerouted)
    Mitigating,
    /// A side-effectful tool is waiting on human approval
    AwaitingApproval,
    /// Latest snapshot reports the incident resolved
    Resolved,
}

impl IncidentStatus {
    /// Display label for the badge.
    pub fn label(self) -> &'static str {
        match self {
            IncidentStatus::Idle => "Idle",
            IncidentStatus::Monitoring => "Monitoring",
            IncidentStatus::HumanPaged => "Human Paged",
            IncidentStatus::Mitigating => "Mitigating",
            IncidentStatus::AwaitingApproval => "Awaiting Approval",
            IncidentStatus::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the incident status badge from the event log.
///
/// Precedence, highest first:
/// 1. latest snapshot phase `resolved`
/// 2. any pending email approval
/// 3. email sent, or latest snapshot phase `rerouted`
/// 4. any paging event
/// 5. conversation non-empty
/// 6. idle
pub fn derive_status(events: &[Event], conversation_started: bool) -> IncidentStatus {
    let last_snapshot_phase = events.iter().rev().find_map(|e| match e {
        Event::Tool {
            tool_name,
            output: Some(output),
            ..
        } if tool_name == SNAPSHOT_TOOL => SnapshotOutput::from_value(output).map(|s| s.phase),
        _ => None,
    });

    let awaiting_approval = events.iter().any(|e| {
        matches!(e, Event::Tool { tool_name, state, .. }
            if tool_name == EMAIL_TOOL && *state == ToolState::ApprovalRequested)
    });
    let has_paging = events.iter().any(|e| {
        matches!(e, Event::Tool { tool_name, .. } if tool_name == PAGER_TOOL)
    });
    let email_sent = events.iter().any(|e| {
        matches!(e, Event::Tool { tool_name, state, .. }
            if tool_name == EMAIL_TOOL && *state == ToolState::OutputAvailable)
    });

    if last_snapshot_phase == Some(SnapshotPhase::Resolved) {
        IncidentStatus::Resolved
    } else if awaiting_approval {
        IncidentStatus::AwaitingApproval
    } else if email_sent || last_snapshot_phase == Some(SnapshotPhase::Rerouted) {
        IncidentStatus::Mitigating
    } else if has_paging {
        IncidentStatus::HumanPaged
    } else if conversation_started {
        IncidentStatus::Monitoring
    } else {
        IncidentStatus::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_output(phase: &str) -> Value {
        json!({
            "schemaVersion": 1,
            "phase": phase,
            "health": { "summary": "checkout-service error rate elevated" },
            "metrics": { "errorRatePct": 4.2, "p95LatencyMs": 1890 },
            "at": "2026-02-10T09:15:00Z",
        })
    }

    fn tool_event(index: usize, tool_name: &str, state: ToolState, output: Option<Value>) -> Event {
        Event::Tool {
            message_index: index,
            part_index: 0,
            tool_name: tool_name.to_string(),
            state,
            input: None,
            output,
            error_text: None,
            at: None,
        }
    }

    #[test]
    fn test_idle_without_messages() {
        assert_eq!(derive_status(&[], false), IncidentStatus::Idle);
    }

    #[test]
    fn test_monitoring_once_conversation_started() {
        assert_eq!(derive_status(&[], true), IncidentStatus::Monitoring);
    }

    #[test]
    fn test_paging_without_resolution_escalates() {
        let events = vec![
            tool_event(0, SNAPSHOT_TOOL, ToolState::OutputAvailable, Some(snapshot_output("monitoring"))),
            tool_event(1, PAGER_TOOL, ToolState::OutputAvailable, Some(json!({"pageId": "p-1"}))),
        ];
        assert_eq!(derive_status(&events, true), IncidentStatus::HumanPaged);
    }

    #[test]
    fn test_pending_approval_overrides_paging() {
        let mut events = vec![
            tool_event(0, SNAPSHOT_TOOL, ToolState::OutputAvailable, Some(snapshot_output("monitoring"))),
            tool_event(1, PAGER_TOOL, ToolState::OutputAvailable, Some(json!({"pageId": "p-1"}))),
        ];
        assert_eq!(derive_status(&events, true), IncidentStatus::HumanPaged);

        events.push(tool_event(2, EMAIL_TOOL, ToolState::ApprovalRequested, None));
        assert_eq!(derive_status(&events, true), IncidentStatus::AwaitingApproval);

        events.push(tool_event(3, SNAPSHOT_TOOL, ToolState::OutputAvailable, Some(snapshot_output("resolved"))));
        assert_eq!(derive_status(&events, true), IncidentStatus::Resolved);
    }

    #[test]
    fn test_email_sent_means_mitigating() {
        let events = vec![tool_event(
            0,
            EMAIL_TOOL,
            ToolState::OutputAvailable,
            Some(json!({"ticketId": "NET-1042", "at": "2026-02-10T09:20:00Z"})),
        )];
        assert_eq!(derive_status(&events, true), IncidentStatus::Mitigating);
    }

    #[test]
    fn test_rerouted_phase_means_mitigating() {
        let events = vec![tool_event(
            0,
            SNAPSHOT_TOOL,
            ToolState::OutputAvailable,
            Some(snapshot_output("rerouted")),
        )];
        assert_eq!(derive_status(&events, true), IncidentStatus::Mitigating);
    }

    #[test]
    fn test_latest_snapshot_wins_by_index_not_timestamp() {
        // the later event carries an earlier timestamp; index still wins
        let mut resolved = snapshot_output("resolved");
        resolved["at"] = json!("2026-02-10T08:00:00Z");
        let events = vec![
            tool_event(0, SNAPSHOT_TOOL, ToolState::OutputAvailable, Some(snapshot_output("degraded"))),
            tool_event(1, SNAPSHOT_TOOL, ToolState::OutputAvailable, Some(resolved)),
        ];
        assert_eq!(derive_status(&events, true), IncidentStatus::Resolved);
    }

    #[test]
    fn test_malformed_snapshot_output_is_ignored() {
        let events = vec![
            tool_event(0, SNAPSHOT_TOOL, ToolState::OutputAvailable, Some(snapshot_output("resolved"))),
            tool_event(1, SNAPSHOT_TOOL, ToolState::OutputAvailable, Some(json!({"phase": 42}))),
        ];
        // the malformed latest snapshot is skipped; the valid one still counts
        assert_eq!(derive_status(&events, true), IncidentStatus::Resolved);
    }

    #[test]
    fn test_foreign_schema_version_rejected() {
        let mut output = snapshot_output("resolved");
        output["schemaVersion"] = json!(2);
        assert!(SnapshotOutput::from_value(&output).is_none());
    }

    #[test]
    fn test_snapshot_output_roundtrip() {
        let parsed = SnapshotOutput::from_value(&snapshot_output("degraded")).unwrap();
        assert_eq!(parsed.phase, SnapshotPhase::Degraded);
        assert_eq!(parsed.metrics.p95_latency_ms, 1890);
        assert!((parsed.metrics.error_rate_pct - 4.2).abs() < f64::EPSILON);
    }
}
