//! Oncall Desk Core
//!
//! Dependency-light shared layer for the Oncall Desk workspace:
//!
//! - `message` - Conversation buffer, message/part model, tool-call state machine
//! - `events` - Pure projection of a conversation into a flat event log
//! - `status` - Incident status badge derived from the event log
//! - `streaming` - Unified stream event types and the provider adapter trait
//! - `tool` - Tool trait, execution context, and registry
//! - `error` - Core error taxonomy
//!
//! Higher-level crates (`oncall-desk-llm`, `oncall-desk-tools`, the
//! application crate) depend on this crate; it never depends on them.

pub mod error;
pub mod events;
pub mod message;
pub mod status;
pub mod streaming;
pub mod tool;

pub use error::{CoreError, CoreResult};
pub use events::{project_events, Event};
pub use message::{Approval, Conversation, Message, Part, Role, ToolState};
pub use status::{derive_status, IncidentStatus, SnapshotOutput, SnapshotPhase};
pub use streaming::{AdapterError, ChatStreamEvent, StreamAdapter};
pub use tool::{Tool, ToolContext, ToolRegistry};
