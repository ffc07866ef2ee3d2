//! Oncall Desk
//!
//! Backend for two demo chat assistants sharing one agent pipeline:
//!
//! - **Onboarding** - answers new-developer questions, grounded in a mock
//!   documentation file server
//! - **On-call** - works a scripted production incident with telemetry,
//!   an approval-gated mitigation, and human paging
//!
//! The application layer here wires the core conversation model, the LLM
//! providers, and the tool sets into a bounded orchestration loop.

pub mod approval;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod session;

pub use approval::{ApprovalDecision, ApprovalGate};
pub use catalog::{default_model, model_by_id, models_by_provider, ModelConfig, AVAILABLE_MODELS};
pub use chat::{Assistant, ChatError, ChatRequest, ChatRun, ChatService};
pub use config::AppConfig;
pub use orchestrator::{Orchestrator, DEFAULT_MAX_STEPS};
pub use session::ChatSession;
