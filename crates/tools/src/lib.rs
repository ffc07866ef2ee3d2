//! Oncall Desk Tools
//!
//! Tool implementations the assistants can invoke:
//!
//! - `docs` - Static documentation store backing the mock file server
//! - `file_server` - `listFiles` / `readFile` onboarding tools
//! - `incident` - On-call telemetry, mitigation, and paging tools
//!
//! `registry` builders assemble the per-assistant tool sets.

pub mod docs;
pub mod file_server;
pub mod incident;

use std::sync::Arc;

use oncall_desk_core::tool::ToolRegistry;

pub use file_server::{ListFilesTool, ReadFileTool};
pub use incident::{DynatraceSnapshotTool, F5RedirectEmailTool, PageHumanTool};

/// Tool set for the developer onboarding assistant.
pub fn onboarding_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ListFilesTool));
    registry.register(Arc::new(ReadFileTool));
    registry
}

/// Tool set for the on-call incident assistant.
pub fn oncall_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(DynatraceSnapshotTool::new()));
    registry.register(Arc::new(F5RedirectEmailTool));
    registry.register(Arc::new(PageHumanTool));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onboarding_registry_contents() {
        let registry = onboarding_registry();
        assert_eq!(registry.names(), vec!["listFiles", "readFile"]);
        assert!(!registry.requires_approval("listFiles"));
        assert!(!registry.requires_approval("readFile"));
    }

    #[test]
    fn test_oncall_registry_contents() {
        let registry = oncall_registry();
        assert_eq!(
            registry.names(),
            vec!["getDynatraceSnapshot", "sendF5RedirectEmail", "pageHumanOnCall"]
        );
        // only the email action is approval-gated
        assert!(!registry.requires_approval("getDynatraceSnapshot"));
        assert!(registry.requires_approval("sendF5RedirectEmail"));
        assert!(!registry.requires_approval("pageHumanOnCall"));
    }
}
