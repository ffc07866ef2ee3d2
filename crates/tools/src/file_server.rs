//! File Server Tools
//!
//! The onboarding assistant's tools: `listFiles` enumerates the mock
//! documentation store, `readFile` returns one file's markdown content with
//! metadata. Neither tool is approval-gated.

use async_trait::async_trait;
use serde_json::{json, Value};

use oncall_desk_core::error::{CoreError, CoreResult};
use oncall_desk_core::tool::{Tool, ToolContext};

use crate::docs;

/// Lists the available documentation files.
pub struct ListFilesTool;

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "listFiles"
    }

    fn description(&self) -> &str {
        "List all available documentation files on the file server. Use this tool to \
         discover what documentation is available before reading specific content. \
         Returns a list of files with their paths and descriptions."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, ctx: &ToolContext, _args: Value) -> CoreResult<Value> {
        tracing::debug!(session_id = %ctx.session_id, "listing documentation files");

        let files: Vec<Value> = docs::DOC_FILES
            .iter()
            .map(|f| {
                json!({
                    "path": f.path,
                    "name": f.name,
                    "type": "file",
                    "description": f.description,
                })
            })
            .collect();

        Ok(json!({
            "files": files,
            "hint": "You can now use the readFile tool with any file path to get its content.",
        }))
    }
}

/// Reads one documentation file by path.
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "readFile"
    }

    fn description(&self) -> &str {
        "Read the content of a specific documentation file from the file server. Use \
         the listFiles tool first to discover available file paths. Returns the full \
         markdown content of the file."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "The full path to the file to read, e.g., '/docs/getting-started.md'"
                }
            },
            "required": ["filePath"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> CoreResult<Value> {
        let file_path = args
            .get("filePath")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::client_input("filePath parameter is required"))?;

        tracing::debug!(session_id = %ctx.session_id, file_path, "reading documentation file");

        let content = docs::read_doc(file_path)
            .ok_or_else(|| CoreError::not_found(format!("File not found: {}", file_path)))?;

        Ok(json!({
            "fileContent": content,
            "metadata": {
                "path": file_path,
                "lastModified": chrono::Utc::now().to_rfc3339(),
            },
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
    async fn test_list_files_output_shape() {
        let output = ListFilesTool.execute(&ctx(), json!({})).await.unwrap();

        let files = output["files"].as_array().unwrap();
        assert_eq!(files.len(), 6);
        assert_eq!(files[0]["path"], "/docs/getting-started.md");
        assert_eq!(files[0]["type"], "file");
        assert!(output["hint"].as_str().unwrap().contains("readFile"));
    }

    #[tokio::test]
    async fn test_read_file_success() {
        let output = ReadFileTool
            .execute(&ctx(), json!({"filePath": "/docs/development-workflow.md"}))
            .await
            .unwrap();

        assert!(output["fileContent"]
            .as_str()
            .unwrap()
            .contains("# Development Workflow"));
        assert_eq!(output["metadata"]["path"], "/docs/development-workflow.md");
        assert!(output["metadata"]["lastModified"].is_string());
    }

    #[tokio::test]
    async fn test_read_file_not_found() {
        let err = ReadFileTool
            .execute(&ctx(), json!({"filePath": "/docs/nope.md"}))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(err.to_string().contains("/docs/nope.md"));
    }

    #[tokio::test]
    async fn test_read_file_missing_param() {
        let err = ReadFileTool.execute(&ctx(), json!({})).await.unwrap_err();
        assert!(matches!(err, CoreError::ClientInput(_)));
    }
}
