//! Chat Request Handling
//!
//! Validates incoming chat requests, selects and configures the provider,
//! and starts an orchestration run whose events stream back over a channel.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use oncall_desk_core::streaming::ChatStreamEvent;
use oncall_desk_core::{Conversation, CoreError, Part, Role};
use oncall_desk_llm::{
    GoogleProvider, LlmError, LlmProvider, Message as LlmMessage, OpenAiProvider, ProviderConfig,
    ProviderType,
};
use oncall_desk_tools::{onboarding_registry, oncall_registry};

use crate::approval::ApprovalGate;
use crate::catalog;
use crate::config::{AppConfig, GOOGLE_API_KEY_VAR, OPENAI_API_KEY_VAR};
use crate::orchestrator::Orchestrator;
use crate::prompts;

/// Errors surfaced to the transport layer.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Malformed or unsupported request (HTTP 400)
    #[error("{0}")]
    ClientInput(String),
    /// Server-side misconfiguration, typically a missing credential (HTTP 500)
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Provider(#[from] LlmError),
    #[error(transparent)]
    Core(#[from] CoreError),
    /// Anything unexpected (HTTP 500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ChatError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::ClientInput(_) => 400,
            ChatError::Configuration(_) => 500,
            ChatError::Provider(LlmError::InvalidRequest { .. }) => 400,
            ChatError::Provider(_) | ChatError::Core(_) | ChatError::Internal(_) => 500,
        }
    }
}

/// Which assistant handles the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Assistant {
    Onboarding,
    OnCall,
}

/// An incoming chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<oncall_desk_core::Message>,
    pub provider: String,
    pub model_id: String,
}

/// A running orchestration turn: the event stream plus its task handle.
pub struct ChatRun {
    pub events: mpsc::Receiver<ChatStreamEvent>,
    pub handle: JoinHandle<Result<Conversation, ChatError>>,
}

/// Stateless entry point for chat turns.
pub struct ChatService {
    config: AppConfig,
}

impl ChatService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Validate a request and start a streaming run.
    pub fn stream(
        &self,
        assistant: Assistant,
        request: ChatRequest,
        session_id: &str,
        approvals: Arc<ApprovalGate>,
        cancel: CancellationToken,
    ) -> Result<ChatRun, ChatError> {
        let provider = self.build_provider(&request)?;

        let registry = Arc::new(match assistant {
            Assistant::Onboarding => onboarding_registry(),
            Assistant::OnCall => oncall_registry(),
        });
        let system_prompt = match assistant {
            Assistant::Onboarding => prompts::ONBOARDING_PROMPT,
            Assistant::OnCall => prompts::ONCALL_PROMPT,
        };

        let conversation = Conversation::from_messages(request.messages.clone());
        let history = to_provider_history(&request.messages);

        let orchestrator =
            Orchestrator::new(provider, registry, approvals, system_prompt)
                .with_max_steps(self.config.max_steps);

        let (tx, rx) = mpsc::channel(64);
        let session_id = session_id.to_string();
        let handle = tokio::spawn(async move {
            orchestrator
                .run(&session_id, history, conversation, tx, cancel)
                .await
        });

        Ok(ChatRun { events: rx, handle })
    }

    /// Validate the request and construct the provider it names.
    ///
    /// Validation order is part of the contract: message presence first,
    /// then provider/model presence, then provider support, then credentials.
    fn build_provider(&self, request: &ChatRequest) -> Result<Arc<dyn LlmProvider>, ChatError> {
        if request.messages.is_empty() {
            return Err(ChatError::ClientInput(
                "Messages array is required".to_string(),
            ));
        }
        if request.provider.is_empty() || request.model_id.is_empty() {
            return Err(ChatError::ClientInput(
                "Provider and modelId are required".to_string(),
            ));
        }

        let provider_type = ProviderType::parse(&request.provider).ok_or_else(|| {
            ChatError::ClientInput(format!("Unsupported provider: {}", request.provider))
        })?;

        let api_key = self
            .config
            .api_key_for(provider_type)
            .map(str::to_string)
            .ok_or_else(|| {
                let var = match provider_type {
                    ProviderType::OpenAI => OPENAI_API_KEY_VAR,
                    ProviderType::Google => GOOGLE_API_KEY_VAR,
                };
                ChatError::Configuration(format!(
                    "{} is not configured in environment variables",
                    var
                ))
            })?;

        let model = catalog::model_by_id(&request.model_id)
            .map(|m| m.id.to_string())
            .unwrap_or_else(|| request.model_id.clone());

        let config = ProviderConfig {
            provider: provider_type,
            api_key: Some(api_key),
            base_url: self.config.base_url_for(provider_type).map(str::to_string),
            model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            options: HashMap::new(),
        };

        Ok(match provider_type {
            ProviderType::OpenAI => Arc::new(OpenAiProvider::new(config)),
            ProviderType::Google => Arc::new(GoogleProvider::new(config)),
        })
    }
}

/// Flatten the typed conversation into provider-format messages.
///
/// Completed tool parts become a tool-use block plus a result block so the
/// model sees its own earlier calls; pending ones are dropped (a new turn
/// never resumes a half-finished tool call).
pub fn to_provider_history(messages: &[oncall_desk_core::Message]) -> Vec<LlmMessage> {
    let mut history = Vec::new();
    for message in messages {
        let role = match message.role {
            Role::System => oncall_desk_llm::MessageRole::System,
            Role::User => oncall_desk_llm::MessageRole::User,
            Role::Assistant => oncall_desk_llm::MessageRole::Assistant,
        };

        let mut content = Vec::new();
        let mut results: Vec<LlmMessage> = Vec::new();
        for part in &message.parts {
            match part {
                Part::Text { text } if !text.is_empty() => {
                    content.push(oncall_desk_llm::MessageContent::Text { text: text.clone() });
                }
                Part::Text { .. } => {}
                Part::Tool {
                    id,
                    tool_name,
                    input,
                    output,
                    error_text,
                    ..
                } => {
                    let (result_text, is_error) = match (output, error_text) {
                        (Some(output), _) => (output.to_string(), false),
                        (None, Some(error)) => (error.clone(), true),
                        (None, None) => continue,
                    };
                    content.push(oncall_desk_llm::MessageContent::ToolUse {
                        id: id.clone(),
                        name: tool_name.clone(),
                        input: input.clone().unwrap_or(serde_json::Value::Null),
                    });
                    results.push(LlmMessage::tool_result(id, result_text, is_error));
                }
            }
        }

        if !content.is_empty() {
            history.push(LlmMessage { role, content });
        }
        history.extend(results);
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_with_keys() -> ChatService {
        ChatService::new(AppConfig {
            openai_api_key: Some("sk-test".into()),
            google_api_key: Some("g-test".into()),
            ..AppConfig::default()
        })
    }

    fn request(provider: &str, model_id: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![oncall_desk_core::Message::user("hello")],
            provider: provider.into(),
            model_id: model_id.into(),
        }
    }

    #[test]
    fn test_empty_messages_rejected() {
        let service = service_with_keys();
        let mut req = request("openai", "gpt-4o");
        req.messages.clear();
        let err = service.build_provider(&req).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Messages array is required");
    }

    #[test]
    fn test_missing_provider_rejected() {
        let service = service_with_keys();
        let err = service.build_provider(&request("", "gpt-4o")).unwrap_err();
        assert_eq!(err.to_string(), "Provider and modelId are required");
    }

    #[test]
    fn test_unsupported_provider_rejected() {
        let service = service_with_keys();
        let err = service
            .build_provider(&request("anthropic", "claude-3"))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("Unsupported provider: anthropic"));
    }

    #[test]
    fn test_missing_credential_is_server_error() {
        let service = ChatService::new(AppConfig::default());
        let err = service
            .build_provider(&request("openai", "gpt-4o"))
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_provider_selection() {
        let service = service_with_keys();
        let openai = service.build_provider(&request("openai", "gpt-4o")).unwrap();
        assert_eq!(openai.name(), "openai");
        let google = service
            .build_provider(&request("google", "gemini-2.5-flash"))
            .unwrap();
        assert_eq!(google.name(), "google");
    }

    #[test]
    fn test_history_flattens_tool_parts() {
        let mut tool_part = Part::tool("t1", "readFile", json!({"filePath": "/docs/x.md"}));
        if let Part::Tool { state, output, .. } = &mut tool_part {
            *state = oncall_desk_core::ToolState::OutputAvailable;
            *output = Some(json!({"fileContent": "# X"}));
        }
        let messages = vec![
            oncall_desk_core::Message::user("read x"),
            oncall_desk_core::Message {
                role: Role::Assistant,
                parts: vec![Part::text("Reading."), tool_part],
            },
        ];

        let history = to_provider_history(&messages);
        assert_eq!(history.len(), 3);
        assert!(matches!(
            history[1].content[1],
            oncall_desk_llm::MessageContent::ToolUse { .. }
        ));
        assert!(matches!(
            history[2].content[0],
            oncall_desk_llm::MessageContent::ToolResult { .. }
        ));
    }

    #[test]
    fn test_history_drops_pending_tool_parts() {
        let messages = vec![oncall_desk_core::Message {
            role: Role::Assistant,
            parts: vec![Part::tool("t1", "listFiles", json!({}))],
        }];
        assert!(to_provider_history(&messages).is_empty());
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"messages":[{"role":"user","parts":[{"type":"text","text":"hi"}]}],"provider":"openai","modelId":"gpt-4o"}"#,
        )
        .unwrap();
        assert_eq!(req.model_id, "gpt-4o");
    }
}
