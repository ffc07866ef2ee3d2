//! Google Gemini Provider
//!
//! Implementation of the LlmProvider trait for the Gemini API
//! (`generateContent` / `streamGenerateContent?alt=sse`).

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use super::provider::{missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{
    LlmError, LlmResponse, LlmResult, Message, MessageContent, MessageRole, ProviderConfig,
    StopReason, ToolCall, ToolDefinition, UsageStats,
};
use crate::http_client::{build_http_client, LineBuffer};
use crate::streaming_adapters::GeminiAdapter;
use oncall_desk_core::streaming::{ChatStreamEvent, StreamAdapter};

/// Default Gemini API base
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini provider
pub struct GoogleProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a new Google provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = build_http_client();
        Self { config, client }
    }

    fn endpoint(&self, stream: bool) -> String {
        let base = self.config.base_url.as_deref().unwrap_or(GEMINI_API_URL);
        if stream {
            format!("{}/{}:streamGenerateContent?alt=sse", base, self.config.model)
        } else {
            format!("{}/{}:generateContent", base, self.config.model)
        }
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        tools: &[ToolDefinition],
    ) -> Value {
        let mut body = serde_json::json!({
            "contents": self.messages_to_gemini(messages),
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            },
        });

        if let Some(sys) = system {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": sys }]
            });
        }

        if !tools.is_empty() {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.input_schema,
                    })
                })
                .collect();
            body["tools"] = serde_json::json!([{ "functionDeclarations": declarations }]);
        }

        body
    }

    /// Convert messages to Gemini `contents`.
    ///
    /// Gemini correlates tool results by function name rather than call id,
    /// so the id-to-name mapping is recovered from earlier ToolUse blocks
    /// while walking the history.
    fn messages_to_gemini(&self, messages: &[Message]) -> Vec<Value> {
        let mut call_names: HashMap<String, String> = HashMap::new();
        let mut contents = Vec::new();

        for message in messages {
            let role = match message.role {
                MessageRole::Assistant => "model",
                // System text is carried via systemInstruction; anything
                // left here is treated as user context.
                MessageRole::User | MessageRole::System => "user",
            };

            let mut parts = Vec::new();
            for content in &message.content {
                match content {
                    MessageContent::Text { text } => {
                        parts.push(serde_json::json!({ "text": text }));
                    }
                    MessageContent::ToolUse { id, name, input } => {
                        call_names.insert(id.clone(), name.clone());
                        parts.push(serde_json::json!({
                            "functionCall": { "name": name, "args": input }
                        }));
                    }
                    MessageContent::ToolResult {
                        tool_use_id,
                        content,
                        ..
                    } => {
                        let name = call_names
                            .get(tool_use_id)
                            .cloned()
                            .unwrap_or_else(|| tool_use_id.clone());
                        let response: Value = serde_json::from_str(content)
                            .unwrap_or_else(|_| serde_json::json!({ "content": content }));
                        parts.push(serde_json::json!({
                            "functionResponse": { "name": name, "response": response }
                        }));
                    }
                }
            }

            if !parts.is_empty() {
                contents.push(serde_json::json!({ "role": role, "parts": parts }));
            }
        }

        contents
    }

    /// Parse a non-streaming response from the Gemini API
    fn parse_response(&self, response: &GeminiResponse) -> LlmResponse {
        let mut content = String::new();
        let mut tool_calls = Vec::new();
        let mut stop_reason = StopReason::EndTurn;

        if let Some(candidate) = response.candidates.first() {
            if let Some(parts) = candidate.content.as_ref().map(|c| &c.parts) {
                for part in parts {
                    if let Some(text) = &part.text {
                        content.push_str(text);
                    }
                    if let Some(call) = &part.function_call {
                        tool_calls.push(ToolCall {
                            id: format!("gemini-call-{}", tool_calls.len() + 1),
                            name: call.name.clone(),
                            arguments: call.args.clone(),
                        });
                    }
                }
            }
            if candidate.finish_reason.is_some() {
                stop_reason = if tool_calls.is_empty() {
                    StopReason::EndTurn
                } else {
                    StopReason::ToolUse
                };
            }
        }

        let usage = response
            .usage_metadata
            .as_ref()
            .map(|u| UsageStats {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        LlmResponse {
            content: if content.is_empty() { None } else { Some(content) },
            tool_calls,
            stop_reason,
            usage,
            model: self.config.model.clone(),
        }
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> LlmResult<()> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("google"))?;

        // list models to verify the API key
        let base = self.config.base_url.as_deref().unwrap_or(GEMINI_API_URL);
        let response = self
            .client
            .get(base)
            .header("x-goog-api-key", api_key)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(parse_http_error(status, &body, "google"))
        }
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
    ) -> LlmResult<LlmResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("google"))?;

        let body = self.build_request_body(&messages, system.as_deref(), &tools);

        let response = self
            .client
            .post(self.endpoint(false))
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, "google"));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(self.parse_response(&gemini_response))
    }

    async fn stream_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        tx: mpsc::Sender<ChatStreamEvent>,
    ) -> LlmResult<LlmResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("google"))?;

        let body = self.build_request_body(&messages, system.as_deref(), &tools);

        let response = self
            .client
            .post(self.endpoint(true))
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;
            return Err(parse_http_error(status, &body_text, "google"));
        }

        // Process SSE stream
        let mut adapter = GeminiAdapter::new();
        let mut accumulated_content = String::new();
        let mut tool_calls = Vec::new();
        let mut usage = UsageStats::default();
        let mut stop_reason = StopReason::EndTurn;

        let mut stream = response.bytes_stream();
        use futures_util::StreamExt;

        // split on raw bytes so multi-byte characters can straddle chunks
        let mut buffer = LineBuffer::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

            for line in buffer.push(&chunk) {
                if line.trim().is_empty() {
                    continue;
                }

                match adapter.adapt(&line) {
                    Ok(events) => {
                        for event in events {
                            match &event {
                                ChatStreamEvent::TextDelta { content } => {
                                    accumulated_content.push_str(content);
                                }
                                ChatStreamEvent::ToolInputAvailable {
                                    tool_id,
                                    tool_name,
                                    input,
                                } => {
                                    tool_calls.push(ToolCall {
                                        id: tool_id.clone(),
                                        name: tool_name.clone(),
                                        arguments: input.clone(),
                                    });
                                }
                                ChatStreamEvent::Usage {
                                    input_tokens,
                                    output_tokens,
                                } => {
                                    usage.input_tokens = *input_tokens;
                                    usage.output_tokens = *output_tokens;
                                }
                                ChatStreamEvent::Complete {
                                    stop_reason: Some(reason),
                                } => {
                                    stop_reason = StopReason::from(reason.as_str());
                                }
                                _ => {}
                            }

                            // Same forwarding policy as the OpenAI provider
                            if matches!(&event, ChatStreamEvent::TextDelta { .. }) {
                                let _ = tx.send(event).await;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx
                            .send(ChatStreamEvent::Error {
                                message: e.to_string(),
                                code: None,
                            })
                            .await;
                    }
                }
            }
        }

        Ok(LlmResponse {
            content: if accumulated_content.is_empty() {
                None
            } else {
                Some(accumulated_content)
            },
            tool_calls,
            stop_reason,
            usage,
            model: self.config.model.clone(),
        })
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount")]
    #[serde(default)]
    candidates_token_count: u32,
}
