//! Chat Orchestration Loop
//!
//! Drives one assistant turn: call the model, execute any tool calls it
//! requested (suspending on approval-gated ones), feed the results back, and
//! repeat until the model answers in plain text or the step budget runs out.
//!
//! The budget is a policy bound, not a failure: exhausting it ends the run
//! with a normal `Complete` event carrying `stop_reason: "step_budget"`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use oncall_desk_core::streaming::ChatStreamEvent;
use oncall_desk_core::tool::{ToolContext, ToolRegistry};
use oncall_desk_core::{Conversation, Part};
use oncall_desk_llm::{
    LlmProvider, Message, MessageContent, StopReason, ToolCall, ToolDefinition,
};

use crate::approval::ApprovalGate;
use crate::chat::ChatError;

/// Model invocations allowed per turn.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Runs the bounded tool-calling loop for one assistant turn.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    approvals: Arc<ApprovalGate>,
    system_prompt: String,
    max_steps: usize,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        approvals: Arc<ApprovalGate>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            registry,
            approvals,
            system_prompt: system_prompt.into(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run the loop to completion.
    ///
    /// `history` is the provider-format transcript; `conversation` is the
    /// typed transcript the event log and status badge are derived from.
    /// Both are extended in lockstep as the turn progresses.
    pub async fn run(
        &self,
        session_id: &str,
        mut history: Vec<Message>,
        mut conversation: Conversation,
        tx: mpsc::Sender<ChatStreamEvent>,
        cancel: CancellationToken,
    ) -> Result<Conversation, ChatError> {
        let tools = self.tool_definitions();

        for step in 0..self.max_steps {
            if cancel.is_cancelled() || tx.is_closed() {
                tracing::info!(session_id, step, "run cancelled");
                send(&tx, complete("cancelled")).await;
                return Ok(conversation);
            }

            tracing::debug!(session_id, step, model = self.provider.model(), "model call");

            let response = match self
                .provider
                .stream_message(
                    history.clone(),
                    Some(self.system_prompt.clone()),
                    tools.clone(),
                    tx.clone(),
                )
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    send(
                        &tx,
                        ChatStreamEvent::Error {
                            message: err.to_string(),
                            code: None,
                        },
                    )
                    .await;
                    return Err(ChatError::Provider(err));
                }
            };

            send(
                &tx,
                ChatStreamEvent::Usage {
                    input_tokens: response.usage.input_tokens,
                    output_tokens: response.usage.output_tokens,
                },
            )
            .await;

            // mirror the assistant turn into both transcripts
            let mut assistant_content = Vec::new();
            if let Some(text) = response.content.as_deref().filter(|t| !t.is_empty()) {
                conversation.append_text_delta(text);
                assistant_content.push(MessageContent::Text {
                    text: text.to_string(),
                });
            }
            for call in &response.tool_calls {
                assistant_content.push(MessageContent::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.arguments.clone(),
                });
            }
            if !assistant_content.is_empty() {
                history.push(Message {
                    role: oncall_desk_llm::MessageRole::Assistant,
                    content: assistant_content,
                });
            }

            if response.tool_calls.is_empty() {
                let stop_reason = stop_reason_str(&response.stop_reason);
                send(&tx, complete(&stop_reason)).await;
                return Ok(conversation);
            }

            for call in &response.tool_calls {
                if cancel.is_cancelled() || tx.is_closed() {
                    tracing::info!(session_id, tool = %call.name, "cancelled before tool dispatch");
                    send(&tx, complete("cancelled")).await;
                    return Ok(conversation);
                }

                let result = self
                    .dispatch_tool(session_id, call, &mut conversation, &tx, &cancel)
                    .await?;

                match result {
                    ToolOutcome::Result(message) => history.push(message),
                    ToolOutcome::Cancelled => {
                        send(&tx, complete("cancelled")).await;
                        return Ok(conversation);
                    }
                }
            }
        }

        tracing::info!(session_id, max_steps = self.max_steps, "step budget exhausted");
        send(&tx, complete("step_budget")).await;
        Ok(conversation)
    }

    /// Execute one tool call, suspending on the approval gate when required.
    async fn dispatch_tool(
        &self,
        session_id: &str,
        call: &ToolCall,
        conversation: &mut Conversation,
        tx: &mpsc::Sender<ChatStreamEvent>,
        cancel: &CancellationToken,
    ) -> Result<ToolOutcome, ChatError> {
        conversation.push_assistant_part(Part::tool(
            &call.id,
            &call.name,
            call.arguments.clone(),
        ));
        send(
            tx,
            ChatStreamEvent::ToolInputStart {
                tool_id: call.id.clone(),
                tool_name: call.name.clone(),
            },
        )
        .await;
        send(
            tx,
            ChatStreamEvent::ToolInputAvailable {
                tool_id: call.id.clone(),
                tool_name: call.name.clone(),
                input: call.arguments.clone(),
            },
        )
        .await;

        if !self.registry.contains(&call.name) {
            let error_text = format!("Unknown tool: {}", call.name);
            conversation.set_tool_error(&call.id, &error_text)?;
            send(
                tx,
                ChatStreamEvent::ToolOutputError {
                    tool_id: call.id.clone(),
                    error_text: error_text.clone(),
                },
            )
            .await;
            return Ok(ToolOutcome::Result(Message::tool_result(
                &call.id, error_text, true,
            )));
        }

        if self.registry.requires_approval(&call.name) {
            let (approval_id, decision_rx) = self.approvals.register().await;
            conversation.request_approval(&call.id, &approval_id)?;
            send(
                tx,
                ChatStreamEvent::ApprovalRequested {
                    tool_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    approval_id: approval_id.clone(),
                    input: call.arguments.clone(),
                },
            )
            .await;

            let decision = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(session_id, tool = %call.name, "cancelled while awaiting approval");
                    return Ok(ToolOutcome::Cancelled);
                }
                decision = decision_rx => match decision {
                    Ok(decision) => decision,
                    // sender dropped: the gate was cleared
                    Err(_) => {
                        tracing::info!(session_id, tool = %call.name, "approval request cancelled");
                        return Ok(ToolOutcome::Cancelled);
                    }
                },
            };

            conversation.resolve_approval(&approval_id, decision.approved, decision.reason.clone())?;
            send(
                tx,
                ChatStreamEvent::ApprovalResponded {
                    approval_id,
                    approved: decision.approved,
                    reason: decision.reason.clone(),
                },
            )
            .await;

            if !decision.approved {
                // advisory, not fatal: the model sees the denial and adapts
                let error_text = format!(
                    "denied by operator: {}",
                    decision.reason.as_deref().unwrap_or("no reason given")
                );
                conversation.set_tool_error(&call.id, &error_text)?;
                send(
                    tx,
                    ChatStreamEvent::ToolOutputError {
                        tool_id: call.id.clone(),
                        error_text: error_text.clone(),
                    },
                )
                .await;
                return Ok(ToolOutcome::Result(Message::tool_result(
                    &call.id, error_text, true,
                )));
            }
        }

        let ctx = ToolContext::new(session_id, &call.id);
        match self
            .registry
            .execute(&call.name, &ctx, call.arguments.clone())
            .await
        {
            Ok(output) => {
                conversation.set_tool_output(&call.id, output.clone())?;
                send(
                    tx,
                    ChatStreamEvent::ToolOutputAvailable {
                        tool_id: call.id.clone(),
                        output: output.clone(),
                    },
                )
                .await;
                Ok(ToolOutcome::Result(Message::tool_result(
                    &call.id,
                    output.to_string(),
                    false,
                )))
            }
            Err(err) => {
                // per-call failure; the loop continues and the model decides
                let error_text = err.to_string();
                tracing::warn!(session_id, tool = %call.name, error = %error_text, "tool failed");
                conversation.set_tool_error(&call.id, &error_text)?;
                send(
                    tx,
                    ChatStreamEvent::ToolOutputError {
                        tool_id: call.id.clone(),
                        error_text: error_text.clone(),
                    },
                )
                .await;
                Ok(ToolOutcome::Result(Message::tool_result(
                    &call.id, error_text, true,
                )))
            }
        }
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.registry
            .names()
            .into_iter()
            .filter_map(|name| self.registry.get(&name))
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.parameters_schema(),
            })
            .collect()
    }
}

enum ToolOutcome {
    /// The tool produced a result (or an error result) to feed back.
    Result(Message),
    /// The run was cancelled while this tool was in flight.
    Cancelled,
}

fn complete(stop_reason: &str) -> ChatStreamEvent {
    ChatStreamEvent::Complete {
        stop_reason: Some(stop_reason.to_string()),
    }
}

fn stop_reason_str(reason: &StopReason) -> String {
    match reason {
        StopReason::EndTurn => "stop".to_string(),
        StopReason::MaxTokens => "length".to_string(),
        StopReason::ToolUse => "tool_calls".to_string(),
        StopReason::Other(other) => other.clone(),
    }
}

// the receiver hanging up just means nobody is watching the stream anymore
async fn send(tx: &mpsc::Sender<ChatStreamEvent>, event: ChatStreamEvent) {
    if tx.send(event).await.is_err() {
        tracing::debug!("stream receiver dropped");
    }
}
