//! Terminal chat client for the assistant backend.
//!
//! Streams one turn at a time, prompting on stdin when a tool call needs
//! operator approval.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use oncall_desk::{
    ApprovalDecision, AppConfig, Assistant, ChatRequest, ChatService, ChatSession,
};
use oncall_desk_core::streaming::ChatStreamEvent;
use oncall_desk_core::Message;

struct CliArgs {
    assistant: Assistant,
    provider: String,
    model_id: String,
}

fn parse_args() -> Result<CliArgs> {
    let mut assistant = Assistant::Onboarding;
    let mut provider = None;
    let mut model_id = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--assistant" => {
                let value = args.next().context("--assistant needs a value")?;
                assistant = match value.as_str() {
                    "onboarding" => Assistant::Onboarding,
                    "on-call" => Assistant::OnCall,
                    other => anyhow::bail!("unknown assistant: {}", other),
                };
            }
            "--provider" => provider = Some(args.next().context("--provider needs a value")?),
            "--model" => model_id = Some(args.next().context("--model needs a value")?),
            "--help" | "-h" => {
                println!(
                    "usage: oncall-desk [--assistant onboarding|on-call] [--provider openai|google] [--model MODEL_ID]"
                );
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }

    let default = oncall_desk::default_model();
    Ok(CliArgs {
        assistant,
        provider: provider.unwrap_or_else(|| default.provider.as_str().to_string()),
        model_id: model_id.unwrap_or_else(|| default.id.to_string()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oncall_desk=info")),
        )
        .init();

    let args = parse_args()?;
    let config = AppConfig::from_env();
    let service = ChatService::new(config);
    let mut session = ChatSession::new();

    println!(
        "oncall-desk ({:?} assistant, {} / {})",
        args.assistant, args.provider, args.model_id
    );
    println!("commands: /status /events /reset /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        match line.as_str() {
            "" => continue,
            "/quit" => break,
            "/reset" => {
                session.reset().await;
                println!("session reset");
                continue;
            }
            "/status" => {
                println!("status: {}", session.status());
                continue;
            }
            "/events" => {
                for event in session.events() {
                    println!("{}", serde_json::to_string(&event)?);
                }
                continue;
            }
            _ => {}
        }

        let mut messages = session.conversation().messages().to_vec();
        messages.push(Message::user(line));

        let request = ChatRequest {
            messages,
            provider: args.provider.clone(),
            model_id: args.model_id.clone(),
        };

        let run = match service.stream(
            args.assistant,
            request,
            session.id(),
            session.approvals(),
            session.cancel_token(),
        ) {
            Ok(run) => run,
            Err(err) => {
                eprintln!("error ({}): {}", err.status_code(), err);
                continue;
            }
        };

        let conversation = consume_stream(run, &session, &mut lines).await?;
        if let Some(conversation) = conversation {
            session.set_conversation(conversation);
        }
        println!("\nstatus: {}", session.status());
    }

    Ok(())
}

/// Drain the event stream, answering approval prompts from stdin.
async fn consume_stream(
    mut run: oncall_desk::ChatRun,
    session: &ChatSession,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Option<oncall_desk_core::Conversation>> {
    while let Some(event) = run.events.recv().await {
        match event {
            ChatStreamEvent::TextDelta { content } => {
                print!("{}", content);
                flush_stdout();
            }
            ChatStreamEvent::ToolInputStart { tool_name, .. } => {
                println!("\n[tool] {} ...", tool_name)
            }
            ChatStreamEvent::ToolInputAvailable { tool_name, input, .. } => {
                println!("[tool] {} {}", tool_name, input)
            }
            ChatStreamEvent::ApprovalRequested {
                tool_name,
                approval_id,
                input,
                ..
            } => {
                println!("\n[approval] {} wants to run with {}", tool_name, input);
                print!("approve? [y/N] (append a reason after n): ");
                flush_stdout();
                let answer = lines.next_line().await?.unwrap_or_default();
                let answer = answer.trim();
                let decision = if answer.eq_ignore_ascii_case("y") {
                    ApprovalDecision::approved()
                } else {
                    let reason = answer
                        .strip_prefix('n')
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .unwrap_or("Denied by on-call operator");
                    ApprovalDecision::denied(reason)
                };
                if let Err(err) = session.approvals().resolve(&approval_id, decision).await {
                    tracing::warn!(approval_id, %err, "approval resolution failed");
                }
            }
            ChatStreamEvent::ApprovalResponded { approved, .. } => {
                println!("[approval] {}", if approved { "approved" } else { "denied" })
            }
            ChatStreamEvent::ToolOutputAvailable { output, .. } => {
                println!("[tool] -> {}", output)
            }
            ChatStreamEvent::ToolOutputError { error_text, .. } => {
                println!("[tool] error: {}", error_text)
            }
            ChatStreamEvent::Usage { input_tokens, output_tokens } => {
                tracing::debug!(input_tokens, output_tokens, "usage");
            }
            ChatStreamEvent::Error { message, .. } => eprintln!("\nstream error: {}", message),
            ChatStreamEvent::Complete { stop_reason } => {
                tracing::debug!(?stop_reason, "turn complete");
            }
        }
    }

    match run.handle.await? {
        Ok(conversation) => Ok(Some(conversation)),
        Err(err) => {
            eprintln!("turn failed: {}", err);
            Ok(None)
        }
    }
}

fn print_prompt() {
    print!("\n> ");
    flush_stdout();
}

fn flush_stdout() {
    use std::io::Write;
    let _ = std::io::stdout().flush();
}
