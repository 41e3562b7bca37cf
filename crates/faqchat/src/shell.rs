// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `faqchat shell` REPL.
//!
//! Reads lines with rustyline, runs each through a [`ChatSession`], and
//! prints the reply. Tool invocations are echoed dimmed.

use std::sync::Arc;

use colored::Colorize;
use faqchat_agent::{load_system_prompt, ChatSession, Conversation};
use faqchat_core::types::ToolCall;
use faqchat_core::FaqchatError;
use faqchat_skill::ToolOutput;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::bootstrap::App;

/// Longest tool output preview shown in the shell.
const PREVIEW_CHARS: usize = 120;

pub async fn run_shell(app: &App) -> Result<(), FaqchatError> {
    let system_prompt = load_system_prompt(&app.config.agent).await?;
    let mut conversation = Conversation::with_system_prompt(system_prompt);
    let mut session = ChatSession::new(
        app.provider.clone(),
        Arc::new(app.tool_registry()),
        app.config.ollama.chat_model.clone(),
        &app.config.agent,
    )
    .with_tool_observer(Box::new(print_tool_call));

    let mut rl = DefaultEditor::new()
        .map_err(|e| FaqchatError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} is ready", app.config.agent.name).bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{} ", "You:".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match session.process_turn(&mut conversation, trimmed).await {
                    Ok(reply) => println!("{} {reply}\n", "Assistant:".bold().cyan()),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            // Ctrl+C or Ctrl+D
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

fn print_tool_call(call: &ToolCall, output: &ToolOutput) {
    println!("{}", tool_line(call, output).dimmed());
}

fn tool_line(call: &ToolCall, output: &ToolOutput) -> String {
    let status = if output.is_error { "failed" } else { "ok" };
    format!(
        "  [{}({}) {status}] {}",
        call.name,
        call.arguments,
        preview(&output.content)
    )
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}...")
}
