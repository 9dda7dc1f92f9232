//! CLI Chat Command
//!
//! Line-oriented interactive loop on stdin. Each line is one turn; lines
//! starting with `/` are local commands.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use streamchat_agent::{ChatRunner, Conversation, HistoryMode};
use streamchat_config::StreamChatConfig;
use streamchat_provider::OpenAiCompatProvider;

use crate::terminal_output::{self, StreamWriter};

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Message(&'a str),
    Clear,
    History,
    Help,
    Exit,
    Unknown(&'a str),
    Empty,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "/exit" | "/quit" => Input::Exit,
        "/clear" => Input::Clear,
        "/history" => Input::History,
        "/help" => Input::Help,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        text => Input::Message(text),
    }
}

pub async fn run(config: &StreamChatConfig, stateless: bool) -> Result<()> {
    let mode = if stateless || config.is_stateless() {
        HistoryMode::Stateless
    } else {
        HistoryMode::Retained
    };
    let provider = Arc::new(OpenAiCompatProvider::new(config.to_chat_config())?);
    let runner = ChatRunner::new(provider, config.history_policy());

    let mut conversation = Conversation::new(mode);
    if let Some(instruction) = crate::config::instruction(config, None) {
        conversation = conversation.with_instruction(instruction);
    }
    info!(conversation = %conversation.id, ?mode, "Chat session started");

    terminal_output::print_dim("Type a message, /help for commands, /exit to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", terminal_output::prompt_label("you>"));
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Exit => break,
            Input::Clear => {
                conversation.clear();
                terminal_output::print_success("History cleared");
            }
            Input::History => print_history(&conversation),
            Input::Help => {
                terminal_output::print_dim("/clear    forget the conversation so far");
                terminal_output::print_dim("/history  show retained messages");
                terminal_output::print_dim("/exit     leave");
            }
            Input::Unknown(cmd) => terminal_output::print_error(&format!("Unknown command: {cmd}")),
            Input::Message(text) => {
                debug!(input = %streamchat_logging::redact_sensitive_data(text), "User message");
                let mut writer = StreamWriter::stdout();
                let result = runner
                    .send(&mut conversation, text, |fragment| writer.fragment(fragment))
                    .await;
                writer.finish();
                match result {
                    Ok(reply) => debug!(fragments = reply.fragments, "Turn completed"),
                    // History is untouched on failure; the user can retry.
                    Err(err) => terminal_output::print_error(&err.to_string()),
                }
            }
        }
    }

    info!(turns = conversation.turns(), "Chat session ended");
    Ok(())
}

fn print_history(conversation: &Conversation) {
    if conversation.transcript.is_empty() {
        terminal_output::print_dim("(no history)");
        return;
    }
    for message in &conversation.transcript {
        terminal_output::print_dim(&format!("[{}] {}", message.role, message.content));
    }
}
