//! CLI Ask Command
//!
//! Sends one stateless request and streams the reply to stdout.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use streamchat_agent::{ChatRunner, Conversation, HistoryMode};
use streamchat_config::StreamChatConfig;
use streamchat_core::ChatMessage;
use streamchat_provider::OpenAiCompatProvider;

use crate::terminal_output::{self, StreamWriter};

pub struct AskArgs {
    pub message: String,
    pub max_tokens: Option<u32>,
    pub system: Option<String>,
    pub show_request: bool,
}

pub async fn run(config: &StreamChatConfig, args: AskArgs) -> Result<()> {
    let mut chat_config = config.to_chat_config();
    if let Some(max_tokens) = args.max_tokens {
        chat_config = chat_config.with_max_completion_tokens(max_tokens);
    }
    let provider = Arc::new(OpenAiCompatProvider::new(chat_config)?);

    let mut conversation = Conversation::new(HistoryMode::Stateless);
    if let Some(instruction) = crate::config::instruction(config, args.system) {
        conversation = conversation.with_instruction(instruction);
    }

    if args.show_request {
        let mut messages = conversation.history();
        messages.push(ChatMessage::user(args.message.as_str()));
        let preview = provider.request_preview(&messages);
        terminal_output::print_dim(&serde_json::to_string_pretty(&preview)?);
    }

    let runner = ChatRunner::new(provider, config.history_policy());
    let mut writer = StreamWriter::stdout();
    let result = runner
        .send(&mut conversation, &args.message, |fragment| writer.fragment(fragment))
        .await;
    writer.finish();

    let reply = result?;
    info!(fragments = reply.fragments, chars = reply.text.chars().count(), "Ask completed");
    Ok(())
}
