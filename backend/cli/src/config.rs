use std::path::PathBuf;

use anyhow::Result;
use streamchat_agent::PromptBuilder;
use streamchat_config::StreamChatConfig;
use streamchat_core::ChatMessage;

/// Command-line and environment overrides layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub log_level: Option<String>,
}

impl Overrides {
    pub fn config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| streamchat_config::config_file_path(&streamchat_config::config_dir()))
    }

    /// Apply flags, then fall back to `STREAMCHAT_TOKEN` when the file sets
    /// no token.
    pub fn apply(&self, mut config: StreamChatConfig) -> StreamChatConfig {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.get_or_insert_with(Default::default).level = Some(level.clone());
        }
        if config.token.as_deref().map_or(true, str::is_empty) {
            config.token = std::env::var("STREAMCHAT_TOKEN").ok().filter(|t| !t.is_empty());
        }
        config
    }
}

/// Load the config file, apply overrides, then defaults and validation.
pub async fn load(overrides: &Overrides) -> Result<StreamChatConfig> {
    let raw = streamchat_config::load_config(&overrides.config_path()).await?;
    streamchat_config::prepare(overrides.apply(raw))
}

/// Instruction message sent ahead of every request. `text` replaces the
/// configured system prompt; `None` when the prompt ends up blank.
pub fn instruction(config: &StreamChatConfig, text: Option<String>) -> Option<ChatMessage> {
    let text = text.or_else(|| config.system_prompt.clone()).unwrap_or_default();
    let builder = PromptBuilder::new(text);
    if config.uses_system_role() {
        builder.as_system().build()
    } else {
        builder.build()
    }
}
