//! CLI Config Command
//!
//! Shows the effective configuration or writes a starter file.

use std::path::Path;

use anyhow::{bail, Context, Result};

use streamchat_config::StreamChatConfig;

use crate::terminal_output;

/// Print the effective config as YAML with secrets masked.
pub fn show(config: &StreamChatConfig, path: &Path) -> Result<()> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    let redacted = streamchat_config::redact(&value);
    terminal_output::print_dim(&format!("# {}", path.display()));
    print!("{}", serde_yaml::to_string(&redacted)?);
    Ok(())
}

/// Write a config file filled with defaults. Refuses to overwrite unless forced.
pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let config = streamchat_config::apply_all_defaults(StreamChatConfig::default());
    streamchat_config::write_config(&config, path).await?;
    terminal_output::print_success(&format!("Wrote {}", path.display()));
    Ok(())
}
