//! `streamchat-config`: configuration loading for the streamchat client.
//!
//! Provides:
//! - Typed config schema (endpoint, model, token, timeouts, history, stream filter, logging)
//! - YAML read/write with atomic replace
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with field paths
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::redact;
pub use schema::StreamChatConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution, apply defaults, and validate a config file.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<StreamChatConfig> {
    let raw_config = load_config(path).await?;
    prepare(raw_config)
}

/// The in-memory half of [`load_and_prepare`].
pub fn prepare(raw_config: StreamChatConfig) -> Result<StreamChatConfig> {
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;

    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: StreamChatConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_and_prepare_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "model: llama\nhistory:\n  maxMessages: 4\n").unwrap();

        let config = load_and_prepare(&path).await.unwrap();
        assert_eq!(config.model.as_deref(), Some("llama"));
        assert_eq!(config.history_policy().max_messages, 4);
        assert_eq!(config.to_chat_config().max_completion_tokens, 40);
    }

    #[test]
    fn prepare_rejects_invalid_config() {
        let config = StreamChatConfig {
            max_completion_tokens: Some(0),
            ..Default::default()
        };
        let err = prepare(config).unwrap_err();
        assert!(err.to_string().contains("maxCompletionTokens"));
    }
}
