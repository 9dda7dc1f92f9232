//! Config validation with field paths in every message.

use crate::schema::StreamChatConfig;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &StreamChatConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_endpoint(config, &mut report);
    validate_request(config, &mut report);
    validate_timeouts(config, &mut report);
    validate_history(config, &mut report);
    report
}

fn validate_endpoint(config: &StreamChatConfig, report: &mut ValidationReport) {
    let Some(endpoint) = &config.endpoint else { return };
    if endpoint.trim().is_empty() {
        report.error("endpoint", "Endpoint cannot be empty");
    } else if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        report.warn("endpoint", "Endpoint is not an http(s) URL");
    }
}

fn validate_request(config: &StreamChatConfig, report: &mut ValidationReport) {
    if config.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
        report.error("model", "Model cannot be empty");
    }
    if let Some(role) = &config.system_role {
        if !role.eq_ignore_ascii_case("developer") && !role.eq_ignore_ascii_case("system") {
            report.error(
                "systemRole",
                format!("Unknown system role '{role}'; expected 'developer' or 'system'"),
            );
        }
    }
    if config.max_completion_tokens == Some(0) {
        report.error("maxCompletionTokens", "maxCompletionTokens must be >= 1");
    }
}

fn validate_timeouts(config: &StreamChatConfig, report: &mut ValidationReport) {
    let Some(timeouts) = &config.timeouts else { return };
    if timeouts.connect_secs == Some(0) {
        report.error("timeouts.connectSecs", "connectSecs must be >= 1");
    }
    if timeouts.read_secs == Some(0) {
        report.error("timeouts.readSecs", "readSecs must be >= 1");
    }
}

fn validate_history(config: &StreamChatConfig, report: &mut ValidationReport) {
    let Some(history) = &config.history else { return };
    if let Some(mode) = &history.mode {
        if !mode.eq_ignore_ascii_case("retained") && !mode.eq_ignore_ascii_case("stateless") {
            report.error(
                "history.mode",
                format!("Unknown history mode '{mode}'; expected 'retained' or 'stateless'"),
            );
        }
    }
    if let Some(max) = history.max_messages {
        if max % 2 == 1 {
            report.warn(
                "history.maxMessages",
                format!("Odd maxMessages {max} is rounded down to {}", max - 1),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{HistoryConfig, TimeoutConfig};

    #[test]
    fn defaults_are_valid() {
        let report = validate(&apply_all_defaults(StreamChatConfig::default()));
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn rejects_empty_endpoint_and_zero_tokens() {
        let config = StreamChatConfig {
            endpoint: Some(" ".into()),
            max_completion_tokens: Some(0),
            timeouts: Some(TimeoutConfig {
                connect_secs: Some(0),
                read_secs: None,
            }),
            ..Default::default()
        };
        let report = validate(&config);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["endpoint", "maxCompletionTokens", "timeouts.connectSecs"]);
    }

    #[test]
    fn rejects_unknown_system_role() {
        let config = StreamChatConfig {
            system_role: Some("assistant".into()),
            ..Default::default()
        };
        let report = validate(&config);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "systemRole");
    }

    #[test]
    fn warns_on_odd_history_and_non_http_endpoint() {
        let config = StreamChatConfig {
            endpoint: Some("localhost:8000".into()),
            history: Some(HistoryConfig {
                mode: Some("sometimes".into()),
                max_messages: Some(5),
                max_tokens: None,
            }),
            ..Default::default()
        };
        let report = validate(&config);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "history.mode");
    }
}
