//! Configuration validation.
//!
//! Checks a parsed [`RelayConfig`] for problems that would make the relay
//! silently drop or misroute entries.

use std::{collections::HashMap, path::Path};

use crate::{loader, schema::RelayConfig};

/// Levels accepted by `relay.min_level`.
pub const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "credentials", "routes", "relay"
    pub category: &'static str,
    /// Dotted path, e.g. "routes[1].channels"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<std::path::PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Load and validate the file at `path`. Parse failures become a single
/// `syntax` error instead of an `Err`.
pub fn validate_file(path: &Path) -> (Option<RelayConfig>, ValidationResult) {
    match loader::load_config(path) {
        Ok(mut config) => {
            loader::apply_env_overrides(&mut config);
            let mut result = validate(&config);
            result.config_path = Some(path.to_path_buf());
            (Some(config), result)
        },
        Err(e) => (None, ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                e.to_string(),
            )],
            config_path: Some(path.to_path_buf()),
        }),
    }
}

/// Validate an already-parsed configuration.
#[must_use]
pub fn validate(config: &RelayConfig) -> ValidationResult {
    let mut diagnostics = Vec::new();

    match loader::token_state(config) {
        "missing" => diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "credentials",
            "discord.token",
            "no bot token configured; nothing will be sent",
        )),
        "unresolved" => diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "credentials",
            "discord.token",
            "token contains an unresolved ${...} placeholder",
        )),
        _ => {},
    }
    if config.discord.send_timeout_ms == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "credentials",
            "discord.send_timeout_ms",
            "send timeout must be greater than zero",
        ));
    }

    check_relay(config, &mut diagnostics);
    check_routes(config, &mut diagnostics);

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_relay(config: &RelayConfig, diagnostics: &mut Vec<Diagnostic>) {
    let level = config.relay.min_level.to_ascii_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "relay",
            "relay.min_level",
            format!(
                "unknown level {:?} (expected one of: {})",
                config.relay.min_level,
                LEVELS.join(", ")
            ),
        ));
    }
    if config.relay.queue_capacity == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "relay",
            "relay.queue_capacity",
            "queue capacity must be greater than zero",
        ));
    }
    if config.relay.tag_field.trim().is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Info,
            "relay",
            "relay.tag_field",
            "empty tag field; every entry is tagged by its level",
        ));
    }
}

fn check_routes(config: &RelayConfig, diagnostics: &mut Vec<Diagnostic>) {
    if config.routes.is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "routes",
            "routes",
            "no routes configured; nothing will be sent",
        ));
        return;
    }

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (i, route) in config.routes.iter().enumerate() {
        if let Some(&prev) = first_seen.get(route.tag.as_str()) {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "routes",
                format!("routes[{i}].tag"),
                format!("duplicate tag {:?} (first declared at routes[{prev}])", route.tag),
            ));
        } else {
            first_seen.insert(route.tag.as_str(), i);
        }
        if route.channels.is_empty() {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "routes",
                format!("routes[{i}].channels"),
                "route has no channels",
            ));
        }
        for (j, channel) in route.channels.iter().enumerate() {
            if channel.get() == 0 {
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "routes",
                    format!("routes[{i}].channels[{j}]"),
                    "channel id 0 is not a valid Discord snowflake",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {logrelay_common::ChannelId, secrecy::Secret};

    use super::*;
    use crate::schema::RouteConfig;

    fn route(tag: &str, ids: &[u64]) -> RouteConfig {
        RouteConfig {
            tag: tag.into(),
            channels: ids.iter().copied().map(ChannelId::new).collect(),
        }
    }

    fn valid_config() -> RelayConfig {
        let mut cfg = RelayConfig::default();
        cfg.discord.token = Secret::new("token".into());
        cfg.routes = vec![route("error", &[1]), route("", &[2])];
        cfg
    }

    fn categories(result: &ValidationResult) -> Vec<(&str, Severity)> {
        result
            .diagnostics
            .iter()
            .map(|d| (d.path.as_str(), d.severity))
            .collect()
    }

    #[test]
    fn valid_config_is_clean() {
        let result = validate(&valid_config());
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn missing_token_and_routes_warn() {
        let result = validate(&RelayConfig::default());
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 2);
    }

    #[test]
    fn duplicate_tag_is_error() {
        let mut cfg = valid_config();
        cfg.routes.push(route("error", &[3]));
        let result = validate(&cfg);
        assert!(result.has_errors());
        assert!(categories(&result).contains(&("routes[2].tag", Severity::Error)));
    }

    #[test]
    fn zero_channel_and_empty_list() {
        let mut cfg = valid_config();
        cfg.routes.push(route("audit", &[]));
        cfg.routes.push(route("debug", &[5, 0]));
        let result = validate(&cfg);
        let found = categories(&result);
        assert!(found.contains(&("routes[2].channels", Severity::Warning)));
        assert!(found.contains(&("routes[3].channels[1]", Severity::Error)));
    }

    #[test]
    fn unknown_level_and_zero_capacity() {
        let mut cfg = valid_config();
        cfg.relay.min_level = "loud".into();
        cfg.relay.queue_capacity = 0;
        let result = validate(&cfg);
        assert_eq!(result.count(Severity::Error), 2);
    }

    #[test]
    fn level_is_case_insensitive() {
        let mut cfg = valid_config();
        cfg.relay.min_level = "ERROR".into();
        assert!(!validate(&cfg).has_errors());
    }

    #[test]
    fn unparseable_file_reports_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logrelay.toml");
        std::fs::write(&path, "[[routes]\n").unwrap();
        let (config, result) = validate_file(&path);
        assert!(config.is_none());
        assert_eq!(result.diagnostics[0].category, "syntax");
        assert_eq!(result.config_path.as_deref(), Some(path.as_path()));
    }
}
