//! `logrelay check`: config validation, credentials, and route overview.
//!
//! Prints a report with `[ok]`, `[warn]`, `[fail]`, `[skip]`, or `[info]`
//! per item and exits non-zero when anything failed.

use std::{collections::BTreeSet, path::Path, time::Duration};

use {
    anyhow::Result,
    logrelay_channels::ChatClient,
    logrelay_common::ChannelId,
    logrelay_config::{
        RelayConfig, Severity, ValidationResult,
        validate::{validate, validate_file},
    },
    logrelay_discord::DiscordClient,
};

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Skip,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Skip => DIM,
            Self::Info => CYAN,
        }
    }
}

impl From<Severity> for Status {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Fail,
            Severity::Warning => Self::Warn,
            Severity::Info => Self::Info,
        }
    }
}

struct Section {
    title: String,
    items: Vec<(Status, String)>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push((status, message.into()));
    }

    fn count(&self, status: Status) -> usize {
        self.items.iter().filter(|(s, _)| *s == status).count()
    }
}

fn print_report(sections: &[Section]) -> (usize, usize) {
    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for (status, message) in &section.items {
            eprintln!("  [{}{}{RESET}]  {message}", status.color(), status.label());
        }
        eprintln!();
    }
    let errors = sections.iter().map(|s| s.count(Status::Fail)).sum();
    let warnings = sections.iter().map(|s| s.count(Status::Warn)).sum();
    (errors, warnings)
}

// ── Entry point ─────────────────────────────────────────────────────────────

pub async fn handle_check(explicit: Option<&Path>, online: bool) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(logrelay_config::find_config_file);

    let (config, result) = match &path {
        Some(path) => validate_file(path),
        None => {
            let config = logrelay_config::discover_and_load();
            let result = validate(&config);
            (Some(config), result)
        },
    };

    let mut sections = vec![config_section(path.as_deref(), &result)];
    if let Some(config) = &config {
        sections.push(discord_section(config, online).await);
        sections.push(routes_section(config));
    }

    let (errors, warnings) = print_report(&sections);
    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ── Sections ────────────────────────────────────────────────────────────────

fn config_section(path: Option<&Path>, result: &ValidationResult) -> Section {
    let label = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "no config file, using defaults".into());
    let mut section = Section::new(format!("Config ({label})"));

    for d in &result.diagnostics {
        let message = if d.path.is_empty() {
            format!("{}: {}", d.category, d.message)
        } else {
            format!("{}: {}: {}", d.category, d.path, d.message)
        };
        section.push(d.severity.into(), message);
    }
    if !result.has_errors() && result.count(Severity::Warning) == 0 {
        section.push(Status::Ok, "no issues found");
    }
    section
}

async fn discord_section(config: &RelayConfig, online: bool) -> Section {
    let mut section = Section::new("Discord");

    let client = match DiscordClient::from_config(&config.discord) {
        Ok(client) => {
            section.push(Status::Ok, "bot token configured");
            client
        },
        Err(e) => {
            section.push(Status::Fail, e.to_string());
            return section;
        },
    };

    if !online {
        section.push(Status::Skip, "channel reachability (pass --online to check)");
        return section;
    }

    let timeout = Duration::from_millis(config.discord.send_timeout_ms);
    for id in unique_channels(config) {
        match tokio::time::timeout(timeout, client.get_channel(id)).await {
            Ok(Ok(_)) => section.push(Status::Ok, format!("channel {id} reachable")),
            Ok(Err(e)) => section.push(Status::Fail, format!("channel {id}: {e}")),
            Err(_) => section.push(
                Status::Fail,
                format!("channel {id}: timed out after {timeout:?}"),
            ),
        }
    }
    section
}

fn routes_section(config: &RelayConfig) -> Section {
    let mut section = Section::new("Routes");
    if config.routes.is_empty() {
        section.push(Status::Warn, "no routes; nothing will be delivered");
    }
    for route in &config.routes {
        let tag = if route.tag.is_empty() {
            "* (wildcard)"
        } else {
            route.tag.as_str()
        };
        let ids: Vec<String> = route.channels.iter().map(ToString::to_string).collect();
        section.push(Status::Info, format!("{tag} -> [{}]", ids.join(", ")));
    }
    section.push(
        Status::Info,
        format!("mode {:?}, min level {}", config.relay.mode, config.relay.min_level),
    );
    section
}

fn unique_channels(config: &RelayConfig) -> BTreeSet<ChannelId> {
    config
        .routes
        .iter()
        .flat_map(|r| r.channels.iter().copied())
        .collect()
}
