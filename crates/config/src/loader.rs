use std::path::{Path, PathBuf};

use {
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::RelayConfig,
    template::default_config_template,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "logrelay.toml",
    "logrelay.yaml",
    "logrelay.yml",
    "logrelay.json",
];

/// Environment variables consulted for the bot token when the config has none.
const TOKEN_ENV_VARS: &[&str] = &["LOGRELAY_DISCORD_TOKEN", "DISCORD_TOKEN"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<RelayConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./logrelay.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/logrelay/logrelay.{toml,yaml,yml,json}` (user-global)
///
/// Returns `RelayConfig::default()` if no config file is found or it fails
/// to parse. Env overrides are applied in both cases.
pub fn discover_and_load() -> RelayConfig {
    let mut config = if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                RelayConfig::default()
            },
        }
    } else {
        debug!("no config file found, using defaults");
        RelayConfig::default()
    };
    apply_env_overrides(&mut config);
    config
}

/// Fill the bot token from the environment when the file leaves it empty.
pub fn apply_env_overrides(config: &mut RelayConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut RelayConfig, lookup: impl Fn(&str) -> Option<String>) {
    if config.discord.has_token() {
        return;
    }
    if let Some(token) = TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|v| !v.trim().is_empty())
    {
        config.discord.token = Secret::new(token);
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/logrelay/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "logrelay").map(|d| d.config_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logrelay.toml")
}

/// Write the documented default template to `path`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Message(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, default_config_template())?;
    debug!(path = %path.display(), "wrote default config");
    Ok(())
}

fn parse_config(raw: &str, path: &Path) -> Result<RelayConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat(ext.to_string())),
    }
}

/// Token presence without exposing the value, for diagnostics.
pub(crate) fn token_state(config: &RelayConfig) -> &'static str {
    let token = config.discord.token.expose_secret();
    if token.trim().is_empty() {
        "missing"
    } else if token.contains("${") {
        "unresolved"
    } else {
        "set"
    }
}

#[cfg(test)]
mod tests {
    use {logrelay_common::ChannelId, secrecy::ExposeSecret};

    use super::*;

    #[test]
    fn loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logrelay.toml");
        std::fs::write(
            &path,
            "[discord]\ntoken = \"t\"\n\n[[routes]]\ntag = \"err\"\nchannels = [9]\n",
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.discord.token.expose_secret(), "t");
        assert_eq!(cfg.routes[0].channels, vec![ChannelId::new(9)]);
    }

    #[test]
    fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("logrelay.yaml");
        std::fs::write(&yaml, "routes:\n  - tag: \"\"\n    channels: [1, 2]\n").unwrap();
        let cfg = load_config(&yaml).unwrap();
        assert_eq!(cfg.routes[0].tag, "");
        assert_eq!(cfg.routes[0].channels.len(), 2);

        let json = dir.path().join("logrelay.json");
        std::fs::write(&json, r#"{"relay": {"mode": "plain"}}"#).unwrap();
        let cfg = load_config(&json).unwrap();
        assert!(cfg.relay.mode.plain());
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logrelay.ini");
        std::fs::write(&path, "").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ext) if ext == "ini"));
    }

    #[test]
    fn missing_file_has_path_context() {
        let err = load_config(Path::new("/nonexistent/logrelay.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/logrelay.toml"));
    }

    #[test]
    fn env_override_fills_empty_token_only() {
        let lookup = |name: &str| (name == "DISCORD_TOKEN").then(|| "from-env".to_string());

        let mut cfg = RelayConfig::default();
        apply_env_overrides_with(&mut cfg, lookup);
        assert_eq!(cfg.discord.token.expose_secret(), "from-env");

        let mut cfg = RelayConfig::default();
        cfg.discord.token = Secret::new("from-file".into());
        apply_env_overrides_with(&mut cfg, lookup);
        assert_eq!(cfg.discord.token.expose_secret(), "from-file");
    }

    #[test]
    fn default_template_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logrelay.toml");
        write_default_config(&path, false).unwrap();
        assert!(load_config(&path).is_ok());
        assert!(write_default_config(&path, false).is_err());
        assert!(write_default_config(&path, true).is_ok());
    }
}
