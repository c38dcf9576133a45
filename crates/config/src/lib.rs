//! Configuration loading, validation, and env substitution.
//!
//! Config files: `logrelay.toml`, `logrelay.yaml`, or `logrelay.json`
//! Searched in `./` then `~/.config/logrelay/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! file before parsing.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod template;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_config_file,
        find_or_default_config_path, load_config, write_default_config,
    },
    schema::{DiscordConfig, RelayConfig, RelayMode, RelaySettings, RouteConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
