mod check_command;
mod send_commands;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    logrelay_channels::{ChatClient, RecordingClient},
    logrelay_config::RelayConfig,
    logrelay_discord::DiscordClient,
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "logrelay", about = "logrelay: forward log entries to Discord channels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./logrelay.toml, then ~/.config/logrelay/).
    #[arg(long, global = true, env = "LOGRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Record sends in memory and print them instead of calling Discord.
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and report problems.
    Check {
        /// Also resolve every routed channel through the Discord API.
        #[arg(long)]
        online: bool,
    },
    /// Show which routes a tag hits and the channels it resolves to.
    Routes {
        tag: String,
    },
    /// Send one log entry.
    Send(send_commands::SendArgs),
    /// Forward every line of stdin as a plain-text entry.
    Pipe {
        #[arg(long, default_value = "")]
        tag: String,
    },
    /// Write the documented default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Explicit `--config` must load; otherwise fall back to discovery.
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RelayConfig> {
    match path {
        Some(path) => {
            let mut config = logrelay_config::load_config(path)
                .with_context(|| format!("loading {}", path.display()))?;
            logrelay_config::apply_env_overrides(&mut config);
            Ok(config)
        },
        None => Ok(logrelay_config::discover_and_load()),
    }
}

/// The chat client for delivering commands, plus the recorder when
/// `--dry-run` is set.
fn make_client(
    config: &RelayConfig,
    dry_run: bool,
) -> anyhow::Result<(Arc<dyn ChatClient>, Option<RecordingClient>)> {
    if dry_run {
        let recorder = RecordingClient::new();
        return Ok((Arc::new(recorder.clone()), Some(recorder)));
    }
    let client = DiscordClient::from_config(&config.discord)
        .context("set discord.token in the config or DISCORD_TOKEN in the environment")?;
    Ok((Arc::new(client), None))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "logrelay starting");

    match &cli.command {
        Commands::Check { online } => {
            check_command::handle_check(cli.config.as_deref(), *online).await
        },
        Commands::Init { force } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(logrelay_config::find_or_default_config_path);
            logrelay_config::write_default_config(&path, *force)?;
            println!("Wrote {}", path.display());
            Ok(())
        },
        Commands::Routes { tag } => {
            let config = load_config(cli.config.as_ref())?;
            send_commands::handle_routes(&config, tag)
        },
        Commands::Send(args) => {
            let config = load_config(cli.config.as_ref())?;
            let (client, recorder) = make_client(&config, cli.dry_run)?;
            let result = send_commands::handle_send(&config, client, args).await;
            if let Some(recorder) = recorder {
                send_commands::print_recorded(&recorder)?;
            }
            result
        },
        Commands::Pipe { tag } => {
            let config = load_config(cli.config.as_ref())?;
            let (client, recorder) = make_client(&config, cli.dry_run)?;
            let result = send_commands::handle_pipe(&config, client, tag).await;
            if let Some(recorder) = recorder {
                send_commands::print_recorded(&recorder)?;
            }
            result
        },
    }
}
