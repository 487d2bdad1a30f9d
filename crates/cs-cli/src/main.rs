//! confsync -- edit plugin configuration files from a `/config` comment.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cs_core::config::Config;
use cs_telemetry::logging::{self, LogFormat};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "confsync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one comment event and open pull requests for the edits.
    Sync {
        /// JSON file holding `{eventName, payload, command?}`.
        #[arg(long)]
        event: PathBuf,
        /// TOML settings file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Emit logs as JSON lines.
        #[arg(long)]
        json_logs: bool,
    },

    /// Validate a local configuration file against the plugin schema.
    Validate {
        /// YAML file to check.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            event,
            config,
            json_logs,
        } => {
            let config = Config::load_or_default(config.as_deref())
                .context("failed to load settings")?;
            logging::init(
                "confsync",
                &config.general.log_level,
                LogFormat::from_json_flag(json_logs || config.general.json_logs),
            );
            commands::sync::run(config, &event).await?;
        }
        Commands::Validate { file } => {
            logging::init("confsync", "warn", LogFormat::Pretty);
            commands::validate::run(&file)?;
        }
    }

    Ok(())
}
