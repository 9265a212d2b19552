//! Concierge CLI: the main entry point.
//!
//! Commands:
//! - `ask`    Send one request, or converse interactively from stdin
//! - `config` Print the effective configuration

use clap::{Parser, Subcommand};
use concierge_config::{AppConfig, LogFormat};
use concierge_core::MemberTier;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "concierge",
    about = "Concierge: request fulfilment agent for members",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the concierge to fulfil a request
    Ask {
        /// Member identifier
        #[arg(long, env = "CONCIERGE_MEMBER_ID", default_value = "guest")]
        member_id: String,

        /// Member's full name
        #[arg(long, env = "CONCIERGE_MEMBER_NAME", default_value = "Guest")]
        name: String,

        /// Membership tier: standard, premium or founding
        #[arg(long, default_value = "standard")]
        tier: MemberTier,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Print the config file path instead
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    init_tracing(cli.verbose, config.logging.format);
    tracing::debug!(
        max_retries = config.agent.max_retries,
        format = ?config.logging.format,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Ask {
            member_id,
            name,
            tier,
            message,
            json,
        } => {
            let member = commands::ask::MemberArgs {
                member_id,
                name,
                tier,
            };
            commands::ask::run(&config, member, message, json).await?
        }
        Commands::Config { path } => {
            if path {
                commands::config_cmd::path();
            } else {
                commands::config_cmd::show(&config);
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so `--json` output stays machine-readable.
fn init_tracing(verbose: bool, format: LogFormat) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
