mod server;
mod templates;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::info;

use rtmpauth_core::{logging, Config};

use server::RtmpAuthServer;

#[derive(Parser, Debug)]
#[command(name = "rtmpauthd")]
#[command(about = "RTMP publish/play authentication and stream notifications", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, env = "RTMPAUTH_DEBUG")]
    debug: bool,

    /// Config file path (yaml or toml)
    #[arg(long, env = "RTMPAUTH_CONFIG_PATH")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the auth server (default)
    Serve,
    /// Print an annotated environment file
    PrintEnv,
    /// Print a systemd unit file
    PrintSystemd,
}

/// Resolve the config file and load it, environment variables on top
///
/// Search order:
/// 1. --config / RTMPAUTH_CONFIG_PATH
/// 2. ./config.yaml
/// 3. /etc/rtmpauthd/config.yaml
/// 4. Environment variables only
fn load_config(explicit: Option<&str>) -> Result<Config> {
    let config_path = explicit
        .map(str::to_string)
        .or_else(|| {
            ["config.yaml", "/etc/rtmpauthd/config.yaml"]
                .into_iter()
                .find(|p| Path::new(p).exists())
                .map(str::to_string)
        });

    let config = match config_path {
        Some(path) => {
            if !Path::new(&path).exists() {
                return Err(anyhow::anyhow!("config file {path} does not exist"));
            }
            eprintln!("Loading config from {path}");
            Config::from_file(&path)?
        }
        None => {
            eprintln!("No config file found, using environment variables");
            Config::from_env()?
        }
    };

    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        ));
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command.unwrap_or(Command::Serve) {
        Command::PrintEnv => {
            println!("{}", templates::env_template());
            return Ok(());
        }
        Command::PrintSystemd => {
            println!("{}", templates::SYSTEMD_UNIT);
            return Ok(());
        }
        Command::Serve => {}
    }

    // 1. Load configuration
    let mut config = load_config(args.config.as_deref())?;
    if args.debug {
        config.logging.level = "debug".to_string();
    }

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("rtmpauthd starting...");
    info!("HTTP address: {}", config.http_address());
    info!(
        twitch = config.twitch.enabled,
        webhook = config.webhook.enabled,
        poll_interval_secs = config.twitch.poll_interval().as_secs(),
        "Integrations"
    );

    // 3. Build services and serve until a shutdown signal
    let server = RtmpAuthServer::build(config).await?;
    server.run().await
}
