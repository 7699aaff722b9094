//! Binary entry point that parses the command line, sets up logging, and
//! runs the assistant lights daemon.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use assistant_lights::app::{self, Options};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "assistant_lights=info";

/// Drives status LEDs and power commands from a voice-assistant session.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to store and read OAuth2 credentials
    #[arg(long, value_name = "OAUTH2_CREDENTIALS_FILE")]
    credentials: Option<PathBuf>,

    /// JSON runtime configuration (pins, tick interval, commands, bridge)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Registered device model forwarded to the assistant bridge
    #[arg(long, value_name = "ID")]
    device_model_id: Option<String>,
}

#[tokio::main]
/// Loads `.env`, installs the stderr logger, and runs the daemon.
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    app::run_daemon(Options {
        credentials: args.credentials,
        config: args.config,
        device_model_id: args.device_model_id,
    })
    .await
}
