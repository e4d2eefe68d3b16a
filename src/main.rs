use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use welcome_bot::{bootstrap, config::Config};

/// Greets new members of Matrix rooms in a private conversation
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "welcome_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Could not load configuration");
            return ExitCode::FAILURE;
        }
    };

    match bootstrap::run(config, shutdown_signal()).await {
        Ok(()) => {
            info!("Welcome bot stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Welcome bot stopped");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
