mod commands;

use clap::{Parser, Subcommand};
use commands::{check, serve};
use tracing::error;
use std::error::Error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "fxserver")]
#[command(author, version, about = "Mock HTTP server backed by JSON fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    async fn run(self) -> Result<(), Box<dyn Error>> {
        match self.command {
            Commands::Check(args) => check::run(args).await,
            Commands::Serve(args) => serve::run(args).await,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config and its fixtures without serving
    Check(commands::check::CheckArgs),

    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter (e.g. FXSERVER_LOG=debug)
    let filter = match EnvFilter::try_from_env("FXSERVER_LOG") {
        Ok(f) => f,
        Err(_) => {
            EnvFilter::new("info")
        }
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}
