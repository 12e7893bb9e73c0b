//! NewsDesk AI gateway server binary

use clap::Parser;
use newsdesk_gateway::config::Config;
use newsdesk_gateway::server::HttpServer;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "newsdesk-gateway", about = "AI orchestration gateway for the NewsDesk CMS")]
struct Args {
    /// Path to the gateway configuration file
    #[arg(long, default_value = "config/gateway.yaml")]
    config: PathBuf,

    /// Override the listen address from the config file
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut config = if args.config.exists() {
        match Config::from_file(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        warn!(path = %args.config.display(), "config file not found, using defaults");
        Config::default()
    };
    config.apply_env_overrides();
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    let server = match HttpServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match server.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
