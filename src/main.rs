mod config;
mod map;
mod provider;
mod tracker;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::Config;
use crate::provider::HttpClient;
use crate::tracker::{Controller, Poller, Session, SharedSession};
use crate::web::AppState;

#[derive(Parser)]
#[command(name = "iss-tracker")]
#[command(about = "Live International Space Station tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the ISS position and serve the dashboard
    Serve {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Poll the ISS position and log every update
    Watch {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Validate a config file
    CheckConfig { config: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()).await,
        Commands::Watch { config } => watch(config.as_deref()).await,
        Commands::CheckConfig { config } => check_config(&config),
    }
}

fn check_config(path: &str) -> ExitCode {
    match Config::from_file(path) {
        Ok(config) => {
            println!("Config is valid");
            println!("  position API: {}", config.api.base_url);
            println!("  geocoder:     {}", config.api.geocode_url);
            println!(
                "  poll every {} with a {}-point trail",
                humantime::format_duration(config.tracking.poll_interval),
                config.tracking.trail_capacity
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Config error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn start_poller(config: &Config) -> Result<(Poller, SharedSession), ExitCode> {
    let client = match HttpClient::new(&config.api) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            return Err(ExitCode::FAILURE);
        }
    };

    let session = SharedSession::new(Session::new(
        config.tracking.trail_capacity,
        !config.tracking.start_paused,
    ));
    let controller = Arc::new(Controller::new(client.clone(), client, session.clone()));
    let poller = Poller::start(controller, config.tracking.poll_interval);
    Ok((poller, session))
}

fn load_config(path: Option<&str>) -> Result<Config, ExitCode> {
    Config::load(path).map_err(|e| {
        eprintln!("Config error: {}", e);
        ExitCode::FAILURE
    })
}

async fn serve(config_path: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let (poller, session) = match start_poller(&config) {
        Ok(started) => started,
        Err(code) => return code,
    };

    let state = AppState {
        session,
        refresh_secs: config.tracking.poll_interval.as_secs().max(1),
    };
    let result = web::run_server(&config.web.bind, state, shutdown_signal()).await;
    poller.stop().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn watch(config_path: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let (poller, _session) = match start_poller(&config) {
        Ok(started) => started,
        Err(code) => return code,
    };

    shutdown_signal().await;
    poller.stop().await;
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
