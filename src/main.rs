//! drought-watch server.
//!
//! Single-binary Tokio application that:
//! 1. Reconciles tomorrow's forecast from Open-Meteo, WeatherAPI and Visual Crossing
//! 2. Scores the reconciled vector with the drought model
//! 3. Serves the cleaned NASA POWER history for the dashboard

use clap::Parser;
use common::Coordinates;
use tracing::{error, info};

use drought_watch::config::load_config;
use drought_watch::{build_reconciler, build_state, create_router};

/// Drought prediction API
#[derive(Parser)]
#[command(name = "drought-watch", about = "Drought prediction API")]
struct Cli {
    /// Reconcile one forecast, log it, and exit without serving.
    #[arg(long)]
    dry_run: bool,

    /// Latitude for --dry-run (defaults to the configured location).
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude for --dry-run (defaults to the configured location).
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "drought_watch=info,weather_providers=info,reconciler=info,power_history=info,scoring=info,tower_http=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let cfg = match load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("drought-watch v{} starting", env!("CARGO_PKG_VERSION"));

    if cli.dry_run {
        let coords = match Coordinates::new(
            cli.lat.unwrap_or(cfg.default_location.lat),
            cli.lon.unwrap_or(cfg.default_location.lon),
        ) {
            Ok(c) => c,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        };

        let reconciler = match build_reconciler(&cfg) {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to build forecast sources: {}", e);
                std::process::exit(1);
            }
        };

        match reconciler.reconcile(coords).await {
            Ok(result) => {
                let rendered = serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|e| format!("<unserializable: {e}>"));
                info!("Dry run for {}:\n{}", coords, rendered);
            }
            Err(e) => {
                error!("Dry run failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let state = match build_state(&cfg) {
        Ok(s) => s,
        Err(e) => {
            error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Listening on {}", addr);
    if let Err(e) = axum::serve(listener, create_router(state)).await {
        error!("Server exited: {}", e);
        std::process::exit(1);
    }
}
