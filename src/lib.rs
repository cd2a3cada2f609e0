//! drought-watch: reconciled next-day weather features and drought scoring
//! over HTTP.

pub mod api;
pub mod config;

use std::sync::Arc;
use std::time::Duration;

use common::config::AppConfig;
use common::{Coordinates, Error};
use power_history::{HistorySource, NasaPowerClient, WeatherbitClient};
use reconciler::{Reconciler, ReconcilerOptions};
use scoring::{ScoringBackend, SubprocessBackend};
use tracing::info;
use weather_providers::{ForecastProvider, OpenMeteoClient, VisualCrossingClient, WeatherApiClient};

pub use api::{create_router, AppState};

/// Build the reconciler from configuration. Secondary sources are only
/// registered when their key is set; Open-Meteo needs none.
pub fn build_reconciler(cfg: &AppConfig) -> Result<Reconciler, Error> {
    let primary: Arc<dyn ForecastProvider> = Arc::new(OpenMeteoClient::new()?);

    let mut secondaries: Vec<Arc<dyn ForecastProvider>> = Vec::new();
    if !cfg.providers.weatherapi_key.trim().is_empty() {
        secondaries.push(Arc::new(WeatherApiClient::new(
            cfg.providers.weatherapi_key.clone(),
        )?));
    }
    if !cfg.providers.visual_crossing_key.trim().is_empty() {
        secondaries.push(Arc::new(VisualCrossingClient::new(
            cfg.providers.visual_crossing_key.clone(),
        )?));
    }

    let reconciler = Reconciler::new(
        primary,
        secondaries,
        ReconcilerOptions {
            provider_timeout: Duration::from_secs(cfg.providers.timeout_secs),
            primary_required: cfg.providers.primary_required,
        },
    );
    info!("Forecast sources: {:?}", reconciler.provider_names());
    Ok(reconciler)
}

/// Wire every service dependency from configuration.
pub fn build_state(cfg: &AppConfig) -> Result<AppState, Error> {
    let default_location = Coordinates::new(cfg.default_location.lat, cfg.default_location.lon)?;

    let scorer: Arc<dyn ScoringBackend> = Arc::new(SubprocessBackend::new(
        cfg.scoring.interpreter.clone(),
        cfg.scoring.script.clone(),
    ));

    let history: Arc<dyn HistorySource> = Arc::new(NasaPowerClient::new(cfg.history.days)?);
    let forecast_extension: Option<Arc<dyn HistorySource>> =
        if cfg.history.weatherbit_api_key.trim().is_empty() {
            None
        } else {
            Some(Arc::new(WeatherbitClient::new(
                cfg.history.weatherbit_api_key.clone(),
            )?))
        };

    Ok(AppState {
        reconciler: Arc::new(build_reconciler(cfg)?),
        scorer,
        history,
        forecast_extension,
        default_location,
    })
}
