//! HTTP surface: `/predict`, `/data` and `/health`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use common::{Coordinates, Error};
use power_history::HistorySource;
use reconciler::Reconciler;
use scoring::ScoringBackend;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared, read-only service dependencies.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    pub scorer: Arc<dyn ScoringBackend>,
    pub history: Arc<dyn HistorySource>,
    /// Optional forecast appended to the historical series.
    pub forecast_extension: Option<Arc<dyn HistorySource>>,
    pub default_location: Coordinates,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/predict", get(predict))
        .route("/data", get(data))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler error rendered as `{ ok: false, message }`.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = if self.0.is_client_error() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            error!("Request failed: {}", self.0);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong!".to_string(),
            )
        };
        (status, Json(json!({ "ok": false, "message": message }))).into_response()
    }
}

/// Absent parameters fall back to the default location; present ones must
/// be finite numbers in range.
pub fn resolve_coordinates(
    params: &HashMap<String, String>,
    default: Coordinates,
) -> Result<Coordinates, Error> {
    let lat = parse_component(params, "lat", default.lat)?;
    let lon = parse_component(params, "lon", default.lon)?;
    Coordinates::new(lat, lon)
}

fn parse_component(
    params: &HashMap<String, String>,
    key: &str,
    default: f64,
) -> Result<f64, Error> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidCoordinates(format!("{key} is not a number: {raw:?}"))),
    }
}

async fn predict(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let coords = resolve_coordinates(&params, state.default_location)?;
    let reconciliation = state.reconciler.reconcile(coords).await?;

    let scorer = state.scorer.clone();
    let vector = reconciliation.vector;
    let prediction = tokio::task::spawn_blocking(move || scorer.score(&vector))
        .await
        .map_err(|e| Error::PredictionInvocation(format!("scoring task failed: {e}")))??;

    info!(
        "Prediction for {}: {} via {}",
        coords,
        prediction,
        state.scorer.name()
    );

    Ok(Json(json!({
        "ok": true,
        "prediction": prediction,
        "location": { "lat": coords.lat, "lon": coords.lon },
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "diagnostics": {
            "defaulted_fields": reconciliation.defaulted_fields(),
            "all_sources_exhausted": reconciliation.all_sources_exhausted(),
        },
    })))
}

async fn data(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let coords = resolve_coordinates(&params, state.default_location)?;

    let mut records = state.history.fetch(coords).await?;

    if let Some(extension) = &state.forecast_extension {
        match extension.fetch(coords).await {
            Ok(forecast) => records.extend(forecast),
            Err(e) => warn!("{} forecast skipped for {}: {}", extension.name(), coords, e),
        }
    }

    Ok(Json(json!({ "ok": true, "data": records })))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default() -> Coordinates {
        Coordinates::new(9.5612, 44.0669).unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_absent_coordinates_use_default() {
        assert_eq!(resolve_coordinates(&params(&[]), default()).unwrap(), default());

        let only_lat = resolve_coordinates(&params(&[("lat", "1.5")]), default()).unwrap();
        assert_eq!(only_lat.lat, 1.5);
        assert_eq!(only_lat.lon, 44.0669);
    }

    #[test]
    fn test_bad_coordinates_are_client_errors() {
        for bad in [
            &[("lat", "abc")][..],
            &[("lon", "")][..],
            &[("lat", "NaN")][..],
            &[("lat", "91")][..],
            &[("lon", "-180.5")][..],
        ] {
            let err = resolve_coordinates(&params(bad), default()).unwrap_err();
            assert!(err.is_client_error(), "{bad:?} -> {err}");
        }
    }
}
