//! Forecast provider adapters.
//!
//! Each adapter fetches one upstream forecast for a coordinate and maps it
//! into a `PartialVector`. Adapters report failures as `Err`; callers that
//! need the never-fail contract go through [`fetch_partial`], which turns
//! any error or timeout into an empty partial vector.

pub mod derived;
pub mod open_meteo;
pub mod visual_crossing;
pub mod weatherapi;

use std::time::Duration;

use async_trait::async_trait;
use common::{Coordinates, Error, PartialVector};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use open_meteo::OpenMeteoClient;
pub use visual_crossing::VisualCrossingClient;
pub use weatherapi::WeatherApiClient;

const USER_AGENT: &str = "drought-watch/0.1 (forecast aggregation)";

/// Index of "tomorrow" in the providers' daily series.
pub const FORECAST_DAY_INDEX: usize = 1;

/// One upstream source of forecast parameters.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Stable, human-readable source name used in logs and provenance.
    fn name(&self) -> &str;

    /// Fetch and map the target-day forecast for `coords`.
    async fn fetch(&self, coords: Coordinates) -> Result<PartialVector, Error>;
}

/// Run a provider under a time budget. A timeout is reported the same way
/// as any other provider failure.
pub async fn try_fetch(
    provider: &dyn ForecastProvider,
    coords: Coordinates,
    budget: Duration,
) -> Result<PartialVector, Error> {
    match tokio::time::timeout(budget, provider.fetch(coords)).await {
        Ok(result) => result,
        Err(_) => Err(Error::provider(
            provider.name(),
            format!("timed out after {}ms", budget.as_millis()),
        )),
    }
}

/// Run a provider and degrade any failure to an empty partial vector.
pub async fn fetch_partial(
    provider: &dyn ForecastProvider,
    coords: Coordinates,
    budget: Duration,
) -> PartialVector {
    match try_fetch(provider, coords, budget).await {
        Ok(partial) => {
            debug!(
                "{} supplied {} parameters for {}",
                provider.name(),
                partial.len(),
                coords
            );
            partial
        }
        Err(e) => {
            warn!("{} unavailable for {}: {}", provider.name(), coords, e);
            PartialVector::new()
        }
    }
}

/// Build the pooled HTTP client shared by an adapter's requests.
pub(crate) fn build_http_client(provider: &str) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(4)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| Error::Config(format!("failed to build {provider} HTTP client: {e}")))
}

/// GET `url` with `query` and decode a JSON body, mapping every failure to
/// `ProviderUnavailable`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, Error> {
    debug!("Fetching {} forecast: {}", provider, url);

    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| Error::provider(provider, format!("HTTP error: {e}")))?;

    let status = resp.status().as_u16();
    if !(200..300).contains(&status) {
        let body = resp.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(500).collect();
        return Err(Error::provider(
            provider,
            format!("returned {}: {}", status, excerpt),
        ));
    }

    resp.json()
        .await
        .map_err(|e| Error::provider(provider, format!("JSON parse error: {e}")))
}
