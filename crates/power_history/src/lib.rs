//! Historical daily series for the dashboard.
//!
//! NASA POWER supplies the observed window; Weatherbit's agweather forecast
//! optionally extends it a few days into the future.

pub mod nasa_power;
pub mod sanitize;
pub mod weatherbit;

use std::time::Duration;

use async_trait::async_trait;
use common::{Coordinates, Error, HistoricalRecord};
use serde::de::DeserializeOwned;
use tracing::debug;

pub use nasa_power::{NasaPowerClient, MAX_HISTORY_DAYS};
pub use sanitize::sanitize;
pub use weatherbit::WeatherbitClient;

const USER_AGENT: &str = "drought-watch/0.1 (history)";

/// A source of cleaned daily records for a location.
#[async_trait]
pub trait HistorySource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, coords: Coordinates) -> Result<Vec<HistoricalRecord>, Error>;
}

pub(crate) fn build_http_client(source: &str) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| Error::Config(format!("failed to build {source} HTTP client: {e}")))
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    source: &str,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, Error> {
    debug!("Fetching {} history: {}", source, url);

    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| Error::Http(format!("{source}: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(500).collect();
        return Err(Error::History(format!(
            "{source} returned {}: {}",
            status.as_u16(),
            excerpt
        )));
    }

    resp.json()
        .await
        .map_err(|e| Error::History(format!("{source} JSON parse error: {e}")))
}
