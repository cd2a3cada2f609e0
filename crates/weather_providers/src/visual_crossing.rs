//! Visual Crossing timeline client (tertiary source, mainly for solar
//! radiation).

use async_trait::async_trait;
use common::{Coordinates, Error, Parameter, PartialVector};
use serde::Deserialize;
use tracing::debug;

use crate::{build_http_client, get_json, ForecastProvider, FORECAST_DAY_INDEX};

const NAME: &str = "visual-crossing";
const TIMELINE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

/// Scale applied to the UV index when no radiation figure is reported.
const UV_TO_RADIATION: f64 = 2.5;

/// Visual Crossing client.
#[derive(Debug, Clone)]
pub struct VisualCrossingClient {
    client: reqwest::Client,
    api_key: String,
}

/// Response from the timeline endpoint with `include=days`.
#[derive(Debug, Deserialize)]
pub struct TimelineResponse {
    #[serde(default)]
    pub days: Vec<TimelineDay>,
}

#[derive(Debug, Deserialize)]
pub struct TimelineDay {
    #[serde(default)]
    pub solarradiation: Option<f64>,
    #[serde(default)]
    pub uvindex: Option<f64>,
    #[serde(default)]
    pub precip: Option<f64>,
    #[serde(default)]
    pub tempmax: Option<f64>,
    #[serde(default)]
    pub tempmin: Option<f64>,
    #[serde(default)]
    pub temp: Option<f64>,
}

impl VisualCrossingClient {
    pub fn new(api_key: String) -> Result<Self, Error> {
        Ok(Self {
            client: build_http_client(NAME)?,
            api_key,
        })
    }

    /// Fetch the raw daily timeline.
    pub async fn fetch_timeline(&self, coords: Coordinates) -> Result<TimelineResponse, Error> {
        let url = format!("{}/{},{}", TIMELINE_URL, coords.lat, coords.lon);
        let query = [
            ("key", self.api_key.clone()),
            ("unitGroup", "metric".to_string()),
            ("include", "days".to_string()),
        ];

        get_json(&self.client, NAME, &url, &query).await
    }
}

#[async_trait]
impl ForecastProvider for VisualCrossingClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, coords: Coordinates) -> Result<PartialVector, Error> {
        let resp = self.fetch_timeline(coords).await?;
        let partial = map_timeline(&resp)?;

        debug!(
            "Visual Crossing {}: radiation={:?}",
            coords,
            partial.get(Parameter::AllskySfcSwDwn)
        );

        Ok(partial)
    }
}

/// Map a timeline response onto the canonical parameters.
pub fn map_timeline(resp: &TimelineResponse) -> Result<PartialVector, Error> {
    let day = resp
        .days
        .get(FORECAST_DAY_INDEX)
        .ok_or_else(|| Error::provider(NAME, "no forecast for tomorrow"))?;

    // A zero reading is treated as "not reported" and estimated from UV.
    let radiation = day
        .solarradiation
        .filter(|r| *r != 0.0)
        .or_else(|| day.uvindex.map(|uv| uv * UV_TO_RADIATION));

    let mut partial = PartialVector::new();
    partial.insert_opt(Parameter::AllskySfcSwDwn, radiation);
    partial.insert_opt(Parameter::Prectotcorr, day.precip);
    partial.insert_opt(Parameter::TsMax, day.tempmax);
    partial.insert_opt(Parameter::TsMin, day.tempmin);
    partial.insert_opt(Parameter::T2m, day.temp);

    Ok(partial)
}
