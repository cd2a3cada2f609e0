//! WeatherAPI.com client (secondary source).
//!
//! Supplies precipitation and temperatures for tomorrow, plus current
//! humidity, wind and pressure used as a proxy for the next day.

use async_trait::async_trait;
use common::{Coordinates, Error, Parameter, PartialVector};
use serde::Deserialize;
use tracing::debug;

use crate::{build_http_client, get_json, ForecastProvider, FORECAST_DAY_INDEX};

const NAME: &str = "weatherapi";
const FORECAST_URL: &str = "https://api.weatherapi.com/v1/forecast.json";
const FORECAST_DAYS: u32 = 7;

/// WeatherAPI.com client.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: reqwest::Client,
    api_key: String,
}

/// Response from `forecast.json`.
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current: Option<Current>,
    #[serde(default)]
    pub forecast: Option<Forecast>,
}

#[derive(Debug, Deserialize)]
pub struct Current {
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_kph: Option<f64>,
    #[serde(default)]
    pub pressure_mb: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastDay {
    pub day: Day,
}

#[derive(Debug, Deserialize)]
pub struct Day {
    #[serde(default)]
    pub totalprecip_mm: Option<f64>,
    #[serde(default)]
    pub avgtemp_c: Option<f64>,
    #[serde(default)]
    pub maxtemp_c: Option<f64>,
    #[serde(default)]
    pub mintemp_c: Option<f64>,
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Result<Self, Error> {
        Ok(Self {
            client: build_http_client(NAME)?,
            api_key,
        })
    }

    /// Fetch the raw multi-day forecast.
    pub async fn fetch_forecast(&self, coords: Coordinates) -> Result<ForecastResponse, Error> {
        let query = [
            ("key", self.api_key.clone()),
            ("q", format!("{},{}", coords.lat, coords.lon)),
            ("days", FORECAST_DAYS.to_string()),
            ("aqi", "no".to_string()),
            ("alerts", "no".to_string()),
        ];

        get_json(&self.client, NAME, FORECAST_URL, &query).await
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, coords: Coordinates) -> Result<PartialVector, Error> {
        let resp = self.fetch_forecast(coords).await?;
        let partial = map_forecast(&resp)?;

        debug!(
            "WeatherAPI {}: precip={:?}mm t2m={:?}°C",
            coords,
            partial.get(Parameter::Prectotcorr),
            partial.get(Parameter::T2m)
        );

        Ok(partial)
    }
}

/// Map a forecast response onto the canonical parameters.
pub fn map_forecast(resp: &ForecastResponse) -> Result<PartialVector, Error> {
    let day = resp
        .forecast
        .as_ref()
        .and_then(|f| f.forecastday.get(FORECAST_DAY_INDEX))
        .map(|fd| &fd.day)
        .ok_or_else(|| Error::provider(NAME, "no forecast for tomorrow"))?;

    let mut partial = PartialVector::new();
    partial.insert_opt(Parameter::Prectotcorr, day.totalprecip_mm);
    partial.insert_opt(Parameter::T2m, day.avgtemp_c);
    partial.insert_opt(Parameter::TsMax, day.maxtemp_c);
    partial.insert_opt(Parameter::TsMin, day.mintemp_c);

    if let Some(current) = &resp.current {
        partial.insert_opt(Parameter::Rh2m, current.humidity);
        partial.insert_opt(Parameter::Ws10m, current.wind_kph.map(|kph| kph / 3.6));
        partial.insert_opt(Parameter::Ps, current.pressure_mb);
    }

    Ok(partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> &'static str {
        r#"{
            "location": {"name": "Hargeisa"},
            "current": {"humidity": 48, "wind_kph": 18.0, "pressure_mb": 1011.0},
            "forecast": {
                "forecastday": [
                    {"date": "2025-06-14", "day": {"totalprecip_mm": 3.1, "avgtemp_c": 22.0, "maxtemp_c": 28.0, "mintemp_c": 16.0}},
                    {"date": "2025-06-15", "day": {"totalprecip_mm": 0.4, "avgtemp_c": 23.5, "maxtemp_c": 29.1, "mintemp_c": 17.2}}
                ]
            }
        }"#
    }

    #[test]
    fn test_maps_tomorrow_and_current_proxies() {
        let resp: ForecastResponse =
            serde_json::from_str(sample_response()).expect("response should deserialize");
        let partial = map_forecast(&resp).expect("mapping should succeed");

        assert_eq!(partial.get(Parameter::Prectotcorr), Some(0.4));
        assert_eq!(partial.get(Parameter::T2m), Some(23.5));
        assert_eq!(partial.get(Parameter::TsMax), Some(29.1));
        assert_eq!(partial.get(Parameter::TsMin), Some(17.2));
        assert_eq!(partial.get(Parameter::Rh2m), Some(48.0));
        assert!((partial.get(Parameter::Ws10m).unwrap() - 5.0).abs() < 1e-12);
        assert_eq!(partial.get(Parameter::Ps), Some(1011.0));
        assert_eq!(partial.len(), 7);
    }

    #[test]
    fn test_key_is_sent_over_tls() {
        assert!(FORECAST_URL.starts_with("https://"));
    }

    #[test]
    fn test_single_day_forecast_is_an_error() {
        let raw = r#"{"forecast": {"forecastday": [{"day": {"avgtemp_c": 20.0}}]}}"#;
        let resp: ForecastResponse = serde_json::from_str(raw).unwrap();
        assert!(map_forecast(&resp).is_err());
    }

    #[test]
    fn test_missing_current_block_still_maps_day_fields() {
        let raw = r#"{"forecast": {"forecastday": [
            {"day": {}},
            {"day": {"avgtemp_c": 19.0}}
        ]}}"#;
        let resp: ForecastResponse = serde_json::from_str(raw).unwrap();
        let partial = map_forecast(&resp).unwrap();

        assert_eq!(partial.get(Parameter::T2m), Some(19.0));
        assert_eq!(partial.len(), 1);
    }
}
