//! Open-Meteo forecast client (primary source, no key required).
//!
//! Daily soil-moisture, precipitation, evapotranspiration and radiation
//! come straight from the daily block; temperature, humidity, pressure and
//! wind are averaged over tomorrow's hourly samples, and the derived
//! parameters (CDD0, QV2M) are computed from the same window.

use std::ops::Range;

use async_trait::async_trait;
use common::{Coordinates, Error, Parameter, PartialVector};
use serde::Deserialize;
use tracing::debug;

use crate::derived::{cooling_degree_days, mean, specific_humidity};
use crate::{build_http_client, get_json, ForecastProvider, FORECAST_DAY_INDEX};

const NAME: &str = "open-meteo";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const FORECAST_DAYS: u32 = 16;

/// Tomorrow's hours in the hourly series (local time, `timezone=auto`).
const HOURLY_WINDOW: Range<usize> = 24..48;

const HOURLY_VARS: &str = "temperature_2m,relative_humidity_2m,surface_pressure,wind_speed_10m";
const DAILY_VARS: &[&str] = &[
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "et0_fao_evapotranspiration",
    "shortwave_radiation_sum",
    "soil_moisture_0_to_1cm",
    "soil_moisture_1_to_3cm",
    "soil_moisture_3_to_9cm",
    "soil_moisture_9_to_27cm",
    "soil_moisture_27_to_81cm",
];

/// Open-Meteo client.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
}

/// Response from `/v1/forecast`.
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub hourly: Option<HourlySeries>,
    #[serde(default)]
    pub daily: Option<DailySeries>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub surface_pressure: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub et0_fao_evapotranspiration: Vec<Option<f64>>,
    #[serde(default)]
    pub shortwave_radiation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_moisture_0_to_1cm: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_moisture_9_to_27cm: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_moisture_27_to_81cm: Vec<Option<f64>>,
}

impl OpenMeteoClient {
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            client: build_http_client(NAME)?,
        })
    }

    /// Fetch the raw 16-day forecast.
    pub async fn fetch_forecast(&self, coords: Coordinates) -> Result<ForecastResponse, Error> {
        let query = [
            ("latitude", coords.lat.to_string()),
            ("longitude", coords.lon.to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
            ("hourly", HOURLY_VARS.to_string()),
            ("daily", DAILY_VARS.join(",")),
            ("models", "gfs_seamless".to_string()),
            ("timezone", "auto".to_string()),
            ("wind_speed_unit", "ms".to_string()),
        ];

        get_json(&self.client, NAME, FORECAST_URL, &query).await
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, coords: Coordinates) -> Result<PartialVector, Error> {
        let resp = self.fetch_forecast(coords).await?;
        let partial = map_forecast(&resp)?;

        debug!(
            "Open-Meteo {}: precip={:?}mm gwetroot={:?} t2m={:?}°C evptrns={:?}mm radiation={:?}MJ/m²",
            coords,
            partial.get(Parameter::Prectotcorr),
            partial.get(Parameter::Gwetroot),
            partial.get(Parameter::T2m),
            partial.get(Parameter::Evptrns),
            partial.get(Parameter::AllskySfcSwDwn),
        );

        Ok(partial)
    }
}

fn at(series: &[Option<f64>], index: usize) -> Option<f64> {
    series.get(index).copied().flatten()
}

/// Non-null samples of `series` within `range`.
fn window(series: &[Option<f64>], range: Range<usize>) -> Vec<f64> {
    let end = range.end.min(series.len());
    let start = range.start.min(end);
    series[start..end].iter().filter_map(|v| *v).collect()
}

/// Map a forecast response onto the canonical parameters.
pub fn map_forecast(resp: &ForecastResponse) -> Result<PartialVector, Error> {
    let (Some(hourly), Some(daily)) = (&resp.hourly, &resp.daily) else {
        return Err(Error::provider(NAME, "response is missing hourly or daily data"));
    };

    let day = FORECAST_DAY_INDEX;
    let temps = window(&hourly.temperature_2m, HOURLY_WINDOW);
    let avg_temp = mean(&temps);
    let avg_rh = mean(&window(&hourly.relative_humidity_2m, HOURLY_WINDOW));
    let avg_pressure = mean(&window(&hourly.surface_pressure, HOURLY_WINDOW));
    let avg_wind = mean(&window(&hourly.wind_speed_10m, HOURLY_WINDOW));

    let mut partial = PartialVector::new();

    partial.insert_opt(Parameter::Gwetroot, at(&daily.soil_moisture_27_to_81cm, day));
    partial.insert_opt(Parameter::Gwettop, at(&daily.soil_moisture_0_to_1cm, day));
    partial.insert_opt(Parameter::Gwetprof, at(&daily.soil_moisture_9_to_27cm, day));

    partial.insert_opt(Parameter::Prectotcorr, at(&daily.precipitation_sum, day));
    let et0 = at(&daily.et0_fao_evapotranspiration, day);
    partial.insert_opt(Parameter::Evptrns, et0);
    partial.insert_opt(Parameter::Evland, et0);
    partial.insert_opt(
        Parameter::AllskySfcSwDwn,
        at(&daily.shortwave_radiation_sum, day),
    );

    partial.insert_opt(Parameter::T2m, avg_temp);
    partial.insert_opt(
        Parameter::TsMax,
        at(&daily.temperature_2m_max, day).or(avg_temp),
    );
    partial.insert_opt(
        Parameter::TsMin,
        at(&daily.temperature_2m_min, day).or(avg_temp),
    );
    partial.insert_opt(Parameter::Rh2m, avg_rh);
    partial.insert_opt(Parameter::Ws10m, avg_wind);
    partial.insert_opt(Parameter::Ps, avg_pressure);

    if !temps.is_empty() {
        partial.insert(Parameter::Cdd0, cooling_degree_days(&temps));
    }
    if let (Some(t), Some(rh), Some(p)) = (avg_temp, avg_rh, avg_pressure) {
        partial.insert(Parameter::Qv2m, specific_humidity(t, rh, p));
    }

    Ok(partial)
}
