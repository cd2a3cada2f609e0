//! Weatherbit agweather forecast, mapped onto historical records so the
//! dashboard can extend the observed series.

use async_trait::async_trait;
use common::{Coordinates, Error, FeatureVector, HistoricalRecord};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{build_http_client, get_json, HistorySource};

const NAME: &str = "weatherbit";
const AGWEATHER_URL: &str = "https://api.weatherbit.io/v2.0/forecast/agweather";

/// Share of evapotranspiration attributed to land evaporation.
const EVLAND_FRACTION: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct WeatherbitClient {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct AgWeatherResponse {
    #[serde(default)]
    pub data: Vec<AgWeatherDay>,
}

#[derive(Debug, Deserialize)]
pub struct AgWeatherDay {
    pub valid_date: Option<String>,
    pub soilm_0_10cm: Option<f64>,
    pub soilm_10_40cm: Option<f64>,
    pub soilm_40_100cm: Option<f64>,
    pub precip: Option<f64>,
    pub evapotranspiration: Option<f64>,
    pub temp_2m_avg: Option<f64>,
    pub skin_temp_max: Option<f64>,
    pub skin_temp_min: Option<f64>,
    pub dswrf_avg: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub wind_10m_spd_avg: Option<f64>,
    pub specific_humidity: Option<f64>,
    pub pres_avg: Option<f64>,
}

impl WeatherbitClient {
    pub fn new(api_key: String) -> Result<Self, Error> {
        Ok(Self {
            client: build_http_client(NAME)?,
            api_key,
        })
    }

    pub async fn fetch_forecast(&self, coords: Coordinates) -> Result<Vec<HistoricalRecord>, Error> {
        let query = [
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("key", self.api_key.clone()),
        ];

        let resp: AgWeatherResponse = get_json(&self.client, NAME, AGWEATHER_URL, &query).await?;
        let records = map_agweather(&resp);
        info!(
            "Weatherbit {}: {} of {} forecast days usable",
            coords,
            records.len(),
            resp.data.len()
        );
        Ok(records)
    }
}

#[async_trait]
impl HistorySource for WeatherbitClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, coords: Coordinates) -> Result<Vec<HistoricalRecord>, Error> {
        self.fetch_forecast(coords).await
    }
}

/// Map every complete agweather row; rows missing any field are skipped.
pub fn map_agweather(resp: &AgWeatherResponse) -> Vec<HistoricalRecord> {
    resp.data
        .iter()
        .filter_map(|day| {
            let record = map_day(day);
            if record.is_none() {
                debug!("Skipping incomplete agweather row {:?}", day.valid_date);
            }
            record
        })
        .collect()
}

fn map_day(day: &AgWeatherDay) -> Option<HistoricalRecord> {
    let evapotranspiration = day.evapotranspiration?;
    let t2m = day.temp_2m_avg?;

    let values = FeatureVector {
        prectotcorr: day.precip?,
        evptrns: evapotranspiration,
        evland: evapotranspiration * EVLAND_FRACTION,
        gwetroot: day.soilm_40_100cm?,
        gwettop: day.soilm_0_10cm?,
        gwetprof: day.soilm_10_40cm?,
        t2m,
        ts_max: day.skin_temp_max?,
        ts_min: day.skin_temp_min?,
        allsky_sfc_sw_dwn: day.dswrf_avg?,
        rh2m: day.relative_humidity?,
        qv2m: day.specific_humidity?,
        ws10m: day.wind_10m_spd_avg?,
        ps: day.pres_avg?,
        cdd0: t2m.max(0.0),
    };

    if !values.is_complete() {
        return None;
    }

    Some(HistoricalRecord {
        date: day.valid_date.clone()?,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "lat": 9.5612, "lon": 44.0669,
        "data": [
            {
                "valid_date": "2025-06-16",
                "soilm_0_10cm": 0.21, "soilm_10_40cm": 0.26, "soilm_40_100cm": 0.3,
                "precip": 0.4, "evapotranspiration": 5.0,
                "temp_2m_avg": 24.5, "skin_temp_max": 39.1, "skin_temp_min": 16.0,
                "dswrf_avg": 290.0, "relative_humidity": 38.0,
                "wind_10m_spd_avg": 6.3, "specific_humidity": 0.0081, "pres_avg": 850.2
            },
            {
                "valid_date": "2025-06-17",
                "soilm_0_10cm": null, "soilm_10_40cm": 0.25, "soilm_40_100cm": 0.3,
                "precip": 0.0, "evapotranspiration": 5.2,
                "temp_2m_avg": 25.0, "skin_temp_max": 40.0, "skin_temp_min": 16.4,
                "dswrf_avg": 295.0, "relative_humidity": 36.0,
                "wind_10m_spd_avg": 6.0, "specific_humidity": 0.0079, "pres_avg": 850.0
            }
        ]
    }"#;

    #[test]
    fn test_maps_complete_rows_only() {
        let resp: AgWeatherResponse = serde_json::from_str(SAMPLE).unwrap();
        let records = map_agweather(&resp);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.date, "2025-06-16");
        assert_eq!(r.values.gwettop, 0.21);
        assert_eq!(r.values.gwetprof, 0.26);
        assert_eq!(r.values.gwetroot, 0.3);
        assert_eq!(r.values.evptrns, 5.0);
        assert!((r.values.evland - 4.5).abs() < 1e-12);
        assert_eq!(r.values.ts_max, 39.1);
        assert_eq!(r.values.ps, 850.2);
    }

    #[test]
    fn test_cooling_degree_days_floor_at_zero() {
        let raw = SAMPLE.replace("\"temp_2m_avg\": 24.5", "\"temp_2m_avg\": -3.0");
        let resp: AgWeatherResponse = serde_json::from_str(&raw).unwrap();
        let records = map_agweather(&resp);

        assert_eq!(records[0].values.t2m, -3.0);
        assert_eq!(records[0].values.cdd0, 0.0);
    }

    #[test]
    fn test_missing_data_array_yields_nothing() {
        let resp: AgWeatherResponse = serde_json::from_str(r#"{"error": "API key not valid"}"#).unwrap();
        assert!(map_agweather(&resp).is_empty());
    }
}
