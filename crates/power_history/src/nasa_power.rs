//! NASA POWER daily point client.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use common::{Coordinates, Error, HistoricalRecord, Parameter};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::{build_http_client, get_json, sanitize, HistorySource};

const NAME: &str = "nasa-power";
const DAILY_POINT_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";

/// Longest trailing window accepted, in days.
pub const MAX_HISTORY_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct NasaPowerClient {
    client: reqwest::Client,
    history_days: i64,
}

/// Response envelope; only `properties.parameter` is used.
#[derive(Debug, Deserialize)]
pub struct DailyPointResponse {
    #[serde(default)]
    pub properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub parameter: Map<String, Value>,
}

impl NasaPowerClient {
    pub fn new(history_days: i64) -> Result<Self, Error> {
        if !(1..=MAX_HISTORY_DAYS).contains(&history_days) {
            return Err(Error::Config(format!(
                "history window must be 1..={MAX_HISTORY_DAYS} days, got {history_days}"
            )));
        }
        Ok(Self {
            client: build_http_client(NAME)?,
            history_days,
        })
    }

    /// Fetch and sanitize the trailing window ending today (UTC).
    pub async fn fetch_history(&self, coords: Coordinates) -> Result<Vec<HistoricalRecord>, Error> {
        let (start, end) = window(Utc::now().date_naive(), self.history_days)?;
        let parameters = Parameter::ALL.map(|p| p.as_str()).join(",");

        let query = [
            ("parameters", parameters),
            ("community", "AG".to_string()),
            ("longitude", coords.lon.to_string()),
            ("latitude", coords.lat.to_string()),
            ("start", start),
            ("end", end),
            ("format", "JSON".to_string()),
        ];

        let resp: DailyPointResponse = get_json(&self.client, NAME, DAILY_POINT_URL, &query).await?;
        let raw = resp
            .properties
            .map(|p| p.parameter)
            .ok_or_else(|| Error::History(format!("{NAME} response has no parameter block")))?;

        let records = sanitize(&raw);
        info!("NASA POWER {}: {} usable days", coords, records.len());
        Ok(records)
    }
}

#[async_trait]
impl HistorySource for NasaPowerClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, coords: Coordinates) -> Result<Vec<HistoricalRecord>, Error> {
        self.fetch_history(coords).await
    }
}

/// Compact `(start, end)` dates covering `days` days up to `today`.
pub fn window(today: NaiveDate, days: i64) -> Result<(String, String), Error> {
    let start = Duration::try_days(days)
        .and_then(|span| today.checked_sub_signed(span))
        .ok_or_else(|| Error::History(format!("history window of {days} days is out of range")))?;
    Ok((
        start.format("%Y%m%d").to_string(),
        today.format("%Y%m%d").to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_spans_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(
            window(today, 21).unwrap(),
            ("20250212".to_string(), "20250305".to_string())
        );
    }

    #[test]
    fn test_oversized_window_is_an_error_not_a_panic() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert!(matches!(window(today, 100_000_000), Err(Error::History(_))));
        assert!(window(today, i64::MAX).is_err());
    }

    #[test]
    fn test_client_rejects_window_outside_bounds() {
        assert!(NasaPowerClient::new(0).is_err());
        assert!(NasaPowerClient::new(MAX_HISTORY_DAYS + 1).is_err());
        assert!(NasaPowerClient::new(100_000_000).is_err());
        assert!(NasaPowerClient::new(MAX_HISTORY_DAYS).is_ok());
    }

    #[test]
    fn test_response_parameter_block_feeds_sanitizer() {
        let raw = r#"{
            "type": "Feature",
            "properties": {"parameter": {
                "GWETTOP": {"20250610": 0.31, "20250611": -999.0},
                "GWETROOT": {"20250610": 0.42, "20250611": 0.41},
                "GWETPROF": {"20250610": 0.45, "20250611": 0.45},
                "PRECTOTCORR": {"20250610": 0.0, "20250611": 1.2},
                "EVPTRNS": {"20250610": 0.8, "20250611": 0.7},
                "EVLAND": {"20250610": 1.1, "20250611": 1.0},
                "T2M": {"20250610": 27.4, "20250611": 26.9},
                "TS_MAX": {"20250610": 38.2, "20250611": 37.0},
                "TS_MIN": {"20250610": 19.5, "20250611": 19.9},
                "ALLSKY_SFC_SW_DWN": {"20250610": 24.7, "20250611": 22.1},
                "RH2M": {"20250610": 41.3, "20250611": 45.0},
                "QV2M": {"20250610": 9.8, "20250611": 10.2},
                "WS10M": {"20250610": 5.6, "20250611": 6.1},
                "PS": {"20250610": 84.9, "20250611": 84.8},
                "CDD0": {"20250610": 27.4, "20250611": 26.9}
            }}
        }"#;
        let resp: DailyPointResponse = serde_json::from_str(raw).unwrap();
        let records = sanitize(&resp.properties.unwrap().parameter);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2025-06-10");
        assert_eq!(records[0].values.gwettop, 0.31);
        assert_eq!(records[0].values.ps, 84.9);
    }
}
