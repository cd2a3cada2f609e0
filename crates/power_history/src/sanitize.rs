//! Cleaning of NASA POWER per-parameter daily series.

use chrono::NaiveDate;
use common::{FeatureVector, HistoricalRecord, Parameter, MISSING_SENTINEL};
use serde_json::{Map, Value};
use tracing::debug;

/// Parameter whose dates decide which days exist.
const ANCHOR: Parameter = Parameter::Gwettop;

/// Turn `{PARAM: {YYYYMMDD: value}}` into one record per usable day.
///
/// Days are taken from the anchor series in input order. A day is dropped
/// when any parameter is missing, non-numeric or equal to the -999
/// sentinel, or when its key is not a valid compact date.
pub fn sanitize(raw: &Map<String, Value>) -> Vec<HistoricalRecord> {
    let Some(anchor) = raw.get(ANCHOR.as_str()).and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut records = Vec::with_capacity(anchor.len());
    let mut dropped = 0usize;

    for key in anchor.keys() {
        let Some(date) = iso_date(key) else {
            debug!("Skipping malformed date key {:?}", key);
            dropped += 1;
            continue;
        };

        let mut complete = true;
        let values = FeatureVector::from_fn(|param| match value_at(raw, param, key) {
            Some(v) => v,
            None => {
                complete = false;
                f64::NAN
            }
        });

        if complete {
            records.push(HistoricalRecord { date, values });
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        debug!("Dropped {} of {} days with missing values", dropped, anchor.len());
    }

    records
}

fn value_at(raw: &Map<String, Value>, param: Parameter, date: &str) -> Option<f64> {
    raw.get(param.as_str())?
        .get(date)?
        .as_f64()
        .filter(|v| v.is_finite() && *v != MISSING_SENTINEL)
}

/// `20250615` → `2025-06-15`.
fn iso_date(compact: &str) -> Option<String> {
    NaiveDate::parse_from_str(compact, "%Y%m%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Raw series where every parameter has `value` on each of `dates`.
    fn uniform(dates: &[&str], value: f64) -> Map<String, Value> {
        let mut raw = Map::new();
        for param in Parameter::ALL {
            let series: Map<String, Value> =
                dates.iter().map(|d| (d.to_string(), json!(value))).collect();
            raw.insert(param.as_str().to_string(), Value::Object(series));
        }
        raw
    }

    fn set(raw: &mut Map<String, Value>, param: Parameter, date: &str, value: Value) {
        raw[param.as_str()]
            .as_object_mut()
            .unwrap()
            .insert(date.to_string(), value);
    }

    #[test]
    fn test_sentinel_day_is_dropped() {
        let mut raw = uniform(&["20250101", "20250102", "20250103"], 0.5);
        set(&mut raw, Parameter::Gwettop, "20250101", json!(-999.0));

        let dates: Vec<String> = sanitize(&raw).into_iter().map(|r| r.date).collect();
        assert_eq!(dates, vec!["2025-01-02", "2025-01-03"]);
    }

    #[test]
    fn test_sentinel_in_any_parameter_drops_the_day() {
        let mut raw = uniform(&["20250101", "20250102"], 0.5);
        set(&mut raw, Parameter::Ps, "20250102", json!(-999));

        let records = sanitize(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2025-01-01");
    }

    #[test]
    fn test_values_carried_through_with_iso_date() {
        let mut raw = uniform(&["20250615"], 0.0);
        for (i, param) in Parameter::ALL.iter().enumerate() {
            set(&mut raw, *param, "20250615", json!(i as f64 + 0.25));
        }

        let records = sanitize(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2025-06-15");
        for (i, param) in Parameter::ALL.iter().enumerate() {
            assert_eq!(records[0].values.get(*param), i as f64 + 0.25);
        }
    }

    #[test]
    fn test_input_order_is_preserved() {
        let raw = uniform(&["20250303", "20250301", "20250302"], 1.0);
        let dates: Vec<String> = sanitize(&raw).into_iter().map(|r| r.date).collect();
        assert_eq!(dates, vec!["2025-03-03", "2025-03-01", "2025-03-02"]);
    }

    #[test]
    fn test_missing_value_or_bad_key_drops_the_day() {
        let mut raw = uniform(&["20250101", "2025-01-02", "20250103"], 1.0);
        raw[Parameter::Rh2m.as_str()]
            .as_object_mut()
            .unwrap()
            .remove("20250103");

        let dates: Vec<String> = sanitize(&raw).into_iter().map(|r| r.date).collect();
        assert_eq!(dates, vec!["2025-01-01"]);
    }

    #[test]
    fn test_without_anchor_series_yields_nothing() {
        let mut raw = uniform(&["20250101"], 1.0);
        raw.remove(Parameter::Gwettop.as_str());
        assert!(sanitize(&raw).is_empty());
    }
}
