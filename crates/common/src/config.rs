//! Service configuration types.

use serde::{Deserialize, Serialize};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Location used when a request omits its coordinates.
    #[serde(default)]
    pub default_location: LocationConfig,

    /// Forecast provider settings.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Scoring backend settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Historical data settings.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// A named coordinate pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub lat: f64,
    pub lon: f64,
}

/// Forecast provider keys and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// WeatherAPI.com key (secondary source; disabled when empty).
    #[serde(default)]
    pub weatherapi_key: String,

    /// Visual Crossing key (tertiary source; disabled when empty).
    #[serde(default)]
    pub visual_crossing_key: String,

    /// Per-provider request budget, in seconds.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,

    /// Abort reconciliation when the primary source fails instead of
    /// degrading to secondaries and defaults.
    #[serde(default)]
    pub primary_required: bool,
}

/// How the drought model is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Interpreter used to run the model script.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Path to the model script.
    #[serde(default = "default_script")]
    pub script: String,
}

/// Historical/dashboard data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Trailing window of NASA POWER daily data.
    #[serde(default = "default_history_days")]
    pub days: i64,

    /// Weatherbit key for the agweather forecast extension (disabled when empty).
    #[serde(default)]
    pub weatherbit_api_key: String,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_port() -> u16 {
    3002
}

fn default_provider_timeout() -> u64 {
    10
}

fn default_interpreter() -> String {
    "python".into()
}
fn default_script() -> String {
    "ml/predict.py".into()
}

fn default_history_days() -> i64 {
    21
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            lat: 9.5612,
            lon: 44.0669,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            weatherapi_key: String::new(),
            visual_crossing_key: String::new(),
            timeout_secs: default_provider_timeout(),
            primary_required: false,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            script: default_script(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            days: default_history_days(),
            weatherbit_api_key: String::new(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            default_location: LocationConfig::default(),
            providers: ProvidersConfig::default(),
            scoring: ScoringConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_shape_fills_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{"providers": {"timeout_secs": 4}}"#)
            .expect("config should deserialize");

        assert_eq!(cfg.port, 3002);
        assert_eq!(cfg.providers.timeout_secs, 4);
        assert!(cfg.providers.weatherapi_key.is_empty());
        assert_eq!(cfg.history.days, 21);
        assert!((cfg.default_location.lat - 9.5612).abs() < 1e-9);
    }
}
