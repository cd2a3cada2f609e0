//! Configuration loader: merges env vars, .env file, and config.toml.

use common::config::AppConfig;
use common::Error;
use power_history::MAX_HISTORY_DAYS;
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::Config(format!("{env_name} must be an integer > 0"))),
    }
}

fn parse_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number")))
}

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.port == 0 {
        issues.push("port must be > 0".into());
    }

    let loc = &config.default_location;
    if !loc.lat.is_finite() || !(-90.0..=90.0).contains(&loc.lat) {
        issues.push("default_location.lat must be in [-90,90]".into());
    }
    if !loc.lon.is_finite() || !(-180.0..=180.0).contains(&loc.lon) {
        issues.push("default_location.lon must be in [-180,180]".into());
    }

    if config.providers.timeout_secs == 0 {
        issues.push("providers.timeout_secs must be > 0".into());
    }

    if config.scoring.interpreter.trim().is_empty() {
        issues.push("scoring.interpreter must not be empty".into());
    }
    if config.scoring.script.trim().is_empty() {
        issues.push("scoring.script must not be empty".into());
    }

    if config.history.days <= 0 || config.history.days > MAX_HISTORY_DAYS {
        issues.push(format!("history.days must be in 1..={MAX_HISTORY_DAYS}"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load service configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(raw) = std::env::var("PORT") {
        config.port = raw
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::Config("PORT must be a valid port number".into()))?;
    }
    if let Ok(key) = std::env::var("WEATHERAPI_KEY") {
        config.providers.weatherapi_key = key;
    }
    if let Ok(key) = std::env::var("VISUAL_CROSSING_KEY") {
        config.providers.visual_crossing_key = key;
    }
    if let Ok(key) = std::env::var("WEATHERBIT_API_KEY") {
        config.history.weatherbit_api_key = key;
    }
    if let Ok(raw) = std::env::var("PROVIDER_TIMEOUT_SECS") {
        config.providers.timeout_secs = parse_positive_u64(&raw, "PROVIDER_TIMEOUT_SECS")?;
    }
    if let Ok(raw) = std::env::var("PRIMARY_REQUIRED") {
        config.providers.primary_required = parse_bool(&raw);
    }
    if let Ok(raw) = std::env::var("PREDICT_INTERPRETER") {
        config.scoring.interpreter = raw;
    }
    if let Ok(raw) = std::env::var("PREDICT_SCRIPT") {
        config.scoring.script = raw;
    }
    if let Ok(raw) = std::env::var("DEFAULT_LAT") {
        config.default_location.lat = parse_f64(&raw, "DEFAULT_LAT")?;
    }
    if let Ok(raw) = std::env::var("DEFAULT_LON") {
        config.default_location.lon = parse_f64(&raw, "DEFAULT_LON")?;
    }
    if let Ok(raw) = std::env::var("HISTORY_DAYS") {
        config.history.days = parse_positive_u64(&raw, "HISTORY_DAYS")? as i64;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
