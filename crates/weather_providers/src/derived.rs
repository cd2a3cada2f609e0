//! Quantities derived from raw provider fields.

/// Saturation vapour pressure over water (hPa), Magnus form.
pub fn saturation_vapor_pressure(temp_c: f64) -> f64 {
    6.112 * ((17.67 * temp_c) / (temp_c + 243.5)).exp()
}

/// Specific humidity (kg/kg) from air temperature (°C), relative humidity
/// (%) and surface pressure (hPa).
pub fn specific_humidity(temp_c: f64, rh_percent: f64, pressure_hpa: f64) -> f64 {
    let e = saturation_vapor_pressure(temp_c) * (rh_percent / 100.0);
    (0.622 * e) / (pressure_hpa - 0.378 * e)
}

/// Cooling degree days above 0°C: the sum of positive excess over the
/// base temperature across the given samples.
pub fn cooling_degree_days(temps_c: &[f64]) -> f64 {
    temps_c.iter().map(|t| (t - 0.0).max(0.0)).sum()
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturation_vapor_pressure_at_reference_points() {
        assert!((saturation_vapor_pressure(0.0) - 6.112).abs() < 1e-12);
        // ≈ 23.4 hPa at 20°C
        let es = saturation_vapor_pressure(20.0);
        assert!((es - 23.37).abs() < 0.05, "es={}", es);
    }

    #[test]
    fn test_specific_humidity_matches_formula() {
        let es = 6.112 * ((17.67 * 20.0) / (20.0 + 243.5_f64)).exp();
        let e = es * 0.5;
        let expected = 0.622 * e / (1013.0 - 0.378 * e);

        let qv = specific_humidity(20.0, 50.0, 1013.0);
        assert!((qv - expected).abs() < 1e-15);
        assert!(qv > 0.007 && qv < 0.008, "qv={}", qv);
    }

    #[test]
    fn test_cooling_degree_days_ignores_sub_zero_samples() {
        assert_eq!(cooling_degree_days(&[-4.0, 0.0, 2.5, 3.5]), 6.0);
        assert_eq!(cooling_degree_days(&[]), 0.0);
    }

    #[test]
    fn test_mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }
}
