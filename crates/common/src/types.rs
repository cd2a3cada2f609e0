//! Domain types shared across the workspace.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Sentinel used by NASA POWER for "no observation".
pub const MISSING_SENTINEL: f64 = -999.0;

// ── Parameters ────────────────────────────────────────────────────────

/// One of the 15 weather/soil parameters the drought model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    /// Precipitation (mm).
    #[serde(rename = "PRECTOTCORR")]
    Prectotcorr,
    /// Evapotranspiration (mm).
    #[serde(rename = "EVPTRNS")]
    Evptrns,
    /// Land evaporation (mm).
    #[serde(rename = "EVLAND")]
    Evland,
    /// Root-zone soil wetness (fraction).
    #[serde(rename = "GWETROOT")]
    Gwetroot,
    /// Top-layer soil wetness (fraction).
    #[serde(rename = "GWETTOP")]
    Gwettop,
    /// Profile soil wetness (fraction).
    #[serde(rename = "GWETPROF")]
    Gwetprof,
    /// 2m air temperature (°C).
    #[serde(rename = "T2M")]
    T2m,
    /// Surface max temperature (°C).
    #[serde(rename = "TS_MAX")]
    TsMax,
    /// Surface min temperature (°C).
    #[serde(rename = "TS_MIN")]
    TsMin,
    /// Surface shortwave radiation.
    #[serde(rename = "ALLSKY_SFC_SW_DWN")]
    AllskySfcSwDwn,
    /// Relative humidity at 2m (%).
    #[serde(rename = "RH2M")]
    Rh2m,
    /// Specific humidity at 2m (kg/kg).
    #[serde(rename = "QV2M")]
    Qv2m,
    /// Wind speed at 10m (m/s).
    #[serde(rename = "WS10M")]
    Ws10m,
    /// Surface pressure (hPa).
    #[serde(rename = "PS")]
    Ps,
    /// Cooling degree days above 0°C.
    #[serde(rename = "CDD0")]
    Cdd0,
}

impl Parameter {
    /// All parameters, in the order the upstream data sources list them.
    pub const ALL: [Parameter; 15] = [
        Parameter::Prectotcorr,
        Parameter::Evptrns,
        Parameter::Evland,
        Parameter::Gwetroot,
        Parameter::Gwettop,
        Parameter::Gwetprof,
        Parameter::T2m,
        Parameter::TsMax,
        Parameter::TsMin,
        Parameter::AllskySfcSwDwn,
        Parameter::Rh2m,
        Parameter::Qv2m,
        Parameter::Ws10m,
        Parameter::Ps,
        Parameter::Cdd0,
    ];

    /// Upstream/wire name of the parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::Prectotcorr => "PRECTOTCORR",
            Parameter::Evptrns => "EVPTRNS",
            Parameter::Evland => "EVLAND",
            Parameter::Gwetroot => "GWETROOT",
            Parameter::Gwettop => "GWETTOP",
            Parameter::Gwetprof => "GWETPROF",
            Parameter::T2m => "T2M",
            Parameter::TsMax => "TS_MAX",
            Parameter::TsMin => "TS_MIN",
            Parameter::AllskySfcSwDwn => "ALLSKY_SFC_SW_DWN",
            Parameter::Rh2m => "RH2M",
            Parameter::Qv2m => "QV2M",
            Parameter::Ws10m => "WS10M",
            Parameter::Ps => "PS",
            Parameter::Cdd0 => "CDD0",
        }
    }

    /// Static fallback used when no provider supplies the parameter.
    pub fn default_value(self) -> f64 {
        match self {
            Parameter::Prectotcorr => 0.0,
            Parameter::Evptrns => 3.0,
            Parameter::Evland => 3.0,
            Parameter::Gwetroot => 0.3,
            Parameter::Gwettop => 0.25,
            Parameter::Gwetprof => 0.4,
            Parameter::T2m => 20.0,
            Parameter::TsMax => 25.0,
            Parameter::TsMin => 15.0,
            Parameter::AllskySfcSwDwn => 0.0,
            Parameter::Rh2m => 50.0,
            Parameter::Qv2m => 0.008,
            Parameter::Ws10m => 2.0,
            Parameter::Ps => 1013.0,
            Parameter::Cdd0 => 5.0,
        }
    }

    /// Range enforced on the merged vector, `None` when unconstrained.
    pub fn clamp_range(self) -> Option<(f64, f64)> {
        match self {
            Parameter::Gwetroot | Parameter::Gwettop | Parameter::Gwetprof => Some((0.0, 1.0)),
            Parameter::Rh2m => Some((0.0, 100.0)),
            Parameter::Prectotcorr | Parameter::AllskySfcSwDwn => Some((0.0, f64::INFINITY)),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::Other(format!("unknown parameter: {s}")))
    }
}

// ── Feature vectors ───────────────────────────────────────────────────

/// The complete 15-field input of the drought model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(rename = "PRECTOTCORR")]
    pub prectotcorr: f64,
    #[serde(rename = "EVPTRNS")]
    pub evptrns: f64,
    #[serde(rename = "EVLAND")]
    pub evland: f64,
    #[serde(rename = "GWETROOT")]
    pub gwetroot: f64,
    #[serde(rename = "GWETTOP")]
    pub gwettop: f64,
    #[serde(rename = "GWETPROF")]
    pub gwetprof: f64,
    #[serde(rename = "T2M")]
    pub t2m: f64,
    #[serde(rename = "TS_MAX")]
    pub ts_max: f64,
    #[serde(rename = "TS_MIN")]
    pub ts_min: f64,
    #[serde(rename = "ALLSKY_SFC_SW_DWN")]
    pub allsky_sfc_sw_dwn: f64,
    #[serde(rename = "RH2M")]
    pub rh2m: f64,
    #[serde(rename = "QV2M")]
    pub qv2m: f64,
    #[serde(rename = "WS10M")]
    pub ws10m: f64,
    #[serde(rename = "PS")]
    pub ps: f64,
    #[serde(rename = "CDD0")]
    pub cdd0: f64,
}

impl FeatureVector {
    /// The static-default vector.
    pub fn defaults() -> Self {
        Self::from_fn(Parameter::default_value)
    }

    /// Build a vector by evaluating `f` for every parameter.
    pub fn from_fn(mut f: impl FnMut(Parameter) -> f64) -> Self {
        Self {
            prectotcorr: f(Parameter::Prectotcorr),
            evptrns: f(Parameter::Evptrns),
            evland: f(Parameter::Evland),
            gwetroot: f(Parameter::Gwetroot),
            gwettop: f(Parameter::Gwettop),
            gwetprof: f(Parameter::Gwetprof),
            t2m: f(Parameter::T2m),
            ts_max: f(Parameter::TsMax),
            ts_min: f(Parameter::TsMin),
            allsky_sfc_sw_dwn: f(Parameter::AllskySfcSwDwn),
            rh2m: f(Parameter::Rh2m),
            qv2m: f(Parameter::Qv2m),
            ws10m: f(Parameter::Ws10m),
            ps: f(Parameter::Ps),
            cdd0: f(Parameter::Cdd0),
        }
    }

    pub fn get(&self, param: Parameter) -> f64 {
        match param {
            Parameter::Prectotcorr => self.prectotcorr,
            Parameter::Evptrns => self.evptrns,
            Parameter::Evland => self.evland,
            Parameter::Gwetroot => self.gwetroot,
            Parameter::Gwettop => self.gwettop,
            Parameter::Gwetprof => self.gwetprof,
            Parameter::T2m => self.t2m,
            Parameter::TsMax => self.ts_max,
            Parameter::TsMin => self.ts_min,
            Parameter::AllskySfcSwDwn => self.allsky_sfc_sw_dwn,
            Parameter::Rh2m => self.rh2m,
            Parameter::Qv2m => self.qv2m,
            Parameter::Ws10m => self.ws10m,
            Parameter::Ps => self.ps,
            Parameter::Cdd0 => self.cdd0,
        }
    }

    pub fn set(&mut self, param: Parameter, value: f64) {
        let slot = match param {
            Parameter::Prectotcorr => &mut self.prectotcorr,
            Parameter::Evptrns => &mut self.evptrns,
            Parameter::Evland => &mut self.evland,
            Parameter::Gwetroot => &mut self.gwetroot,
            Parameter::Gwettop => &mut self.gwettop,
            Parameter::Gwetprof => &mut self.gwetprof,
            Parameter::T2m => &mut self.t2m,
            Parameter::TsMax => &mut self.ts_max,
            Parameter::TsMin => &mut self.ts_min,
            Parameter::AllskySfcSwDwn => &mut self.allsky_sfc_sw_dwn,
            Parameter::Rh2m => &mut self.rh2m,
            Parameter::Qv2m => &mut self.qv2m,
            Parameter::Ws10m => &mut self.ws10m,
            Parameter::Ps => &mut self.ps,
            Parameter::Cdd0 => &mut self.cdd0,
        };
        *slot = value;
    }

    /// True when every field is a finite number.
    pub fn is_complete(&self) -> bool {
        Parameter::ALL.iter().all(|p| self.get(*p).is_finite())
    }
}

/// A provider's possibly-incomplete subset of the canonical fields.
///
/// Keys that are present always hold finite values; `insert` drops
/// anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialVector {
    values: BTreeMap<Parameter, f64>,
}

impl PartialVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; non-finite values are ignored. Returns whether the
    /// value was stored.
    pub fn insert(&mut self, param: Parameter, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.values.insert(param, value);
        true
    }

    /// Insert when `value` is `Some` and finite.
    pub fn insert_opt(&mut self, param: Parameter, value: Option<f64>) -> bool {
        match value {
            Some(v) => self.insert(param, v),
            None => false,
        }
    }

    pub fn get(&self, param: Parameter) -> Option<f64> {
        self.values.get(&param).copied()
    }

    pub fn contains(&self, param: Parameter) -> bool {
        self.values.contains_key(&param)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(Parameter, f64)> for PartialVector {
    fn from_iter<I: IntoIterator<Item = (Parameter, f64)>>(iter: I) -> Self {
        let mut partial = PartialVector::new();
        for (param, value) in iter {
            partial.insert(param, value);
        }
        partial
    }
}

// ── Historical records ────────────────────────────────────────────────

/// One day of cleaned historical (or forecast) values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    #[serde(flatten)]
    pub values: FeatureVector,
}

// ── Coordinates ───────────────────────────────────────────────────────

/// A validated WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, Error> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoordinates(format!(
                "latitude must be within [-90, 90], got {lat}"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoordinates(format!(
                "longitude must be within [-180, 180], got {lon}"
            )));
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4},{:.4})", self.lat, self.lon)
    }
}
