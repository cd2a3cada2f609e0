//! Priority merge of partial vectors.

use std::collections::BTreeMap;

use common::{FeatureVector, Parameter, PartialVector};
use serde::Serialize;

/// Where a merged field's value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum Source {
    /// Supplied by the named provider.
    Provider(String),
    /// Copied from another resolved field.
    Derived(Parameter),
    /// Static default.
    Default,
}

/// Per-field source record of one merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Provenance {
    sources: BTreeMap<Parameter, Source>,
}

impl Provenance {
    pub fn source(&self, param: Parameter) -> Option<&Source> {
        self.sources.get(&param)
    }

    /// Fields that fell back to their static default.
    pub fn defaulted(&self) -> Vec<Parameter> {
        Parameter::ALL
            .iter()
            .copied()
            .filter(|p| matches!(self.sources.get(p), Some(Source::Default)))
            .collect()
    }

    /// Number of fields each provider won.
    pub fn provider_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for source in self.sources.values() {
            if let Source::Provider(name) = source {
                *counts.entry(name.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Outcome of a reconciliation: a complete, clamped vector plus where each
/// field came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub vector: FeatureVector,
    pub provenance: Provenance,
}

impl Reconciliation {
    pub fn defaulted_fields(&self) -> Vec<Parameter> {
        self.provenance.defaulted()
    }

    /// True when no provider contributed anything and every field is a
    /// static default.
    pub fn all_sources_exhausted(&self) -> bool {
        !self
            .provenance
            .sources
            .values()
            .any(|s| matches!(s, Source::Provider(_)))
    }
}

/// First provider, in priority order, holding a finite value for `param`.
pub fn resolve<'a>(
    param: Parameter,
    sources: &[(&'a str, &PartialVector)],
) -> Option<(&'a str, f64)> {
    sources.iter().find_map(|(name, partial)| {
        partial
            .get(param)
            .filter(|v| v.is_finite())
            .map(|v| (*name, v))
    })
}

/// Merge partial vectors listed in priority order (highest first).
///
/// Each field takes the first provider's value; fields nobody supplies get
/// their static default, except EVLAND, which takes the resolved EVPTRNS
/// first.
pub fn merge(sources: &[(&str, &PartialVector)]) -> (FeatureVector, Provenance) {
    let mut provenance = Provenance::default();

    let mut vector = FeatureVector::from_fn(|param| match resolve(param, sources) {
        Some((name, value)) => {
            provenance
                .sources
                .insert(param, Source::Provider(name.to_string()));
            value
        }
        None => {
            provenance.sources.insert(param, Source::Default);
            param.default_value()
        }
    });

    if provenance.source(Parameter::Evland) == Some(&Source::Default)
        && matches!(
            provenance.source(Parameter::Evptrns),
            Some(Source::Provider(_))
        )
    {
        vector.set(Parameter::Evland, vector.get(Parameter::Evptrns));
        provenance
            .sources
            .insert(Parameter::Evland, Source::Derived(Parameter::Evptrns));
    }

    (vector, provenance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(values: &[(Parameter, f64)]) -> PartialVector {
        values.iter().copied().collect()
    }

    #[test]
    fn test_all_empty_yields_static_defaults() {
        let empty = PartialVector::new();
        let (vector, provenance) = merge(&[("a", &empty), ("b", &empty), ("c", &empty)]);

        assert_eq!(vector, FeatureVector::defaults());
        assert_eq!(provenance.defaulted().len(), 15);
    }

    #[test]
    fn test_first_provider_wins_per_field() {
        let primary = partial(&[(Parameter::T2m, 21.0)]);
        let secondary = partial(&[(Parameter::T2m, 25.0), (Parameter::Rh2m, 40.0)]);
        let tertiary = partial(&[(Parameter::Rh2m, 80.0), (Parameter::TsMax, 30.0)]);

        let (vector, provenance) = merge(&[
            ("primary", &primary),
            ("secondary", &secondary),
            ("tertiary", &tertiary),
        ]);

        assert_eq!(vector.t2m, 21.0);
        assert_eq!(vector.rh2m, 40.0);
        assert_eq!(vector.ts_max, 30.0);
        assert_eq!(vector.ts_min, 15.0);
        assert_eq!(
            provenance.source(Parameter::Rh2m),
            Some(&Source::Provider("secondary".into()))
        );
        assert_eq!(provenance.source(Parameter::TsMin), Some(&Source::Default));
        assert_eq!(provenance.provider_counts().get("primary"), Some(&1));
    }

    #[test]
    fn test_zero_is_a_real_value() {
        let primary = partial(&[(Parameter::Prectotcorr, 0.0)]);
        let secondary = partial(&[(Parameter::Prectotcorr, 4.0)]);

        let (vector, _) = merge(&[("primary", &primary), ("secondary", &secondary)]);
        assert_eq!(vector.prectotcorr, 0.0);
    }

    #[test]
    fn test_evland_falls_back_to_resolved_evptrns() {
        let primary = partial(&[(Parameter::Evptrns, 6.2)]);
        let (vector, provenance) = merge(&[("primary", &primary)]);

        assert_eq!(vector.evland, 6.2);
        assert_eq!(
            provenance.source(Parameter::Evland),
            Some(&Source::Derived(Parameter::Evptrns))
        );
    }

    #[test]
    fn test_all_sources_exhausted_flag() {
        let empty = PartialVector::new();
        let (vector, provenance) = merge(&[("a", &empty)]);
        let exhausted = Reconciliation { vector, provenance };
        assert!(exhausted.all_sources_exhausted());

        let some = partial(&[(Parameter::Ps, 1009.0)]);
        let (vector, provenance) = merge(&[("a", &some)]);
        let partial_hit = Reconciliation { vector, provenance };
        assert!(!partial_hit.all_sources_exhausted());
        assert_eq!(partial_hit.defaulted_fields().len(), 14);
    }
}
