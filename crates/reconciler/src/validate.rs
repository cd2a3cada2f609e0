//! Final range checks on a merged vector.

use common::{Error, FeatureVector, Parameter};

/// Clamp every range-constrained field into its valid range. Returns the
/// parameters whose value changed.
pub fn clamp_vector(vector: &mut FeatureVector) -> Vec<Parameter> {
    let mut clamped = Vec::new();

    for param in Parameter::ALL {
        let Some((lo, hi)) = param.clamp_range() else {
            continue;
        };
        let value = vector.get(param);
        let bounded = value.max(lo).min(hi);
        if bounded != value {
            vector.set(param, bounded);
            clamped.push(param);
        }
    }

    clamped
}

/// Reject a vector with any non-finite field.
pub fn ensure_complete(vector: &FeatureVector) -> Result<(), Error> {
    let bad: Vec<&str> = Parameter::ALL
        .iter()
        .filter(|p| !vector.get(**p).is_finite())
        .map(|p| p.as_str())
        .collect();

    if bad.is_empty() {
        Ok(())
    } else {
        Err(Error::Other(format!(
            "feature vector has non-finite fields: {}",
            bad.join(", ")
        )))
    }
}
