//! Drought scoring backends.
//!
//! The reconciliation core only needs "vector in, score out"; how the model
//! is run is a backend detail.

pub mod subprocess;

use common::{Error, FeatureVector};

pub use subprocess::SubprocessBackend;

/// Scores a complete feature vector. Implementations may block.
pub trait ScoringBackend: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, vector: &FeatureVector) -> Result<f64, Error>;
}

/// Extract the score from model output: the last whitespace-separated token
/// that parses as a finite number.
pub fn parse_score(output: &str) -> Option<f64> {
    output
        .split_whitespace()
        .rev()
        .find_map(|tok| {
            tok.trim_matches(|c: char| c == '[' || c == ']' || c == ',')
                .parse::<f64>()
                .ok()
        })
        .filter(|v| v.is_finite())
}
