//! Multi-source forecast reconciliation.
//!
//! Calls the primary provider, fans out to the secondaries concurrently,
//! merges their partial vectors by static priority with per-field
//! defaults, and clamps the result into the ranges the model expects.

pub mod engine;
pub mod merge;
pub mod validate;

pub use engine::{Reconciler, ReconcilerOptions};
pub use merge::{merge, Provenance, Reconciliation, Source};
pub use validate::{clamp_vector, ensure_complete};
