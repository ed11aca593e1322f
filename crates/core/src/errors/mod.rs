//! Failure normalization
//!
//! Every failed backend call, whatever its shape, is turned into one
//! [`NormalizedError`](authenhub_domain::NormalizedError) here.

mod normalizer;

pub use normalizer::{normalize, BodyFormat};
