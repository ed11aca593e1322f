//! Conversions from infrastructure errors into the session layer's failure
//! shapes.

mod conversions;

pub(crate) use conversions::IntoRawFailure;
