//! JSON decoding for detection service responses.

use serde::Deserialize;

use crate::error::SourceError;
use crate::measurement::Measurement;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Decodes a snapshot body into a [`Measurement`].
///
/// # Errors
///
/// Returns [`SourceError::DataShape`] if the body carries an `error` field,
/// even when every measurement field is also present, or if it does not
/// match the measurement schema.
pub fn parse_snapshot(bytes: &[u8]) -> Result<Measurement, SourceError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;

    if let Ok(body) = ErrorBody::deserialize(&value) {
        return Err(SourceError::DataShape(format!("service reported: {}", body.error)));
    }

    Ok(Measurement::deserialize(value)?)
}

/// Decodes a series body into measurements, in server order.
///
/// A single malformed element fails the whole body; there is no partial result.
pub fn parse_series(bytes: &[u8]) -> Result<Vec<Measurement>, SourceError> {
    Ok(serde_json::from_slice(bytes)?)
}
