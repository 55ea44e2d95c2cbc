//! Trait for reading measurements from a detection service.

use crate::error::SourceError;
use crate::measurement::Measurement;

/// Abstraction over a measurement provider (e.g., the HTTP detector).
///
/// Each call performs exactly one request. Implementations do not cache,
/// retry, or coalesce concurrent calls.
#[async_trait::async_trait]
pub trait MeasurementApi: Send + Sync {
    /// Returns the most recent measurement.
    async fn fetch_snapshot(&self) -> Result<Measurement, SourceError>;

    /// Returns measurements from the last `lookback_minutes` minutes in
    /// chronological order. The window is applied server-side.
    async fn fetch_series(&self, lookback_minutes: u32) -> Result<Vec<Measurement>, SourceError>;
}
