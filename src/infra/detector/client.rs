use async_trait::async_trait;
use tracing::debug;

use crate::error::SourceError;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::measurement::Measurement;
use crate::parser::{parse_series, parse_snapshot};
use crate::services::measurement_api::MeasurementApi;

/// Reads measurements from the detector's `/detect` and `/history` endpoints.
pub struct DetectorClient<C> {
    http: C,
    base_url: String,
}

impl<C: HttpClient> DetectorClient<C> {
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn snapshot_url(&self) -> String {
        format!("{}/detect", self.base_url)
    }

    pub fn series_url(&self, lookback_minutes: u32) -> String {
        format!("{}/history?minutes={}", self.base_url, lookback_minutes)
    }

    /// MJPEG stream embedded by the presentation layer; never fetched here.
    pub fn video_feed_url(&self) -> String {
        format!("{}/video_feed", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClient> MeasurementApi for DetectorClient<C> {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_snapshot(&self) -> Result<Measurement, SourceError> {
        let bytes = fetch_bytes(&self.http, &self.snapshot_url()).await?;
        debug!(bytes = bytes.len(), "Snapshot body received");
        parse_snapshot(&bytes)
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_series(&self, lookback_minutes: u32) -> Result<Vec<Measurement>, SourceError> {
        let bytes = fetch_bytes(&self.http, &self.series_url(lookback_minutes)).await?;
        let rows = parse_series(&bytes)?;
        debug!(rows = rows.len(), "Series body parsed");
        Ok(rows)
    }
}
