use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use super::PollJob;
use crate::analyzers::heatmap::build_buckets;
use crate::analyzers::types::HeatmapBucket;
use crate::config::DashboardConfig;
use crate::services::measurement_api::MeasurementApi;

/// Publishes the long-window density heatmap, rebuilt from scratch each cycle.
///
/// Failures and empty windows keep the previous buckets.
pub struct HeatmapJob {
    api: Arc<dyn MeasurementApi>,
    config: watch::Receiver<DashboardConfig>,
    buckets: watch::Sender<Arc<[HeatmapBucket]>>,
}

impl HeatmapJob {
    pub fn new(
        api: Arc<dyn MeasurementApi>,
        config: watch::Receiver<DashboardConfig>,
        buckets: watch::Sender<Arc<[HeatmapBucket]>>,
    ) -> Self {
        Self { api, config, buckets }
    }
}

#[async_trait]
impl PollJob for HeatmapJob {
    fn name(&self) -> &'static str {
        "heatmap"
    }

    fn period(&self) -> Duration {
        self.config.borrow().heatmap_period
    }

    async fn run_cycle(&mut self) {
        let lookback = self.config.borrow().heatmap_lookback_minutes;

        match self.api.fetch_series(lookback).await {
            Ok(rows) if rows.is_empty() => {
                debug!(lookback, "Heatmap window empty, keeping previous buckets");
            }
            Ok(rows) => {
                let buckets = build_buckets(&rows, &Local);
                debug!(rows = rows.len(), buckets = buckets.len(), "Heatmap rebuilt");
                self.buckets.send_replace(buckets.into());
            }
            // Deliberately silent beyond debug logging.
            Err(e) => {
                debug!(error = %e, "Heatmap poll failed, keeping previous buckets");
            }
        }
    }
}
