use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use super::PollJob;
use crate::analyzers::trend::trend_points;
use crate::analyzers::types::TrendPoint;
use crate::config::DashboardConfig;
use crate::services::measurement_api::MeasurementApi;

/// Publishes the short-window density trend.
///
/// Non-critical: failures and empty windows keep the previous points and
/// never touch the connection state.
pub struct TrendJob {
    api: Arc<dyn MeasurementApi>,
    config: watch::Receiver<DashboardConfig>,
    points: watch::Sender<Arc<[TrendPoint]>>,
}

impl TrendJob {
    pub fn new(
        api: Arc<dyn MeasurementApi>,
        config: watch::Receiver<DashboardConfig>,
        points: watch::Sender<Arc<[TrendPoint]>>,
    ) -> Self {
        Self { api, config, points }
    }
}

#[async_trait]
impl PollJob for TrendJob {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn period(&self) -> Duration {
        self.config.borrow().trend_period
    }

    async fn run_cycle(&mut self) {
        let lookback = self.config.borrow().trend_lookback_minutes;

        match self.api.fetch_series(lookback).await {
            Ok(rows) if rows.is_empty() => {
                debug!(lookback, "Trend window empty, keeping previous points");
            }
            Ok(rows) => {
                let points = trend_points(&rows, &Local);
                debug!(points = points.len(), "Trend updated");
                self.points.send_replace(points.into());
            }
            // Deliberately silent beyond debug logging.
            Err(e) => {
                debug!(error = %e, "Trend poll failed, keeping previous points");
            }
        }
    }
}
