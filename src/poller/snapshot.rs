use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::PollJob;
use crate::config::DashboardConfig;
use crate::connection::{ConnectionState, PollOutcome, update_connection};
use crate::measurement::Measurement;
use crate::services::measurement_api::MeasurementApi;

/// Latest snapshot together with the connection state it produced.
///
/// Published as one value so a reader never sees a measurement paired with
/// the connection state of a different poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotState {
    /// `None` until the first snapshot poll completes.
    pub measurement: Option<Measurement>,
    pub connection: ConnectionState,
}

/// Publishes the latest measurement and the connection state.
///
/// The only writer of [`ConnectionState`].
pub struct SnapshotJob {
    api: Arc<dyn MeasurementApi>,
    config: watch::Receiver<DashboardConfig>,
    state: watch::Sender<SnapshotState>,
}

impl SnapshotJob {
    pub fn new(
        api: Arc<dyn MeasurementApi>,
        config: watch::Receiver<DashboardConfig>,
        state: watch::Sender<SnapshotState>,
    ) -> Self {
        Self { api, config, state }
    }
}

#[async_trait]
impl PollJob for SnapshotJob {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn period(&self) -> Duration {
        self.config.borrow().snapshot_period
    }

    async fn run_cycle(&mut self) {
        let result = self.api.fetch_snapshot().await;
        let outcome = PollOutcome::from(&result);

        let measurement = match result {
            Ok(m) => {
                debug!(count = m.current_count, risk = %m.risk_level, "Snapshot received");
                m
            }
            Err(e) => {
                warn!(error = %e, "Snapshot poll failed, publishing fallback");
                Measurement::fallback(Utc::now())
            }
        };

        let previous = self.state.borrow().connection;
        let connection = update_connection(previous, outcome);
        if connection != previous {
            info!(from = ?previous, to = ?connection, "Connection state changed");
        }
        self.state.send_replace(SnapshotState {
            measurement: Some(measurement),
            connection,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::poller::testing::{ScriptedApi, reading};

    struct Harness {
        job: SnapshotJob,
        api: Arc<ScriptedApi>,
        state: watch::Receiver<SnapshotState>,
    }

    fn harness() -> Harness {
        let api = Arc::new(ScriptedApi::default());
        let (_config_tx, config_rx) = watch::channel(DashboardConfig::default());
        let (state_tx, state_rx) = watch::channel(SnapshotState::default());
        let job = SnapshotJob::new(api.clone(), config_rx, state_tx);
        Harness {
            job,
            api,
            state: state_rx,
        }
    }

    #[tokio::test]
    async fn test_success_publishes_and_connects() {
        let mut h = harness();
        let m = reading("2026-10-19T12:00:00Z", 0.6);
        h.api.push_snapshot(Ok(m.clone()));

        h.job.run_cycle().await;

        let state = h.state.borrow();
        assert_eq!(state.measurement.as_ref(), Some(&m));
        assert_eq!(state.connection, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_failure_publishes_fallback_within_poll() {
        let mut h = harness();
        h.api.push_snapshot(Err(SourceError::Transport("refused".into())));

        let before = Utc::now();
        h.job.run_cycle().await;
        let after = Utc::now();

        let state = h.state.borrow().clone();
        let published = state.measurement.unwrap();
        assert!(published.is_fallback());
        assert!(!published.surge_flag);
        assert!(published.timestamp >= before && published.timestamp <= after);
        assert_eq!(state.connection, ConnectionState::Degraded);
    }

    #[tokio::test]
    async fn test_one_publish_per_cycle() {
        let mut h = harness();
        h.api.push_snapshot(Ok(reading("2026-10-19T12:00:00Z", 0.6)));
        h.api.push_snapshot(Err(SourceError::Transport("refused".into())));

        h.job.run_cycle().await;
        h.state.mark_unchanged();
        h.job.run_cycle().await;

        // Measurement and connection flip together in a single version.
        assert!(h.state.has_changed().unwrap());
        let state = h.state.borrow_and_update().clone();
        assert!(state.measurement.unwrap().is_fallback());
        assert_eq!(state.connection, ConnectionState::Degraded);
        assert!(!h.state.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_degraded_until_next_success() {
        let mut h = harness();
        for _ in 0..3 {
            h.api.push_snapshot(Err(SourceError::DataShape("error field".into())));
        }
        h.api.push_snapshot(Ok(reading("2026-10-19T12:00:00Z", 0.2)));

        for _ in 0..3 {
            h.job.run_cycle().await;
            assert_eq!(h.state.borrow().connection, ConnectionState::Degraded);
        }

        h.job.run_cycle().await;
        let state = h.state.borrow();
        assert_eq!(state.connection, ConnectionState::Connected);
        assert!(!state.measurement.as_ref().unwrap().is_fallback());
    }

    #[test]
    fn test_period_from_config() {
        let h = harness();
        assert_eq!(h.job.period(), Duration::from_secs(2));
    }
}
