//! Owner of the three poll loops and the core→presentation boundary.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, info};

use crate::analyzers::types::{HeatmapBucket, TrendPoint};
use crate::config::DashboardConfig;
use crate::connection::ConnectionState;
use crate::measurement::Measurement;
use crate::poller::{HeatmapJob, PollJob, Scheduler, SnapshotJob, SnapshotState, TrendJob};
use crate::services::measurement_api::MeasurementApi;

/// Everything the presentation layer gets from the pipeline for one render.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// `None` until the first snapshot poll completes.
    pub snapshot: Option<Measurement>,
    pub connection: ConnectionState,
    pub trend: Arc<[TrendPoint]>,
    pub heatmap: Arc<[HeatmapBucket]>,
}

/// Running dashboard pipeline.
///
/// Dropping it (or calling [`Dashboard::shutdown`]) aborts every loop; a
/// request in flight at that moment is dropped and its response never
/// published.
pub struct Dashboard {
    config: watch::Sender<DashboardConfig>,
    snapshot: watch::Receiver<SnapshotState>,
    trend: watch::Receiver<Arc<[TrendPoint]>>,
    heatmap: watch::Receiver<Arc<[HeatmapBucket]>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Dashboard {
    /// Validates `config` and starts the snapshot, trend and heatmap loops
    /// on the current Tokio runtime. Each loop polls immediately.
    pub fn spawn(api: Arc<dyn MeasurementApi>, config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        info!(
            base_url = %config.base_url,
            snapshot_secs = config.snapshot_period.as_secs_f64(),
            trend_secs = config.trend_period.as_secs_f64(),
            heatmap_secs = config.heatmap_period.as_secs_f64(),
            "Starting dashboard loops"
        );

        let (config_tx, config_rx) = watch::channel(config);
        let (snapshot_tx, snapshot_rx) = watch::channel(SnapshotState::default());
        let (trend_tx, trend_rx) = watch::channel(Arc::from(Vec::new()));
        let (heatmap_tx, heatmap_rx) = watch::channel(Arc::from(Vec::new()));

        let tasks = vec![
            spawn_job(SnapshotJob::new(api.clone(), config_rx.clone(), snapshot_tx)),
            spawn_job(TrendJob::new(api.clone(), config_rx.clone(), trend_tx)),
            spawn_job(HeatmapJob::new(api, config_rx, heatmap_tx)),
        ];

        Ok(Self {
            config: config_tx,
            snapshot: snapshot_rx,
            trend: trend_rx,
            heatmap: heatmap_rx,
            tasks,
        })
    }

    /// Current published values of all loops.
    pub fn view(&self) -> DashboardView {
        let SnapshotState {
            measurement,
            connection,
        } = self.snapshot.borrow().clone();
        DashboardView {
            snapshot: measurement,
            connection,
            trend: self.trend.borrow().clone(),
            heatmap: self.heatmap.borrow().clone(),
        }
    }

    pub fn config(&self) -> DashboardConfig {
        self.config.borrow().clone()
    }

    /// Replaces the running configuration. Loops pick it up on their next tick.
    pub fn reconfigure(&self, config: DashboardConfig) -> Result<()> {
        config.validate()?;
        self.config.send_replace(config);
        Ok(())
    }

    /// Aborts all loops and waits until they have stopped.
    pub async fn shutdown(mut self) {
        for task in std::mem::take(&mut self.tasks) {
            task.abort();
            let _ = task.await;
        }
        info!("Dashboard loops stopped");
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn spawn_job<J: PollJob + 'static>(job: J) -> JoinHandle<()> {
    let span = tracing::info_span!("poll_loop", job = job.name());
    tokio::spawn(Scheduler::new(job).run().instrument(span))
}
