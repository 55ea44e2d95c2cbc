use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// One periodic unit of work driven by a [`Scheduler`].
#[async_trait]
pub trait PollJob: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Interval before the next cycle; read again after every cycle.
    fn period(&self) -> Duration;

    /// Runs a single request/publish cycle. Must not fail: any error is
    /// turned into a published fallback or dropped by the job itself.
    async fn run_cycle(&mut self);
}

/// Drives a [`PollJob`] on a fixed cadence, first cycle immediately.
///
/// Cycles never overlap. A cycle that runs past its period is counted as an
/// overrun and the next one starts right away instead of bursting to catch up.
pub struct Scheduler<J> {
    job: J,
    cycles: u64,
    overruns: u64,
    worst_case: Duration,
}

impl<J: PollJob> Scheduler<J> {
    pub fn new(job: J) -> Self {
        Self {
            job,
            cycles: 0,
            overruns: 0,
            worst_case: Duration::ZERO,
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn worst_case(&self) -> Duration {
        self.worst_case
    }

    /// Runs one cycle and returns how long it took.
    pub async fn tick(&mut self) -> Duration {
        let start = Instant::now();

        self.job.run_cycle().await;

        let elapsed = start.elapsed();
        self.cycles += 1;

        if elapsed > self.worst_case {
            self.worst_case = elapsed;
        }

        if elapsed > self.job.period() {
            self.overruns += 1;
            warn!(
                job = self.job.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Poll cycle overran its period"
            );
        }

        elapsed
    }

    /// Loops until the surrounding task is aborted.
    pub async fn run(mut self) {
        debug!(job = self.job.name(), "Scheduler started");

        loop {
            let elapsed = self.tick().await;
            let period = self.job.period();

            if elapsed < period {
                tokio::time::sleep(period - elapsed).await;
            }
        }
    }
}
