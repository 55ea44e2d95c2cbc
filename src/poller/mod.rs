//! Independent poll loops feeding the dashboard.
//!
//! Each job owns the only sender for its piece of derived state and
//! publishes a fresh immutable value on every successful cycle.

mod heatmap;
mod scheduler;
mod snapshot;
mod trend;

pub use heatmap::HeatmapJob;
pub use scheduler::{PollJob, Scheduler};
pub use snapshot::{SnapshotJob, SnapshotState};
pub use trend::TrendJob;
