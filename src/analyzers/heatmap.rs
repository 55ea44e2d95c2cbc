use chrono::{DateTime, TimeZone, Timelike};

use crate::analyzers::types::HeatmapBucket;
use crate::measurement::{Measurement, RiskLevel, density_pct};

/// Width of a heatmap bucket in wall-clock seconds.
pub const BUCKET_WIDTH_SECS: u32 = 15;

/// Bucket key for `ts`: `H:MM:SS` with seconds floored to the bucket width.
///
/// The hour is not zero-padded, so 09:00:14 keys as `9:00:00`.
pub fn bucket_key<Tz: TimeZone>(ts: &DateTime<Tz>) -> String {
    let second = ts.second() / BUCKET_WIDTH_SECS * BUCKET_WIDTH_SECS;
    format!("{}:{:02}:{:02}", ts.hour(), ts.minute(), second)
}

/// Bucket under construction.
struct OpenBucket {
    key: String,
    density_sum: f64,
    count: u32,
    max_risk_score: f64,
    risk_level: RiskLevel,
}

impl OpenBucket {
    fn seed(key: String, m: &Measurement) -> Self {
        Self {
            key,
            density_sum: m.density_ratio,
            count: 1,
            max_risk_score: m.risk_score,
            risk_level: m.risk_level,
        }
    }

    fn absorb(&mut self, m: &Measurement) {
        self.density_sum += m.density_ratio;
        self.count += 1;
        self.max_risk_score = self.max_risk_score.max(m.risk_score);
        // Last writer wins, independent of which reading set the max score.
        // Kept for compatibility with existing dashboards even though the
        // two fields can then describe different readings.
        self.risk_level = m.risk_level;
    }

    fn close(self) -> HeatmapBucket {
        HeatmapBucket {
            density: density_pct(self.density_sum / self.count as f64),
            risk_score: self.max_risk_score,
            risk_level: self.risk_level,
            label: self.key,
        }
    }
}

/// Folds a chronological series into fixed-width heatmap buckets.
///
/// Only consecutive measurements with the same key share a bucket; the fold
/// never reorders or merges non-adjacent runs. Keys are computed in `tz`.
/// Pure: the same input always yields the same buckets.
pub fn build_buckets<Tz: TimeZone>(rows: &[Measurement], tz: &Tz) -> Vec<HeatmapBucket> {
    let mut buckets = Vec::new();
    let mut open: Option<OpenBucket> = None;

    for m in rows {
        let key = bucket_key(&m.timestamp.with_timezone(tz));

        if let Some(bucket) = open.as_mut().filter(|b| b.key == key) {
            bucket.absorb(m);
            continue;
        }

        if let Some(done) = open.replace(OpenBucket::seed(key, m)) {
            buckets.push(done.close());
        }
    }

    if let Some(done) = open {
        buckets.push(done.close());
    }

    buckets
}
