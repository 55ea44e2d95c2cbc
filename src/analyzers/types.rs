//! Display-ready series produced by the aggregators.

use serde::Serialize;

use crate::measurement::{Measurement, RiskLevel};

/// One point on the density trend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Wall-clock label, `HH:MM:SS`.
    pub time: String,
    pub density_pct: i64,
}

/// One heatmap cell covering a fixed-width wall-clock interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapBucket {
    pub label: String,
    /// Mean density of the bucket, as a whole percentage.
    pub density: i64,
    /// Highest risk score seen in the bucket.
    pub risk_score: f64,
    /// Risk level of the last measurement folded into the bucket.
    pub risk_level: RiskLevel,
}
