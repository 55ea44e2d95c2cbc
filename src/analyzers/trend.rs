use chrono::TimeZone;
use std::fmt::Display;

use crate::analyzers::types::TrendPoint;
use crate::measurement::Measurement;

/// Maps a series into trend points, one per measurement, in input order.
///
/// Labels are rendered in `tz`. Duplicate timestamps are kept.
pub fn trend_points<Tz>(rows: &[Measurement], tz: &Tz) -> Vec<TrendPoint>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    rows.iter()
        .map(|m| TrendPoint {
            time: m.timestamp.with_timezone(tz).format("%H:%M:%S").to_string(),
            density_pct: m.density_pct(),
            measurement: m.clone(),
        })
        .collect()
}
