//! Measurement records emitted by the detection service.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// Risk classification attached to every measurement.
///
/// `Error` is never produced by a healthy backend; it marks the fallback
/// measurement substituted when the service cannot be reached. Unknown
/// strings on the wire also land here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    #[serde(other)]
    Error,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
            RiskLevel::Error => "Error",
        }
    }

    /// Display colour used for badges, bars and heatmap cells.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#10b981",
            RiskLevel::Medium => "#f59e0b",
            RiskLevel::High => "#f97316",
            RiskLevel::Critical => "#ef4444",
            RiskLevel::Error => "#94a3b8",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point-in-time reading of the monitored zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub current_count: u32,
    /// Occupancy fraction of zone capacity; exceeds 1.0 under overload.
    pub density_ratio: f64,
    /// Persons gained (or lost) over the backend's growth window.
    pub growth_rate: i64,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub surge_flag: bool,
    /// Seconds spent continuously in a high-density state.
    pub duration_in_high_state: u64,
}

impl Measurement {
    /// Synthetic reading shown while the service is unreachable.
    ///
    /// Never fed into trend or heatmap history.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Measurement {
            timestamp: now,
            current_count: 0,
            density_ratio: 0.0,
            growth_rate: 0,
            risk_level: RiskLevel::Error,
            risk_score: 0.0,
            surge_flag: false,
            duration_in_high_state: 0,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.risk_level == RiskLevel::Error
            && self.current_count == 0
            && self.density_ratio == 0.0
            && self.growth_rate == 0
            && self.risk_score == 0.0
            && self.duration_in_high_state == 0
    }

    /// Occupancy as a whole percentage, e.g. `0.833` becomes `83`.
    pub fn density_pct(&self) -> i64 {
        density_pct(self.density_ratio)
    }
}

/// Parses an ISO-8601 instant from the wire.
///
/// RFC 3339 strings keep their offset. Strings without an offset, as
/// Python's `datetime.isoformat()` writes them, are read as local time.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let naive = raw
        .parse::<NaiveDateTime>()
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
        .ok_or_else(|| format!("timestamp '{raw}' does not exist in the local time zone"))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(de::Error::custom)
}

pub(crate) fn density_pct(ratio: f64) -> i64 {
    (ratio * 100.0).round() as i64
}
