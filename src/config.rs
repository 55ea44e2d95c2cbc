//! Runtime settings for the dashboard pipeline.

use anyhow::{Result, bail};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";

/// Cadences, look-back windows and zone facts shared by the poll loops.
///
/// Loops read this through a watch channel on every tick, so a replaced
/// config takes effect from the next cycle without respawning anything.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub base_url: String,
    pub snapshot_period: Duration,
    pub trend_period: Duration,
    pub heatmap_period: Duration,
    pub trend_lookback_minutes: u32,
    pub heatmap_lookback_minutes: u32,
    /// People the zone is rated for; only used for display.
    pub capacity: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            snapshot_period: Duration::from_secs(2),
            trend_period: Duration::from_secs(5),
            heatmap_period: Duration::from_secs(10),
            trend_lookback_minutes: 2,
            heatmap_lookback_minutes: 5,
            capacity: 5,
        }
    }
}

impl DashboardConfig {
    /// Rejects settings that would spin a loop or request an empty window.
    pub fn validate(&self) -> Result<()> {
        for (name, period) in [
            ("snapshot_period", self.snapshot_period),
            ("trend_period", self.trend_period),
            ("heatmap_period", self.heatmap_period),
        ] {
            validate_period(name, period)?;
        }
        validate_lookback(self.trend_lookback_minutes)?;
        validate_lookback(self.heatmap_lookback_minutes)?;

        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }

        Ok(())
    }
}

/// Rejects a zero cadence, which would spin a loop.
pub fn validate_period(name: &str, period: Duration) -> Result<()> {
    if period.is_zero() {
        bail!("{name} must be greater than zero");
    }
    Ok(())
}

/// Rejects a zero-minute series window.
pub fn validate_lookback(minutes: u32) -> Result<()> {
    if minutes == 0 {
        bail!("look-back windows must be at least one minute");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_cadence() {
        let config = DashboardConfig::default();

        assert_eq!(config.snapshot_period, Duration::from_secs(2));
        assert_eq!(config.trend_period, Duration::from_secs(5));
        assert_eq!(config.heatmap_period, Duration::from_secs(10));
        assert_eq!(config.trend_lookback_minutes, 2);
        assert_eq!(config.heatmap_lookback_minutes, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = DashboardConfig {
            trend_period: Duration::ZERO,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("trend_period"));
    }

    #[test]
    fn test_zero_lookback_rejected() {
        let config = DashboardConfig {
            heatmap_lookback_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_standalone_checks() {
        assert!(validate_lookback(1).is_ok());
        let err = validate_lookback(0).unwrap_err();
        assert!(err.to_string().contains("at least one minute"));

        assert!(validate_period("render_period", Duration::from_millis(1)).is_ok());
        let err = validate_period("render_period", Duration::ZERO).unwrap_err();
        assert_eq!(err.to_string(), "render_period must be greater than zero");
    }

    #[test]
    fn test_blank_base_url_rejected() {
        let config = DashboardConfig {
            base_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
