//! Terminal rendering of a [`DashboardView`].
//!
//! Supports a plain-text panel and JSON serialization.

use anyhow::Result;

use crate::analyzers::types::{HeatmapBucket, TrendPoint};
use crate::analyzers::utility::{mean, quantize};
use crate::dashboard::DashboardView;
use crate::measurement::{Measurement, RiskLevel};

const PLACEHOLDER: &str = "Collecting data...";
const MISSING: &str = "—";
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
/// Top of the trend chart's y-axis, in percent.
const TREND_CEILING_PCT: f64 = 150.0;
const DENSITY_BAR_WIDTH: usize = 20;
/// Seconds in a high-density state after which overload is reported as critical.
const SUSTAINED_OVERLOAD_SECS: u64 = 10;

/// Static facts the panel needs besides the view itself.
#[derive(Debug, Clone)]
pub struct PanelOptions {
    pub capacity: u32,
    pub trend_minutes: u32,
    pub heatmap_minutes: u32,
    pub video_feed_url: Option<String>,
}

/// Joins rendered lines, each terminated by a newline.
fn join_lines(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Serializes the view as pretty-printed JSON.
pub fn render_json(view: &DashboardView) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

/// Renders the full dashboard panel: banners, metric cards, trend and heatmap.
pub fn render_text(view: &DashboardView, opts: &PanelOptions) -> String {
    let mut banner = vec!["AI Crowd Risk Monitor".to_string()];
    if view.connection.is_degraded() {
        banner.push("[!] AI service offline — retrying...".to_string());
    }
    if view.snapshot.as_ref().is_some_and(|m| m.surge_flag) {
        banner.push("[!] SURGE DETECTED — Rapid crowd increase".to_string());
    }
    if let Some(url) = &opts.video_feed_url {
        banner.push(format!("Live camera feed: {url}"));
    }
    banner.push(String::new());

    [
        join_lines(banner),
        render_cards(view.snapshot.as_ref(), opts.capacity),
        join_lines(vec![
            String::new(),
            format!("Density Trend (Last {} Minutes)", opts.trend_minutes),
            format!("  {}", render_trend(&view.trend)),
            String::new(),
            format!("Density Heatmap (Last {} Minutes)", opts.heatmap_minutes),
        ]),
        render_heatmap(&view.heatmap),
    ]
    .concat()
}

/// Metric cards for the latest measurement; `None` renders placeholders.
pub fn render_cards(snapshot: Option<&Measurement>, capacity: u32) -> String {
    let level = snapshot.map_or(RiskLevel::Error, |m| m.risk_level);
    let density = snapshot.map_or(0, |m| m.density_pct());
    let count = snapshot.map_or(MISSING.to_string(), |m| m.current_count.to_string());
    let score = snapshot.map_or(MISSING.to_string(), |m| format!("{:.2}", m.risk_score));
    let growth = snapshot.map_or(MISSING.to_string(), |m| growth_label(m.growth_rate));
    let high_secs = snapshot.map_or(0, |m| m.duration_in_high_state);
    let surge = snapshot.is_some_and(|m| m.surge_flag);

    join_lines(vec![
        format!("  People Count       {count} of {capacity} capacity"),
        format!("  Density            {density}% [{}]", density_bar(density, DENSITY_BAR_WIDTH)),
        format!("  Risk Level         {level} ({})  Score: {score}", level.color()),
        format!("  Growth Rate        {growth} persons / window"),
        format!(
            "  Overload Duration  {}  {}",
            overload_duration(high_secs),
            overload_status(high_secs)
        ),
        format!("  Surge Alert        {}", if surge { "ACTIVE" } else { "None" }),
    ])
}

/// Growth rate with an explicit sign for increases.
pub fn growth_label(growth_rate: i64) -> String {
    if growth_rate > 0 {
        format!("+{growth_rate}")
    } else {
        growth_rate.to_string()
    }
}

pub fn overload_duration(secs: u64) -> String {
    if secs > 0 {
        format!("{secs}s")
    } else {
        MISSING.to_string()
    }
}

pub fn overload_status(secs: u64) -> &'static str {
    match secs {
        s if s >= SUSTAINED_OVERLOAD_SECS => "CRITICAL — sustained overload",
        s if s > 0 => "High density active",
        _ => "Normal",
    }
}

/// Fixed-width bar for a density percentage, capped at 100 %.
pub fn density_bar(pct: i64, width: usize) -> String {
    let filled = (pct.clamp(0, 100) as usize * width + 50) / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

/// Sparkline plus min/avg/peak; a single point is not enough for a line.
pub fn render_trend(points: &[TrendPoint]) -> String {
    if points.len() <= 1 {
        return PLACEHOLDER.to_string();
    }

    let values: Vec<f64> = points.iter().map(|p| p.density_pct as f64).collect();
    let line: String = quantize(&values, TREND_CEILING_PCT, SPARKLINE_CHARS.len() as u8)
        .into_iter()
        .map(|level| SPARKLINE_CHARS[level as usize])
        .collect();

    let min = points.iter().map(|p| p.density_pct).min().unwrap_or(0);
    let peak = points.iter().map(|p| p.density_pct).max().unwrap_or(0);
    let first = &points[0].time;
    let last = &points[points.len() - 1].time;

    format!(
        "{line}  {first}..{last}  min {min}% avg {:.0}% peak {peak}%",
        mean(&values)
    )
}

/// Cell opacity scaled by density, kept visible for near-empty buckets.
pub fn cell_opacity(density: i64) -> f64 {
    (density as f64 / 120.0).clamp(0.2, 1.0)
}

/// One line per bucket; an empty bucket set is a placeholder, not an empty grid.
pub fn render_heatmap(buckets: &[HeatmapBucket]) -> String {
    if buckets.is_empty() {
        return format!("  {PLACEHOLDER}\n");
    }

    let mut lines: Vec<String> = buckets
        .iter()
        .map(|cell| {
            format!(
                "  {:>8}  {:>4}%  {:<8} {} opacity {:.2}",
                cell.label,
                cell.density,
                cell.risk_level.as_str(),
                cell.risk_level.color(),
                cell_opacity(cell.density)
            )
        })
        .collect();
    lines.push(format!(
        "  legend: Low {} | Medium {} | High {} | Critical {}",
        RiskLevel::Low.color(),
        RiskLevel::Medium.color(),
        RiskLevel::High.color(),
        RiskLevel::Critical.color()
    ));
    join_lines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionState;
    use chrono::Utc;
    use std::sync::Arc;

    fn opts() -> PanelOptions {
        PanelOptions {
            capacity: 5,
            trend_minutes: 2,
            heatmap_minutes: 5,
            video_feed_url: None,
        }
    }

    fn measurement(ratio: f64) -> Measurement {
        Measurement {
            timestamp: Utc::now(),
            current_count: 4,
            density_ratio: ratio,
            growth_rate: 2,
            risk_level: RiskLevel::High,
            risk_score: 3.456,
            surge_flag: true,
            duration_in_high_state: 12,
        }
    }

    fn point(time: &str, pct: i64) -> TrendPoint {
        TrendPoint {
            measurement: measurement(pct as f64 / 100.0),
            time: time.to_string(),
            density_pct: pct,
        }
    }

    fn empty_view() -> DashboardView {
        DashboardView {
            snapshot: None,
            connection: ConnectionState::Connected,
            trend: Arc::from(Vec::new()),
            heatmap: Arc::from(Vec::new()),
        }
    }

    #[test]
    fn test_growth_label_sign() {
        assert_eq!(growth_label(3), "+3");
        assert_eq!(growth_label(0), "0");
        assert_eq!(growth_label(-2), "-2");
    }

    #[test]
    fn test_overload_status_thresholds() {
        assert_eq!(overload_status(0), "Normal");
        assert_eq!(overload_status(9), "High density active");
        assert_eq!(overload_status(10), "CRITICAL — sustained overload");
        assert_eq!(overload_duration(0), "—");
        assert_eq!(overload_duration(7), "7s");
    }

    #[test]
    fn test_cell_opacity_clamped() {
        assert_eq!(cell_opacity(0), 0.2);
        assert_eq!(cell_opacity(60), 0.5);
        assert_eq!(cell_opacity(200), 1.0);
    }

    #[test]
    fn test_density_bar_caps_at_full() {
        assert_eq!(density_bar(50, 10), "#####-----");
        assert_eq!(density_bar(140, 10), "##########");
        assert_eq!(density_bar(0, 4), "----");
    }

    #[test]
    fn test_empty_heatmap_is_placeholder() {
        assert_eq!(render_heatmap(&[]), "  Collecting data...\n");
    }

    #[test]
    fn test_heatmap_rows() {
        let cells = vec![HeatmapBucket {
            label: "12:00:15".to_string(),
            density: 60,
            risk_score: 5.0,
            risk_level: RiskLevel::Medium,
        }];
        let text = render_heatmap(&cells);

        assert!(text.contains("12:00:15"));
        assert!(text.contains("60%"));
        assert!(text.contains("Medium"));
        assert!(text.contains("#f59e0b"));
        assert!(text.contains("opacity 0.50"));
    }

    #[test]
    fn test_trend_needs_two_points() {
        assert_eq!(render_trend(&[]), PLACEHOLDER);
        assert_eq!(render_trend(&[point("12:00:00", 40)]), PLACEHOLDER);

        let text = render_trend(&[point("12:00:00", 0), point("12:00:02", 150)]);
        assert!(text.starts_with("▁█"));
        assert!(text.contains("12:00:00..12:00:02"));
        assert!(text.contains("min 0% avg 75% peak 150%"));
    }

    #[test]
    fn test_cards_without_snapshot() {
        let text = render_cards(None, 5);

        assert!(text.contains("People Count       — of 5 capacity"));
        assert!(text.contains("Density            0%"));
        assert!(text.contains("Risk Level         Error"));
        assert!(text.contains("Score: —"));
        assert!(text.contains("Surge Alert        None"));
    }

    #[test]
    fn test_cards_with_snapshot() {
        let text = render_cards(Some(&measurement(0.8)), 5);

        assert!(text.contains("4 of 5 capacity"));
        assert!(text.contains("80%"));
        assert!(text.contains("High (#f97316)  Score: 3.46"));
        assert!(text.contains("+2 persons / window"));
        assert!(text.contains("12s  CRITICAL — sustained overload"));
        assert!(text.contains("ACTIVE"));
    }

    #[test]
    fn test_banners() {
        let mut view = empty_view();
        assert!(!render_text(&view, &opts()).contains("offline"));

        view.connection = ConnectionState::Degraded;
        view.snapshot = Some(measurement(1.2));
        let text = render_text(&view, &opts());

        assert!(text.contains("AI service offline — retrying..."));
        assert!(text.contains("SURGE DETECTED"));
        assert!(text.contains("Density Trend (Last 2 Minutes)"));
        assert!(text.contains("Density Heatmap (Last 5 Minutes)"));
    }

    #[test]
    fn test_panel_sections_in_order() {
        let text = render_text(&empty_view(), &opts());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "AI Crowd Risk Monitor");
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("  People Count"));
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "Density Trend (Last 2 Minutes)");
        assert_eq!(lines[10], "  Collecting data...");
        assert_eq!(lines[11], "");
        assert_eq!(lines[12], "Density Heatmap (Last 5 Minutes)");
        assert_eq!(lines[13], "  Collecting data...");
        assert_eq!(lines.len(), 14);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_render_json_contract() {
        let view = empty_view();
        let json: serde_json::Value = serde_json::from_str(&render_json(&view).unwrap()).unwrap();

        assert!(json["snapshot"].is_null());
        assert_eq!(json["connection"], "Connected");
        assert!(json["trend"].as_array().unwrap().is_empty());
        assert!(json["heatmap"].as_array().unwrap().is_empty());
    }
}
