//! CLI entry point for the crowdwatch dashboard.
//!
//! Provides subcommands for running the live dashboard, reading a single
//! snapshot, and inspecting the trend and heatmap for a look-back window.

use anyhow::Result;
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand};
use crowdwatch::analyzers::heatmap::build_buckets;
use crowdwatch::analyzers::trend::trend_points;
use crowdwatch::config::{DEFAULT_BASE_URL, validate_lookback, validate_period};
use crowdwatch::connection::{ConnectionState, PollOutcome, update_connection};
use crowdwatch::fetch::BasicClient;
use crowdwatch::infra::detector::DetectorClient;
use crowdwatch::output::{PanelOptions, render_cards, render_heatmap, render_json, render_text};
use crowdwatch::services::measurement_api::MeasurementApi;
use crowdwatch::{Dashboard, DashboardConfig, Measurement};
use std::ffi::OsStr;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "crowdwatch")]
#[command(about = "Live crowd density dashboard for a monitored zone", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ServiceArgs {
    /// Base URL of the detection service
    #[arg(long, env = "CROWDWATCH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Number of people the zone is rated for
    #[arg(long, default_value_t = 5)]
    capacity: u32,

    /// Print JSON instead of the text panel
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the detection service and render the dashboard until Ctrl+C
    Watch {
        #[command(flatten)]
        service: ServiceArgs,

        /// Seconds between snapshot polls
        #[arg(long, default_value_t = 2)]
        snapshot_secs: u64,

        /// Seconds between trend polls
        #[arg(long, default_value_t = 5)]
        trend_secs: u64,

        /// Seconds between heatmap polls
        #[arg(long, default_value_t = 10)]
        heatmap_secs: u64,

        /// Look-back window of the trend line, in minutes
        #[arg(long, default_value_t = 2)]
        trend_minutes: u32,

        /// Look-back window of the heatmap, in minutes
        #[arg(long, default_value_t = 5)]
        heatmap_minutes: u32,

        /// Seconds between renders of the panel
        #[arg(long, default_value_t = 2)]
        render_secs: u64,
    },
    /// Fetch and render the current snapshot once
    Snapshot {
        #[command(flatten)]
        service: ServiceArgs,
    },
    /// Fetch a look-back window and print its trend points and heatmap
    History {
        #[command(flatten)]
        service: ServiceArgs,

        /// Look-back window in minutes
        #[arg(short, long, default_value_t = 5)]
        minutes: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/crowdwatch.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("crowdwatch.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            service,
            snapshot_secs,
            trend_secs,
            heatmap_secs,
            trend_minutes,
            heatmap_minutes,
            render_secs,
        } => {
            let config = DashboardConfig {
                base_url: service.base_url.clone(),
                snapshot_period: Duration::from_secs(snapshot_secs),
                trend_period: Duration::from_secs(trend_secs),
                heatmap_period: Duration::from_secs(heatmap_secs),
                trend_lookback_minutes: trend_minutes,
                heatmap_lookback_minutes: heatmap_minutes,
                capacity: service.capacity,
            };
            let render_period = Duration::from_secs(render_secs);
            validate_period("render_period", render_period)?;
            watch(config, render_period, service.json).await?;
        }
        Commands::Snapshot { service } => {
            snapshot_once(&service).await?;
        }
        Commands::History { service, minutes } => {
            validate_lookback(minutes)?;
            history_once(&service, minutes).await?;
        }
    }

    Ok(())
}

fn detector(base_url: &str) -> DetectorClient<BasicClient> {
    DetectorClient::new(BasicClient::new(), base_url)
}

fn emit(text: &str, clear: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if clear {
        stdout.write_all(b"\x1B[2J\x1B[H")?;
    }
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

/// Runs the dashboard loops and renders the view on a fixed cadence.
#[tracing::instrument(skip(config), fields(base_url = %config.base_url))]
async fn watch(config: DashboardConfig, render_period: Duration, json: bool) -> Result<()> {
    let client = detector(&config.base_url);
    let opts = PanelOptions {
        capacity: config.capacity,
        trend_minutes: config.trend_lookback_minutes,
        heatmap_minutes: config.heatmap_lookback_minutes,
        video_feed_url: Some(client.video_feed_url()),
    };
    let api: Arc<dyn MeasurementApi> = Arc::new(client);
    let dashboard = Dashboard::spawn(api, config)?;

    let clear = !json && std::io::stdout().is_terminal();
    let mut ticker = tokio::time::interval(render_period);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(render_secs = render_period.as_secs(), "Rendering dashboard. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let view = dashboard.view();
                let text = if json {
                    render_json(&view)?
                } else {
                    render_text(&view, &opts)
                };
                emit(&text, clear)?;
            }
            _ = &mut ctrl_c => {
                info!("Ctrl+C received, stopping");
                break;
            }
        }
    }

    dashboard.shutdown().await;
    Ok(())
}

/// Fetches one snapshot, substituting the fallback if the service is down.
#[tracing::instrument(skip(service), fields(base_url = %service.base_url))]
async fn snapshot_once(service: &ServiceArgs) -> Result<()> {
    let client = detector(&service.base_url);

    let result = client.fetch_snapshot().await;
    let connection = update_connection(ConnectionState::default(), PollOutcome::from(&result));
    let measurement = result.unwrap_or_else(|e| {
        warn!(error = %e, "Snapshot fetch failed, showing fallback");
        Measurement::fallback(Utc::now())
    });

    let text = if service.json {
        serde_json::to_string_pretty(&serde_json::json!({
            "snapshot": measurement,
            "connection": connection,
        }))?
    } else {
        let mut text = String::new();
        if connection.is_degraded() {
            text.push_str("[!] AI service offline\n");
        }
        text.push_str(&render_cards(Some(&measurement), service.capacity));
        text
    };
    emit(&text, false)
}

/// Fetches one look-back window and prints the derived series.
#[tracing::instrument(skip(service), fields(base_url = %service.base_url))]
async fn history_once(service: &ServiceArgs, minutes: u32) -> Result<()> {
    let client = detector(&service.base_url);

    let rows = client.fetch_series(minutes).await?;
    info!(rows = rows.len(), minutes, "Series fetched");

    let points = trend_points(&rows, &Local);
    let buckets = build_buckets(&rows, &Local);

    let text = if service.json {
        serde_json::to_string_pretty(&serde_json::json!({
            "trend": points,
            "heatmap": buckets,
        }))?
    } else {
        let mut text = format!("Trend ({} points)\n", points.len());
        for p in &points {
            text.push_str(&format!(
                "  {}  {:>4}%  {}\n",
                p.time, p.density_pct, p.measurement.risk_level
            ));
        }
        text.push_str(&format!("Heatmap ({} buckets)\n", buckets.len()));
        text.push_str(&render_heatmap(&buckets));
        text
    };
    emit(&text, false)
}
