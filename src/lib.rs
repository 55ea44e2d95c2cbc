//! Client-side telemetry pipeline for a crowd-density dashboard.
//!
//! Three independent poll loops read a detection service and publish the
//! latest measurement, the connection state, a short density trend and a
//! bucketed density heatmap as immutable values.

pub mod analyzers;
pub mod config;
pub mod connection;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod measurement;
pub mod output;
pub mod parser;
pub mod poller;
pub mod services;

pub use config::DashboardConfig;
pub use connection::ConnectionState;
pub use dashboard::{Dashboard, DashboardView};
pub use error::SourceError;
pub use measurement::{Measurement, RiskLevel};
