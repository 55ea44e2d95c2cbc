//! Measurement aggregation for the dashboard.
//!
//! Turns raw, irregularly-sampled series into the trend line and the
//! fixed-width density heatmap.

pub mod heatmap;
pub mod trend;
pub mod types;
pub mod utility;
