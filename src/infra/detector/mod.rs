//! HTTP adapter for the crowd detection service.

pub mod client;

pub use client::DetectorClient;
