//! Core library for the vperf exporter
//!
//! Polls a remote virtualization-management endpoint and republishes its
//! inventory and performance-counter telemetry as labeled gauges:
//! - cycle-safe traversal specifications over the inventory graph
//! - per-type sampling interval resolution with scrape-scoped caching
//! - per-entity query planning against the configured counter selection
//! - sample decoding into canonical metric records
//! - a resettable, timestamp-preserving gauge registry

pub mod config;
pub mod error;
pub mod gauges;
pub mod models;
pub mod pipeline;
pub mod scrape;
pub mod vim;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ExporterConfig, ObjectSelector, RootSelector};
pub use error::VimError;
pub use gauges::GaugeSet;
pub use models::{
    CounterCatalog, CounterInfo, CounterSelector, Entity, IntervalChoice, ManagedEntityType, Metric,
};
pub use scrape::Scraper;
pub use vim::{HttpVimApi, Session, SessionConfig, VimApi};
