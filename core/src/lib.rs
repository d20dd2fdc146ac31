//! insights-core: CSV-to-summary pipeline for order-generation trigger and
//! validation data.

pub mod aggregator;
pub mod config;
pub mod dedup;
pub mod error;
pub mod figure;
pub mod join;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod summary;
pub mod synth;
pub mod types;
pub mod warning;
