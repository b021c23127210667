//! cpustat - per-CPU utilization metrics from the Linux `/proc` filesystem.
//!
//! Provides:
//! - `collector`: reading `/proc/stat` and running collection cycles
//! - `rates`: jiffies and percentages from consecutive readings
//! - `catalog`: hierarchical metric names and batch lookups
//! - `model`: CPU identities, categories and raw counters
//! - `config`: collector settings

pub mod catalog;
pub mod collector;
pub mod config;
pub mod model;
pub mod rates;
