//! CPU utilization collector for Linux.
//!
//! This module reads per-CPU counters from the `/proc` filesystem and turns
//! consecutive readings into jiffies and percentages, with support for
//! mocking the filesystem in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CpuCollector                         │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │     StatReader      │   │   RetainedState + rates     │  │
//! │  │  - /proc/stat       │──▶│  - previous reading         │  │
//! │  │  - cpu lines only   │   │  - UtilizationTree          │  │
//! │  └──────────┬──────────┘   └──────────────┬──────────────┘  │
//! │             │                             │                 │
//! │      ┌──────▼──────┐               ┌──────▼──────┐          │
//! │      │  FileSystem │ (trait)       │MetricCatalog│          │
//! │      └──────┬──────┘               └─────────────┘          │
//! └─────────────┼───────────────────────────────────────────────┘
//!               │
//!       ┌───────┼───────────────┐
//!       │                       │
//! ┌─────▼─────┐          ┌──────▼──────┐
//! │  RealFs   │          │   MockFs    │
//! │  (Linux)  │          │ + Scenarios │
//! └───────────┘          └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cpustat::collector::{CpuCollector, RealFs};
//! use cpustat::config::CollectorConfig;
//!
//! let collector = CpuCollector::new(RealFs::new(), &CollectorConfig::default())?;
//! collector.collect()?;
//! let metrics = collector.collect_metrics(&["intel/procfs/cpu/*/user_percentage"])?;
//! ```

mod collector;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::{CollectorError, CollectorState, CpuCollector, CycleTiming};
pub use mock::MockFs;
pub use procfs::{CollectError, StatReader};
pub use traits::{FileSystem, RealFs};
