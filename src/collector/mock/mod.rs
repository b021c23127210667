//! Mock filesystem and `/proc/stat` fixtures for testing the collector
//! without a Linux `/proc`.

mod filesystem;
pub mod scenarios;

pub use filesystem::MockFs;
