//! Data model shared by the reader, the differencing engine and the catalog.

pub mod cpu;

pub use cpu::{COUNTER_FIELDS, Category, CounterSet, CpuId, Representation, Snapshot};
