//! Reading CPU counters from the Linux `/proc` filesystem.

pub mod parser;
pub mod stat;

pub use parser::{ParseError, parse_cpu_stat};
pub use stat::{CollectError, StatReader};
