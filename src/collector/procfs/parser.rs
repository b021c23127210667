//! Parser for the CPU lines of `/proc/stat`.

use crate::model::{COUNTER_FIELDS, CounterSet, CpuId, Snapshot};
use std::collections::BTreeMap;

/// Error returned when `/proc/stat` content cannot be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Line prefix shared by the aggregate and per-core lines.
const CPU_PREFIX: &str = "cpu";

/// Maps the first token of a line to a CPU identity.
///
/// `cpu` is the aggregate, `cpuN` is core N. Anything else (`intr`, `ctxt`,
/// or a `cpu` token with a non-numeric suffix) is not a CPU line and yields
/// `Ok(None)`. A numeric suffix that is not a valid core index is an error.
fn parse_cpu_token(token: &str) -> Result<Option<CpuId>, ParseError> {
    let Some(suffix) = token.strip_prefix(CPU_PREFIX) else {
        return Ok(None);
    };
    if suffix.is_empty() {
        return Ok(Some(CpuId::All));
    }
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    suffix
        .parse()
        .map(|n| Some(CpuId::Core(n)))
        .map_err(|_| ParseError::new(format!("{}: invalid cpu index", token)))
}

/// Parses the CPU lines of `/proc/stat` into a [`Snapshot`].
///
/// Every CPU line must carry exactly ten non-negative integer counters. One
/// bad line fails the whole read; no partial snapshot is returned. Content
/// without any CPU line is an error too.
pub fn parse_cpu_stat(content: &str) -> Result<Snapshot, ParseError> {
    let mut cpus = BTreeMap::new();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let Some(token) = parts.next() else {
            continue;
        };
        let Some(cpu_id) = parse_cpu_token(token)? else {
            continue;
        };

        let fields: Vec<&str> = parts.collect();
        if fields.len() != COUNTER_FIELDS {
            return Err(ParseError::new(format!(
                "{}: expected {} counters, got {}",
                token,
                COUNTER_FIELDS,
                fields.len()
            )));
        }

        let mut values = [0u64; COUNTER_FIELDS];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| {
                ParseError::new(format!("{}: invalid counter '{}'", token, field))
            })?;
        }

        if cpus.insert(cpu_id, CounterSet::new(values)).is_some() {
            return Err(ParseError::new(format!("{}: duplicate cpu line", token)));
        }
    }

    if cpus.is_empty() {
        return Err(ParseError::new("no cpu lines found"));
    }

    Ok(Snapshot::new(cpus))
}
