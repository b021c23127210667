//! CPU utilization computation from two consecutive `/proc/stat` readings.
//!
//! Raw jiffies always reflect the current reading. Percentages need a
//! previous reading and are suppressed (`None`) whenever the counters moved
//! in a way that would make the share meaningless.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{Category, CounterSet, CpuId, Representation, Snapshot};

const CATEGORY_COUNT: usize = Category::ALL.len();

// ---------------------------------------------------------------------------
// Delta helpers
// ---------------------------------------------------------------------------

/// Compute u64 delta, returning `None` on counter regression.
pub fn du64(curr: u64, prev: u64) -> Option<u64> {
    curr.checked_sub(prev)
}

/// Share of `delta` in `total_delta`, in percent. `total_delta` must be > 0.
fn percent(delta: u64, total_delta: u64) -> f64 {
    100.0 * delta as f64 / total_delta as f64
}

// ---------------------------------------------------------------------------
// Retained state
// ---------------------------------------------------------------------------

/// The previous cycle's reading together with each CPU's counter total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetainedState {
    snapshot: Snapshot,
    totals: BTreeMap<CpuId, u64>,
}

impl RetainedState {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let totals = snapshot.iter().map(|(id, c)| (id, c.total())).collect();
        Self { snapshot, totals }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn total(&self, cpu: CpuId) -> Option<u64> {
        self.totals.get(&cpu).copied()
    }

    fn previous(&self, cpu: CpuId) -> Option<(&CounterSet, u64)> {
        Some((self.snapshot.get(cpu)?, self.total(cpu)?))
    }
}

// ---------------------------------------------------------------------------
// Result tree
// ---------------------------------------------------------------------------

/// Derived metrics of one CPU for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuUtilization {
    jiffies: [u64; CATEGORY_COUNT],
    percentage: [Option<f64>; CATEGORY_COUNT],
}

impl CpuUtilization {
    /// Jiffies from `counters`, no percentages.
    fn from_counters(counters: &CounterSet) -> Self {
        Self {
            jiffies: Category::ALL.map(|c| counters.get(c)),
            percentage: [None; CATEGORY_COUNT],
        }
    }

    pub fn jiffies(&self, category: Category) -> u64 {
        self.jiffies[category.index()]
    }

    pub fn percentage(&self, category: Category) -> Option<f64> {
        self.percentage[category.index()]
    }

    /// Value in the requested representation; jiffies are always present.
    pub fn value(&self, category: Category, representation: Representation) -> Option<f64> {
        match representation {
            Representation::Jiffies => Some(self.jiffies(category) as f64),
            Representation::Percentage => self.percentage(category),
        }
    }
}

/// Derived metrics of every CPU for one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilizationTree {
    /// Unix timestamp (seconds) of the reading.
    pub collected_at: i64,
    cpus: BTreeMap<CpuId, CpuUtilization>,
}

impl UtilizationTree {
    pub fn get(&self, cpu: CpuId) -> Option<&CpuUtilization> {
        self.cpus.get(&cpu)
    }

    pub fn cpu_ids(&self) -> impl Iterator<Item = CpuId> + '_ {
        self.cpus.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.cpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cpus.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Derives jiffies and percentages for every CPU in `curr`.
///
/// Percentages are `None` when there is no previous reading for the CPU,
/// when the CPU's counter total did not advance, or, per category, when that
/// category's counter went backwards. Derived categories use the delta of
/// their own sums.
pub fn compute_utilization(
    prev: Option<&RetainedState>,
    curr: &Snapshot,
    collected_at: i64,
) -> UtilizationTree {
    let cpus = curr
        .iter()
        .map(|(id, counters)| {
            let previous = prev.and_then(|p| p.previous(id));
            (id, cpu_utilization(id, previous, counters))
        })
        .collect();

    UtilizationTree { collected_at, cpus }
}

fn cpu_utilization(
    id: CpuId,
    prev: Option<(&CounterSet, u64)>,
    curr: &CounterSet,
) -> CpuUtilization {
    let mut out = CpuUtilization::from_counters(curr);
    let Some((prev, prev_total)) = prev else {
        return out;
    };

    let total_delta = match du64(curr.total(), prev_total) {
        Some(d) if d > 0 => d,
        _ => {
            debug!(cpu = %id, "cpu counter total did not advance, percentages suppressed");
            return out;
        }
    };

    for category in Category::ALL {
        let delta = du64(curr.get(category), prev.get(category));
        if delta.is_none() {
            debug!(cpu = %id, category = %category, "counter regressed, percentage suppressed");
        }
        out.percentage[category.index()] = delta.map(|d| percent(d, total_delta));
    }

    out
}
