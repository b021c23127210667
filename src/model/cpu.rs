//! CPU time counters collected from `/proc/stat`.
//!
//! The kernel exposes cumulative tick counters (jiffies) per CPU: one
//! aggregate line (`cpu`) followed by one line per logical core (`cpu0`,
//! `cpu1`, ...). Each line carries ten counters in a fixed order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of tick counters on every CPU line of `/proc/stat`.
pub const COUNTER_FIELDS: usize = 10;

/// Identity of a CPU line.
///
/// `All` is the aggregate line and sorts before every core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CpuId {
    /// Aggregate of all cores (`cpu` line, exposed as `all`).
    All,
    /// A single logical core (`cpuN` line, exposed as `N`).
    Core(u32),
}

impl CpuId {
    /// Namespace token for the aggregate identity.
    pub const ALL_TOKEN: &'static str = "all";
}

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuId::All => f.write_str(Self::ALL_TOKEN),
            CpuId::Core(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for CpuId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::ALL_TOKEN {
            return Ok(CpuId::All);
        }
        // Core ids are canonical decimal: digits only, no zero padding.
        let padded = s.len() > 1 && s.starts_with('0');
        if s.is_empty() || padded || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid cpu id '{}'", s));
        }
        s.parse()
            .map(CpuId::Core)
            .map_err(|_| format!("invalid cpu id '{}'", s))
    }
}

/// CPU time category.
///
/// The first ten variants mirror the `/proc/stat` columns in order; `Active`
/// and `Utilization` are derived from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    User,
    Nice,
    System,
    Idle,
    Iowait,
    Irq,
    Softirq,
    Steal,
    Guest,
    GuestNice,
    /// Every category except idle.
    Active,
    /// Every category.
    Utilization,
}

impl Category {
    /// Kernel-defined categories, in `/proc/stat` column order.
    pub const BASE: [Category; COUNTER_FIELDS] = [
        Category::User,
        Category::Nice,
        Category::System,
        Category::Idle,
        Category::Iowait,
        Category::Irq,
        Category::Softirq,
        Category::Steal,
        Category::Guest,
        Category::GuestNice,
    ];

    /// Every category, base first, then the derived aggregates.
    pub const ALL: [Category; 12] = [
        Category::User,
        Category::Nice,
        Category::System,
        Category::Idle,
        Category::Iowait,
        Category::Irq,
        Category::Softirq,
        Category::Steal,
        Category::Guest,
        Category::GuestNice,
        Category::Active,
        Category::Utilization,
    ];

    /// Position in [`Category::ALL`]; for base categories this is also the
    /// `/proc/stat` column.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_derived(self) -> bool {
        matches!(self, Category::Active | Category::Utilization)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::User => "user",
            Category::Nice => "nice",
            Category::System => "system",
            Category::Idle => "idle",
            Category::Iowait => "iowait",
            Category::Irq => "irq",
            Category::Softirq => "softirq",
            Category::Steal => "steal",
            Category::Guest => "guest",
            Category::GuestNice => "guest_nice",
            Category::Active => "active",
            Category::Utilization => "utilization",
        }
    }

    /// Human-readable description used by metric descriptors.
    pub fn description(self) -> &'static str {
        match self {
            Category::User => "time spent in user mode",
            Category::Nice => "time spent in user mode with low priority",
            Category::System => "time spent in kernel mode",
            Category::Idle => "time spent idle",
            Category::Iowait => "time waiting for I/O to complete",
            Category::Irq => "time servicing hardware interrupts",
            Category::Softirq => "time servicing software interrupts",
            Category::Steal => "time stolen by the hypervisor",
            Category::Guest => "time spent running a guest OS",
            Category::GuestNice => "time spent running a niced guest OS",
            Category::Active => "time spent in all states except idle",
            Category::Utilization => "time spent in all states",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// How a metric value is exposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// Raw cumulative tick count.
    Jiffies,
    /// Share of elapsed ticks since the previous cycle.
    Percentage,
}

impl Representation {
    pub const ALL: [Representation; 2] = [Representation::Jiffies, Representation::Percentage];

    pub fn as_str(self) -> &'static str {
        match self {
            Representation::Jiffies => "jiffies",
            Representation::Percentage => "percentage",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Representation::Jiffies => "jiffies",
            Representation::Percentage => "percent",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Representation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Representation::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown representation '{}'", s))
    }
}

/// Ten cumulative tick counters of one CPU at one point in time.
///
/// Source: one CPU line of `/proc/stat`, columns 1..=10.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct CounterSet {
    values: [u64; COUNTER_FIELDS],
}

impl CounterSet {
    pub fn new(values: [u64; COUNTER_FIELDS]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[u64; COUNTER_FIELDS] {
        &self.values
    }

    /// Sum of all ten counters.
    pub fn total(&self) -> u64 {
        self.values.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// Counter value for `category`; derived categories are summed on the fly.
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Active => self.total().saturating_sub(self.values[Category::Idle.index()]),
            Category::Utilization => self.total(),
            base => self.values[base.index()],
        }
    }
}

/// One reading of `/proc/stat`: counters per CPU identity.
///
/// Produced fresh every cycle and never mutated afterwards.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Snapshot {
    cpus: BTreeMap<CpuId, CounterSet>,
}

impl Snapshot {
    pub fn new(cpus: BTreeMap<CpuId, CounterSet>) -> Self {
        Self { cpus }
    }

    pub fn get(&self, cpu: CpuId) -> Option<&CounterSet> {
        self.cpus.get(&cpu)
    }

    /// CPU identities in order: aggregate first, then cores ascending.
    pub fn cpu_ids(&self) -> impl Iterator<Item = CpuId> + '_ {
        self.cpus.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CpuId, &CounterSet)> + '_ {
        self.cpus.iter().map(|(id, counters)| (*id, counters))
    }

    pub fn len(&self) -> usize {
        self.cpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cpus.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_id_round_trips_through_namespace_token() {
        assert_eq!("all".parse::<CpuId>().unwrap(), CpuId::All);
        assert_eq!("12".parse::<CpuId>().unwrap(), CpuId::Core(12));
        assert_eq!(CpuId::All.to_string(), "all");
        assert_eq!(CpuId::Core(3).to_string(), "3");
        assert!("cpu0".parse::<CpuId>().is_err());
        assert!("-1".parse::<CpuId>().is_err());
        assert!("".parse::<CpuId>().is_err());
        assert_eq!("0".parse::<CpuId>().unwrap(), CpuId::Core(0));
        assert!("00".parse::<CpuId>().is_err());
        assert!("07".parse::<CpuId>().is_err());
    }

    #[test]
    fn aggregate_sorts_before_cores() {
        let mut ids = vec![CpuId::Core(1), CpuId::All, CpuId::Core(0)];
        ids.sort();
        assert_eq!(ids, vec![CpuId::All, CpuId::Core(0), CpuId::Core(1)]);
    }

    #[test]
    fn category_names() {
        assert_eq!(Category::GuestNice.as_str(), "guest_nice");
        assert_eq!("softirq".parse::<Category>().unwrap(), Category::Softirq);
        assert_eq!("utilization".parse::<Category>().unwrap(), Category::Utilization);
        assert!("bogus".parse::<Category>().is_err());
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
        assert!(Category::Active.is_derived());
        assert!(!Category::Idle.is_derived());
    }

    #[test]
    fn derived_counters() {
        let c = CounterSet::new([100, 50, 30, 800, 10, 1, 2, 0, 0, 0]);
        assert_eq!(c.total(), 993);
        assert_eq!(c.get(Category::User), 100);
        assert_eq!(c.get(Category::Idle), 800);
        assert_eq!(c.get(Category::Active), 193);
        assert_eq!(c.get(Category::Utilization), 993);
    }

    #[test]
    fn representation_units() {
        assert_eq!(Representation::Jiffies.unit(), "jiffies");
        assert_eq!(Representation::Percentage.unit(), "percent");
        assert_eq!(
            "percentage".parse::<Representation>().unwrap(),
            Representation::Percentage
        );
        assert!("ratio".parse::<Representation>().is_err());
    }
}
