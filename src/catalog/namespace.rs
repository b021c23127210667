//! Hierarchical metric names.
//!
//! A metric name is `intel/procfs/cpu/{cpu}/{category}_{representation}`,
//! e.g. `intel/procfs/cpu/all/user_percentage` or
//! `intel/procfs/cpu/3/guest_nice_jiffies`. Queries may put `*` in the CPU
//! position to select every CPU.

use std::fmt;

use crate::catalog::resolve::QueryError;
use crate::model::{Category, CpuId, Representation};

/// Leading namespace elements shared by every metric.
pub const PREFIX: [&str; 3] = ["intel", "procfs", "cpu"];

/// Namespace element separator.
pub const SEPARATOR: char = '/';

/// CPU element matching every CPU.
pub const WILDCARD: &str = "*";

/// Fully-qualified name of one collectible metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricName {
    pub cpu: CpuId,
    pub category: Category,
    pub representation: Representation,
}

impl MetricName {
    pub fn new(cpu: CpuId, category: Category, representation: Representation) -> Self {
        Self {
            cpu,
            category,
            representation,
        }
    }

    /// Last namespace element, e.g. `guest_nice_jiffies`.
    pub fn leaf(&self) -> String {
        leaf(self.category, self.representation)
    }

    /// Namespace elements below the prefix: `[cpu, leaf]`.
    pub fn path(&self) -> [String; 2] {
        [self.cpu.to_string(), self.leaf()]
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_name(f, &self.cpu, &self.leaf())
    }
}

/// Writes `PREFIX`, the CPU element and the leaf, separated by `SEPARATOR`.
fn write_name(out: &mut impl fmt::Write, cpu: &dyn fmt::Display, leaf: &str) -> fmt::Result {
    for segment in PREFIX {
        write!(out, "{}{}", segment, SEPARATOR)?;
    }
    write!(out, "{}{}{}", cpu, SEPARATOR, leaf)
}

/// Builds a leaf element from its parts.
pub fn leaf(category: Category, representation: Representation) -> String {
    format!("{}_{}", category.as_str(), representation.as_str())
}

/// Splits a leaf element into category and representation.
///
/// The representation is the text after the last `_`, so multi-word
/// categories such as `guest_nice` survive.
pub fn parse_leaf(leaf: &str) -> Option<(Category, Representation)> {
    let (category, representation) = leaf.rsplit_once('_')?;
    Some((category.parse().ok()?, representation.parse().ok()?))
}

/// Builds the wildcard form of a name, e.g. `intel/procfs/cpu/*/user_jiffies`.
pub fn dynamic_name(category: Category, representation: Representation) -> String {
    let mut name = String::new();
    // Writing into a String never fails.
    let _ = write_name(&mut name, &WILDCARD, &leaf(category, representation));
    name
}

/// CPU element of a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuSelector {
    /// `*`: every CPU in the catalog.
    Any,
    One(CpuId),
}

/// A parsed metric query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetricQuery {
    pub cpu: CpuSelector,
    pub category: Category,
    pub representation: Representation,
}

impl MetricQuery {
    /// Parses a fully-qualified name or its wildcard form.
    ///
    /// Fails with [`QueryError::NotFound`] when the name is not shaped like
    /// a metric of this collector. Only canonical names are accepted: no
    /// leading, trailing or doubled separators and no zero-padded core ids.
    pub fn parse(name: &str) -> Result<Self, QueryError> {
        let not_found = || QueryError::NotFound(name.to_string());

        let segments: Vec<&str> = name.split(SEPARATOR).collect();
        if segments.len() != PREFIX.len() + 2 || segments[..PREFIX.len()] != PREFIX {
            return Err(not_found());
        }

        let cpu = match segments[PREFIX.len()] {
            WILDCARD => CpuSelector::Any,
            token => CpuSelector::One(token.parse().map_err(|_| not_found())?),
        };
        let (category, representation) =
            parse_leaf(segments[PREFIX.len() + 1]).ok_or_else(not_found)?;

        Ok(Self {
            cpu,
            category,
            representation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_fully_qualified_name() {
        let name = MetricName::new(CpuId::All, Category::User, Representation::Percentage);
        assert_eq!(name.to_string(), "intel/procfs/cpu/all/user_percentage");

        let name = MetricName::new(CpuId::Core(3), Category::GuestNice, Representation::Jiffies);
        assert_eq!(name.to_string(), "intel/procfs/cpu/3/guest_nice_jiffies");
        assert_eq!(name.path(), ["3".to_string(), "guest_nice_jiffies".to_string()]);
    }

    #[test]
    fn parses_leaf_with_underscored_category() {
        assert_eq!(
            parse_leaf("guest_nice_percentage"),
            Some((Category::GuestNice, Representation::Percentage))
        );
        assert_eq!(
            parse_leaf("utilization_jiffies"),
            Some((Category::Utilization, Representation::Jiffies))
        );
        assert_eq!(parse_leaf("user"), None);
        assert_eq!(parse_leaf("user_ratio"), None);
        assert_eq!(parse_leaf("bogus_jiffies"), None);
    }

    #[test]
    fn parses_query() {
        let q = MetricQuery::parse("intel/procfs/cpu/1/softirq_jiffies").unwrap();
        assert_eq!(q.cpu, CpuSelector::One(CpuId::Core(1)));
        assert_eq!(q.category, Category::Softirq);
        assert_eq!(q.representation, Representation::Jiffies);

        let q = MetricQuery::parse("intel/procfs/cpu/*/active_percentage").unwrap();
        assert_eq!(q.cpu, CpuSelector::Any);
        assert_eq!(q.category, Category::Active);
    }

    #[test]
    fn rejects_malformed_queries() {
        for name in [
            "",
            "intel/procfs/cpu",
            "intel/procfs/cpu/all",
            "intel/procfs/mem/all/user_jiffies",
            "intel/procfs/cpu/cpu0/user_jiffies",
            "intel/procfs/cpu/all/user_jiffies/extra",
            "intel/procfs/cpu/all/steal_time_jiffies",
            "/intel/procfs/cpu/all/user_jiffies",
            "intel/procfs/cpu/all/user_jiffies/",
            "//intel/procfs/cpu/00/user_jiffies//",
            "intel//procfs/cpu/all/user_jiffies",
            "intel/procfs/cpu/00/user_jiffies",
            "intel/procfs/cpu/01/user_jiffies",
        ] {
            assert_eq!(
                MetricQuery::parse(name),
                Err(QueryError::NotFound(name.to_string())),
                "{}",
                name
            );
        }
    }

    #[test]
    fn parsed_name_formats_back_unchanged() {
        for name in [
            "intel/procfs/cpu/all/user_jiffies",
            "intel/procfs/cpu/0/guest_nice_percentage",
            "intel/procfs/cpu/10/idle_jiffies",
        ] {
            let q = MetricQuery::parse(name).unwrap();
            let CpuSelector::One(cpu) = q.cpu else {
                panic!("{} has no concrete cpu", name);
            };
            let formatted = MetricName::new(cpu, q.category, q.representation).to_string();
            assert_eq!(formatted, name);
        }
    }

    #[test]
    fn dynamic_name_uses_wildcard() {
        assert_eq!(
            dynamic_name(Category::Iowait, Representation::Percentage),
            "intel/procfs/cpu/*/iowait_percentage"
        );
    }
}
