//! Catalog of collectible metrics and batch lookups against computed results.
//!
//! The catalog is built once from the CPU identities discovered at startup
//! and holds one entry per CPU × category × representation. Its shape never
//! changes afterwards; only the values behind it do.

pub mod namespace;
pub mod resolve;

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::model::{Category, CpuId, Representation, Snapshot};
use crate::rates::UtilizationTree;

pub use namespace::{CpuSelector, MetricName, MetricQuery};
pub use resolve::QueryError;

/// One answered metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub namespace: String,
    /// `None` when the value is absent this cycle.
    pub value: Option<f64>,
    pub unit: &'static str,
    /// Unix timestamp (seconds) of the reading the value came from.
    pub timestamp: Option<i64>,
}

/// Description of a catalog entry, for discovery before any data exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDescriptor {
    pub namespace: String,
    pub unit: &'static str,
    pub description: String,
}

fn describe(category: Category, representation: Representation) -> String {
    match representation {
        Representation::Jiffies => format!("Cumulative {}", category.description()),
        Representation::Percentage => {
            format!("Share of elapsed time: {}", category.description())
        }
    }
}

/// Static set of addressable metric names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricCatalog {
    cpus: Vec<CpuId>,
    entries: BTreeSet<MetricName>,
}

impl MetricCatalog {
    /// Builds the catalog for the given CPU identities.
    pub fn build(cpus: impl IntoIterator<Item = CpuId>) -> Self {
        let cpus: BTreeSet<CpuId> = cpus.into_iter().collect();
        let entries = cpus
            .iter()
            .flat_map(|cpu| {
                Category::ALL.into_iter().flat_map(move |category| {
                    Representation::ALL
                        .into_iter()
                        .map(move |repr| MetricName::new(*cpu, category, repr))
                })
            })
            .collect();

        Self {
            cpus: cpus.into_iter().collect(),
            entries,
        }
    }

    /// Builds the catalog for every CPU in `snapshot`.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::build(snapshot.cpu_ids())
    }

    /// CPU identities, aggregate first.
    pub fn cpus(&self) -> &[CpuId] {
        &self.cpus
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &MetricName) -> bool {
        self.entries.contains(name)
    }

    /// Every entry, ordered by CPU, category, then representation.
    pub fn entries(&self) -> impl Iterator<Item = MetricName> + '_ {
        self.entries.iter().copied()
    }

    /// Every fully-qualified name.
    pub fn names(&self) -> Vec<String> {
        self.entries().map(|n| n.to_string()).collect()
    }

    pub fn descriptors(&self) -> Vec<MetricDescriptor> {
        self.entries()
            .map(|n| MetricDescriptor {
                namespace: n.to_string(),
                unit: n.representation.unit(),
                description: describe(n.category, n.representation),
            })
            .collect()
    }

    /// Names with `*` in the CPU position, one per category × representation.
    pub fn dynamic_names() -> Vec<String> {
        Category::ALL
            .into_iter()
            .flat_map(|c| {
                Representation::ALL
                    .into_iter()
                    .map(move |r| namespace::dynamic_name(c, r))
            })
            .collect()
    }

    /// Resolves one requested name to catalog entries.
    ///
    /// A concrete name yields one entry; a wildcard name yields one entry per
    /// CPU in catalog order.
    pub fn expand(&self, name: &str) -> Result<Vec<MetricName>, QueryError> {
        let query = MetricQuery::parse(name)?;
        match query.cpu {
            CpuSelector::Any => Ok(self
                .cpus
                .iter()
                .map(|cpu| MetricName::new(*cpu, query.category, query.representation))
                .collect()),
            CpuSelector::One(cpu) => {
                let entry = MetricName::new(cpu, query.category, query.representation);
                if self.contains(&entry) {
                    Ok(vec![entry])
                } else {
                    Err(QueryError::NotFound(name.to_string()))
                }
            }
        }
    }

    /// Expands a batch, preserving request order. Any invalid name fails the
    /// whole batch.
    pub fn expand_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<MetricName>, QueryError> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            out.extend(self.expand(name.as_ref())?);
        }
        Ok(out)
    }

    /// Looks up the value of a catalog entry in `tree`.
    ///
    /// No tree yet, or a CPU that vanished from the latest reading, gives an
    /// absent value.
    pub fn resolve(
        &self,
        name: &MetricName,
        tree: Option<&UtilizationTree>,
    ) -> Result<Option<f64>, QueryError> {
        if !self.contains(name) {
            return Err(QueryError::NotFound(name.to_string()));
        }
        let Some(tree) = tree else {
            return Ok(None);
        };
        match resolve::resolve(tree, &name.path()) {
            Err(QueryError::NotFound(_)) if tree.get(name.cpu).is_none() => {
                debug!(cpu = %name.cpu, "cpu missing from latest reading");
                Ok(None)
            }
            other => other,
        }
    }

    /// Answers already-expanded entries against `tree`.
    pub fn answer(
        &self,
        entries: &[MetricName],
        tree: Option<&UtilizationTree>,
    ) -> Result<Vec<Metric>, QueryError> {
        let timestamp = tree.map(|t| t.collected_at);
        entries
            .iter()
            .map(|name| {
                Ok(Metric {
                    namespace: name.to_string(),
                    value: self.resolve(name, tree)?,
                    unit: name.representation.unit(),
                    timestamp,
                })
            })
            .collect()
    }

    /// Expands and answers a batch of names against `tree`.
    pub fn query<S: AsRef<str>>(
        &self,
        names: &[S],
        tree: Option<&UtilizationTree>,
    ) -> Result<Vec<Metric>, QueryError> {
        let entries = self.expand_all(names)?;
        self.answer(&entries, tree)
    }
}
