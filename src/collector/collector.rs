//! Collection cycle coordinator.
//!
//! `CpuCollector` owns the previous reading and runs one cycle at a time:
//! read `/proc/stat`, derive utilization against the retained reading,
//! commit the new reading, answer the requested metrics.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog::{Metric, MetricCatalog, QueryError};
use crate::collector::procfs::{CollectError, StatReader};
use crate::collector::traits::FileSystem;
use crate::config::CollectorConfig;
use crate::model::CpuId;
use crate::rates::{RetainedState, UtilizationTree, compute_utilization};

/// Error from a combined collect-and-answer call.
#[derive(Debug)]
pub enum CollectorError {
    /// The cycle failed; retained state is unchanged.
    Collect(CollectError),
    /// The batch named an unknown or non-numeric metric.
    Query(QueryError),
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::Collect(e) => write!(f, "collection failed: {}", e),
            CollectorError::Query(e) => write!(f, "query failed: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectorError::Collect(e) => Some(e),
            CollectorError::Query(e) => Some(e),
        }
    }
}

impl From<CollectError> for CollectorError {
    fn from(e: CollectError) -> Self {
        CollectorError::Collect(e)
    }
}

impl From<QueryError> for CollectorError {
    fn from(e: QueryError) -> Self {
        CollectorError::Query(e)
    }
}

/// Whether a previous reading is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// No successful cycle yet; percentages are unavailable.
    Uninitialized,
    /// A previous reading is retained.
    Warm,
}

/// Timing of the last successful cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CycleTiming {
    pub total: Duration,
    /// Time to read and parse `/proc/stat`.
    pub read: Duration,
    /// Time to derive utilization.
    pub compute: Duration,
}

#[derive(Debug, Default)]
struct CycleState {
    retained: Option<RetainedState>,
    cycles: u64,
    last_timing: Option<CycleTiming>,
    /// CPUs seen after startup, already reported once.
    uncatalogued: BTreeSet<CpuId>,
}

/// CPU utilization collector.
///
/// Cycles are serialized; lookups against the last committed result may
/// run concurrently with each other.
pub struct CpuCollector<F: FileSystem> {
    reader: StatReader<F>,
    catalog: MetricCatalog,
    cycle: Mutex<CycleState>,
    latest: RwLock<Option<Arc<UtilizationTree>>>,
}

impl<F: FileSystem> CpuCollector<F> {
    /// Creates a collector and builds its metric catalog.
    ///
    /// Reads `/proc/stat` once to discover CPU identities. That reading is
    /// not retained, so the first cycle still yields no percentages.
    pub fn new(fs: F, config: &CollectorConfig) -> Result<Self, CollectError> {
        let reader = StatReader::new(fs, &config.proc_path);
        if !reader.is_available() {
            return Err(CollectError::SourceMissing(
                reader.stat_path().display().to_string(),
            ));
        }

        let discovery = reader.read_snapshot()?;
        let catalog = MetricCatalog::from_snapshot(&discovery);
        info!(
            "Catalog: {} cpus, {} metrics from {}",
            catalog.cpus().len(),
            catalog.len(),
            reader.stat_path().display()
        );

        Ok(Self {
            reader,
            catalog,
            cycle: Mutex::new(CycleState::default()),
            latest: RwLock::new(None),
        })
    }

    fn lock_cycle(&self) -> MutexGuard<'_, CycleState> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn state(&self) -> CollectorState {
        if self.lock_cycle().retained.is_some() {
            CollectorState::Warm
        } else {
            CollectorState::Uninitialized
        }
    }

    /// Number of successful cycles.
    pub fn cycles(&self) -> u64 {
        self.lock_cycle().cycles
    }

    /// Returns timing information from the last successful cycle.
    pub fn last_timing(&self) -> Option<CycleTiming> {
        self.lock_cycle().last_timing
    }

    /// Result of the last successful cycle.
    pub fn latest(&self) -> Option<Arc<UtilizationTree>> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs one collection cycle.
    ///
    /// On failure nothing is committed: the retained reading and the latest
    /// result stay as they were.
    pub fn collect(&self) -> Result<Arc<UtilizationTree>, CollectError> {
        let mut cycle = self.lock_cycle();
        let start = Instant::now();

        let snapshot = match self.reader.read_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("Cycle aborted: {}", e);
                return Err(e);
            }
        };
        let read = start.elapsed();

        for cpu in snapshot.cpu_ids() {
            if self.catalog.cpus().binary_search(&cpu).is_err() && cycle.uncatalogued.insert(cpu) {
                warn!(cpu = %cpu, "cpu appeared after startup and is not in the catalog");
            }
        }

        let tree = Arc::new(compute_utilization(
            cycle.retained.as_ref(),
            &snapshot,
            Utc::now().timestamp(),
        ));
        let compute = start.elapsed().saturating_sub(read);

        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&tree));
        if cycle.retained.is_none() {
            debug!("first reading retained, percentages available from next cycle");
        }
        cycle.retained = Some(RetainedState::from_snapshot(snapshot));
        cycle.cycles += 1;
        cycle.last_timing = Some(CycleTiming {
            total: start.elapsed(),
            read,
            compute,
        });

        debug!(cycle = cycle.cycles, cpus = tree.len(), "cycle committed");
        Ok(tree)
    }

    /// Runs one cycle and answers `names` from its result.
    ///
    /// Names are checked against the catalog first; an invalid batch fails
    /// without running the cycle.
    pub fn collect_metrics<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Metric>, CollectorError> {
        let entries = self.catalog.expand_all(names)?;
        let tree = self.collect()?;
        Ok(self.catalog.answer(&entries, Some(tree.as_ref()))?)
    }

    /// Answers `names` from the last committed result without collecting.
    pub fn lookup<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Metric>, QueryError> {
        let tree = self.latest();
        self.catalog.query(names, tree.as_deref())
    }
}
