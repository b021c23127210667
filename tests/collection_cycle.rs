//! Full collection cycles against a `/proc/stat` file on disk.

use std::fs;
use std::path::Path;

use cpustat::catalog::QueryError;
use cpustat::collector::{CollectError, CollectorError, CollectorState, CpuCollector, RealFs};
use cpustat::config::CollectorConfig;

fn write_stat(proc_dir: &Path, content: &str) {
    fs::write(proc_dir.join("stat"), content).unwrap();
}

fn collector_for(proc_dir: &Path) -> CpuCollector<RealFs> {
    let config = CollectorConfig::from_pairs([("proc_path", proc_dir.to_string_lossy())]).unwrap();
    CpuCollector::new(RealFs::new(), &config).unwrap()
}

#[test]
fn two_cycles_produce_percentages() {
    let dir = tempfile::tempdir().unwrap();
    write_stat(dir.path(), "cpu  100 50 30 800 10 1 2 0 0 0\ncpu0 100 50 30 800 10 1 2 0 0 0\n");
    let collector = collector_for(dir.path());
    assert_eq!(collector.catalog().len(), 2 * 12 * 2);

    let first = collector
        .collect_metrics(&["intel/procfs/cpu/all/user_jiffies", "intel/procfs/cpu/all/user_percentage"])
        .unwrap();
    assert_eq!(first[0].value, Some(100.0));
    assert_eq!(first[1].value, None);
    assert_eq!(collector.state(), CollectorState::Warm);

    write_stat(dir.path(), "cpu  110 50 30 810 10 1 2 0 0 0\ncpu0 110 50 30 810 10 1 2 0 0 0\n");
    let second = collector
        .collect_metrics(&[
            "intel/procfs/cpu/all/user_jiffies",
            "intel/procfs/cpu/all/user_percentage",
            "intel/procfs/cpu/*/idle_percentage",
        ])
        .unwrap();

    let values: Vec<Option<f64>> = second.iter().map(|m| m.value).collect();
    assert_eq!(values, vec![Some(110.0), Some(50.0), Some(50.0), Some(50.0)]);
    assert_eq!(second[2].namespace, "intel/procfs/cpu/all/idle_percentage");
    assert_eq!(second[3].namespace, "intel/procfs/cpu/0/idle_percentage");
    assert_eq!(second[1].unit, "percent");
    assert_eq!(collector.cycles(), 2);
}

#[test]
fn missing_source_is_reported_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = CollectorConfig::new(dir.path().to_string_lossy());

    let err = CpuCollector::new(RealFs::new(), &config).err().unwrap();
    assert!(matches!(err, CollectError::SourceMissing(_)));
}

#[test]
fn malformed_cycle_keeps_previous_reading() {
    let dir = tempfile::tempdir().unwrap();
    write_stat(dir.path(), "cpu 100 0 0 100 0 0 0 0 0 0\n");
    let collector = collector_for(dir.path());
    collector.collect().unwrap();

    write_stat(dir.path(), "cpu 100 0 0\n");
    let err = collector
        .collect_metrics(&["intel/procfs/cpu/all/user_percentage"])
        .unwrap_err();
    assert!(matches!(err, CollectorError::Collect(CollectError::MalformedSource(_))));

    write_stat(dir.path(), "cpu 150 0 0 150 0 0 0 0 0 0\n");
    let metrics = collector
        .collect_metrics(&["intel/procfs/cpu/all/user_percentage"])
        .unwrap();
    assert_eq!(metrics[0].value, Some(50.0));
    assert_eq!(collector.cycles(), 2);
}

#[test]
fn unknown_metric_fails_whole_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_stat(dir.path(), "cpu 1 2 3 4 5 6 7 8 9 10\ncpu0 1 2 3 4 5 6 7 8 9 10\n");
    let collector = collector_for(dir.path());

    let err = collector
        .collect_metrics(&["intel/procfs/cpu/0/user_jiffies", "intel/procfs/cpu/4/user_jiffies"])
        .unwrap_err();
    assert!(matches!(err, CollectorError::Query(QueryError::NotFound(ref n)) if n == "intel/procfs/cpu/4/user_jiffies"));
    assert_eq!(collector.cycles(), 0);
}
