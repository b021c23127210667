//! cpustatd - CPU utilization collector daemon.
//!
//! Reads `/proc/stat` at a fixed interval and prints the requested metrics
//! as JSON lines or plain text.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use cpustat::catalog::{Metric, MetricCatalog, MetricDescriptor};
use cpustat::collector::{CpuCollector, RealFs};
use cpustat::config::CollectorConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One JSON array per cycle.
    Json,
    /// One `<namespace> <value>` line per metric.
    Text,
}

/// CPU utilization collector daemon.
#[derive(Parser, Debug)]
#[command(name = "cpustatd", about = "CPU utilization collector daemon", version)]
struct Args {
    /// Collection interval in seconds.
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Metric to collect; repeatable. `*` in the CPU position selects every CPU.
    /// Defaults to every metric in the catalog.
    #[arg(short, long = "metric", value_name = "NAME")]
    metrics: Vec<String>,

    /// Stop after this many cycles.
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print the metric catalog and exit.
    #[arg(long)]
    list: bool,

    /// With --list, print the wildcard form of each metric.
    #[arg(long, requires = "list")]
    dynamic: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["cpustatd", "cpustat"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Formats one metric as a text line; absent values print as `-`.
fn format_text(metric: &Metric) -> String {
    match metric.value {
        Some(value) => format!("{} {}", metric.namespace, value),
        None => format!("{} -", metric.namespace),
    }
}

fn format_descriptor(descriptor: &MetricDescriptor) -> String {
    format!(
        "{} [{}] {}",
        descriptor.namespace, descriptor.unit, descriptor.description
    )
}

fn print_metrics(metrics: &[Metric], format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string(metrics) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to encode metrics: {}", e),
        },
        OutputFormat::Text => {
            for metric in metrics {
                println!("{}", format_text(metric));
            }
        }
    }
}

fn print_catalog(catalog: &MetricCatalog, dynamic: bool, format: OutputFormat) {
    let encoded = match (format, dynamic) {
        (OutputFormat::Json, true) => serde_json::to_string(&MetricCatalog::dynamic_names()),
        (OutputFormat::Json, false) => serde_json::to_string(&catalog.descriptors()),
        (OutputFormat::Text, true) => {
            MetricCatalog::dynamic_names()
                .iter()
                .for_each(|n| println!("{}", n));
            return;
        }
        (OutputFormat::Text, false) => {
            catalog
                .descriptors()
                .iter()
                .for_each(|d| println!("{}", format_descriptor(d)));
            return;
        }
    };

    match encoded {
        Ok(line) => println!("{}", line),
        Err(e) => error!("Failed to encode catalog: {}", e),
    }
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = CollectorConfig::new(&args.proc_path);
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    let collector = match CpuCollector::new(RealFs::new(), &config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to start collector: {}", e);
            std::process::exit(1);
        }
    };

    if args.list {
        print_catalog(collector.catalog(), args.dynamic, args.format);
        return;
    }

    let names = if args.metrics.is_empty() {
        collector.catalog().names()
    } else {
        args.metrics.clone()
    };
    // Reject unknown names before the first cycle.
    let requested = match collector.catalog().expand_all(names.as_slice()) {
        Ok(entries) => entries.len(),
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    info!("cpustatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, proc={}, metrics={}",
        args.interval, args.proc_path, requested
    );

    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut cycles: u64 = 0;

    while running.load(Ordering::SeqCst) {
        match collector.collect_metrics(names.as_slice()) {
            Ok(metrics) => {
                print_metrics(&metrics, args.format);
                if let Some(timing) = collector.last_timing() {
                    debug!(
                        "Cycle #{}: {} metrics in {:?} (read {:?}, compute {:?})",
                        collector.cycles(),
                        metrics.len(),
                        timing.total,
                        timing.read,
                        timing.compute
                    );
                }
            }
            Err(e) => {
                error!("Failed to collect metrics: {}", e);
            }
        }

        cycles += 1;
        if args.count.is_some_and(|n| cycles >= n) {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!("Shutdown complete after {} cycles", cycles);
}
