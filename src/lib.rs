pub mod alerts;
pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod probe;
pub mod sampler;
pub mod scheduler;
pub mod store;
pub mod thresholds;

pub use alerts::{Alert, AlertDispatcher, LogDispatcher, MemoryDispatcher};
pub use config::{AlertThresholds, DependencyEndpoint, MonitorConfig};
pub use error::{MonitorError, Result};
pub use health::{
    DatabaseMetrics, DetailedHealth, HealthMonitor, HealthSnapshot, HealthStatus,
    PerformanceSummary, ResourceMetrics,
};
pub use metrics::{HealthMetrics, HealthTracker, ResponseTimeSample};
pub use probe::DependencyProber;
pub use sampler::SystemSampler;
pub use scheduler::MonitorLoop;
pub use store::{InMemoryMetricStore, MetricSample, MetricStore, TableSize};
pub use thresholds::ThresholdEngine;

/// Initialize logging with the given level, optionally teeing to a file
pub fn init_logging(
    level: &str,
    log_file: Option<&str>,
) -> std::result::Result<(), fern::InitError> {
    let level_filter = match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level_filter)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}
