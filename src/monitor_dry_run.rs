use log::info;
use std::sync::Arc;
use studypulse::{
    init_logging, AlertThresholds, DependencyProber, HealthMonitor, HealthTracker,
    InMemoryMetricStore, LogDispatcher, MonitorConfig, MonitorLoop, SystemSampler, ThresholdEngine,
};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging("info", None)?;

    info!("Starting StudyPulse health monitor (dry-run mode)");

    let mut config = MonitorConfig::default();
    config.sample_interval = Duration::from_secs(5);
    config.thresholds = AlertThresholds::from_env();

    let store = Arc::new(InMemoryMetricStore::new());
    let tracker = Arc::new(HealthTracker::new(
        config.response_window_capacity,
        config.thresholds.response_time_ms,
    ));
    let sampler = Arc::new(SystemSampler::new(
        tracker.clone(),
        store.clone(),
        config.cpu_sample_window,
        config.store_timeout,
    ));
    let monitor = HealthMonitor::new(
        tracker.clone(),
        ThresholdEngine::new(config.thresholds.clone()),
        DependencyProber::new(config.dependencies.clone(), config.probe_timeout),
        store.clone(),
        config.store_timeout,
    );
    let monitor_loop = Arc::new(MonitorLoop::new(
        config.clone(),
        sampler,
        tracker.clone(),
        ThresholdEngine::new(config.thresholds.clone()),
        Arc::new(LogDispatcher),
    ));

    let loop_handle = {
        let task_loop = monitor_loop.clone();
        tokio::spawn(async move { task_loop.run().await })
    };

    println!(
        "Sampling host metrics every {:?}; three health reports follow.\n",
        config.sample_interval
    );

    for round in 1..=3 {
        sleep(config.sample_interval).await;

        // Simulate a little request traffic between reports
        tracker.record_response_time("/api/questions", 42.0).await;
        tracker.record_response_time("/api/answers", 18.5).await;

        let report = monitor.detailed_health().await;
        println!("--- health report {} ---", round);
        println!("{}\n", serde_json::to_string_pretty(&report)?);
    }

    monitor_loop.stop().await;
    loop_handle.await?;

    info!("Dry run complete");
    Ok(())
}
