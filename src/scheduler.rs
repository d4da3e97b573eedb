use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration, Instant};

use crate::alerts::AlertDispatcher;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::metrics::HealthTracker;
use crate::sampler::SystemSampler;
use crate::thresholds::ThresholdEngine;

/// Periodic monitoring loop
///
/// Drives the sample, evaluate, dispatch pipeline on a fixed interval.
/// Cycles run to completion before the next sleep, so two cycles can
/// never overlap; a slow cycle delays the next tick instead of stacking.
pub struct MonitorLoop {
    /// Configuration
    config: MonitorConfig,
    /// System sampler
    sampler: Arc<SystemSampler>,
    /// Shared health metrics handle
    tracker: Arc<HealthTracker>,
    /// Threshold engine
    engine: ThresholdEngine,
    /// Alert delivery
    dispatcher: Arc<dyn AlertDispatcher>,
    /// Running state
    running: Arc<RwLock<bool>>,
    /// Consecutive failed cycles
    consecutive_failures: Arc<RwLock<u32>>,
}

impl MonitorLoop {
    pub fn new(
        config: MonitorConfig,
        sampler: Arc<SystemSampler>,
        tracker: Arc<HealthTracker>,
        engine: ThresholdEngine,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Self {
        Self {
            config,
            sampler,
            tracker,
            engine,
            dispatcher,
            running: Arc::new(RwLock::new(false)),
            consecutive_failures: Arc::new(RwLock::new(0)),
        }
    }

    /// Start the monitoring loop
    ///
    /// The first cycle runs immediately; subsequent cycles run once per
    /// configured interval. Returns after [`stop`](Self::stop) is called.
    pub async fn run(&self) {
        info!(
            "Starting monitoring loop (interval: {:?})",
            self.config.sample_interval
        );

        // Set running state
        {
            let mut running = self.running.write().await;
            *running = true;
        }

        let mut last_cycle: Option<Instant> = None;

        while self.is_running().await {
            let now = Instant::now();
            let due = last_cycle
                .map(|t| now.duration_since(t) >= self.config.sample_interval)
                .unwrap_or(true);

            if due {
                if let Err(e) = self.run_cycle().await {
                    error!("Monitoring cycle failed: {}", e);
                    self.increment_failure_count().await;
                } else {
                    self.reset_failure_count().await;
                }
                last_cycle = Some(Instant::now());
            }

            // Small delay so stop() is honored promptly between cycles
            sleep(Duration::from_millis(25)).await;
        }

        info!("Monitoring loop stopped");
    }

    /// Stop the monitoring loop
    pub async fn stop(&self) {
        info!("Stopping monitoring loop");

        let mut running = self.running.write().await;
        *running = false;
    }

    /// Check if the loop is running
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Number of consecutive failed cycles, reset by the first success
    pub async fn consecutive_failures(&self) -> u32 {
        *self.consecutive_failures.read().await
    }

    /// Run one sample, evaluate, dispatch cycle
    pub async fn run_cycle(&self) -> Result<(), MonitorError> {
        let outcome = self.sampler.sample().await;

        let metrics = self.tracker.get_metrics().await;
        let alerts = self.engine.evaluate(&metrics);

        if !alerts.is_empty() {
            self.dispatcher.dispatch(&alerts).await;
        }

        debug!("Monitoring cycle complete: {} alert(s)", alerts.len());
        outcome
    }

    async fn increment_failure_count(&self) {
        let mut count = self.consecutive_failures.write().await;
        *count += 1;
    }

    async fn reset_failure_count(&self) {
        let mut count = self.consecutive_failures.write().await;
        *count = 0;
    }
}
