use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{Disks, System};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};

use crate::error::MonitorError;
use crate::metrics::HealthTracker;
use crate::store::MetricStore;

/// Samples host resource utilization and pushes it into the shared
/// metrics and the metric store
///
/// Every read and write fails softly: one failing metric never prevents
/// the others from being sampled, and storage failures leave the in-memory
/// metrics intact.
pub struct SystemSampler {
    tracker: Arc<HealthTracker>,
    store: Arc<dyn MetricStore>,
    /// Delay between the two CPU refreshes a utilization read needs
    cpu_sample_window: Duration,
    /// Timeout applied to each store call
    store_timeout: Duration,
    sys: Mutex<System>,
}

impl SystemSampler {
    pub fn new(
        tracker: Arc<HealthTracker>,
        store: Arc<dyn MetricStore>,
        cpu_sample_window: Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            tracker,
            store,
            cpu_sample_window,
            store_timeout,
            sys: Mutex::new(System::new()),
        }
    }

    /// Run one sampling pass: read CPU, memory, and disk utilization,
    /// update the shared metrics, append store samples, and refresh the
    /// active session count
    ///
    /// Always attempts every step. Returns the first failure encountered
    /// so the scheduler can count failed cycles; partial results are still
    /// applied.
    pub async fn sample(&self) -> Result<(), MonitorError> {
        let recorded_at = Utc::now();
        let mut first_failure: Option<MonitorError> = None;

        match self.read_cpu_percent().await {
            Ok(cpu) => {
                self.tracker.set_cpu_percent(cpu).await;
                if let Err(e) = self
                    .store_sample("cpu_percent", cpu, "percent", recorded_at)
                    .await
                {
                    first_failure.get_or_insert(e);
                }
            }
            Err(e) => {
                warn!("CPU sampling failed: {}", e);
                first_failure.get_or_insert(e);
            }
        }

        match self.read_memory_percent().await {
            Ok(memory) => {
                self.tracker.set_memory_percent(memory).await;
                if let Err(e) = self
                    .store_sample("memory_percent", memory, "percent", recorded_at)
                    .await
                {
                    first_failure.get_or_insert(e);
                }
            }
            Err(e) => {
                warn!("Memory sampling failed: {}", e);
                first_failure.get_or_insert(e);
            }
        }

        match self.read_disk_percent() {
            Ok(disk) => {
                self.tracker.set_disk_percent(disk).await;
                if let Err(e) = self
                    .store_sample("disk_percent", disk, "percent", recorded_at)
                    .await
                {
                    first_failure.get_or_insert(e);
                }
            }
            Err(e) => {
                warn!("Disk sampling failed: {}", e);
                first_failure.get_or_insert(e);
            }
        }

        match timeout(self.store_timeout, self.store.active_connection_count()).await {
            Ok(Ok(sessions)) => {
                self.tracker.set_active_connections(sessions).await;
            }
            Ok(Err(e)) => {
                // Keep the previous count rather than zeroing it
                warn!("Active session refresh failed: {}", e);
                first_failure.get_or_insert(e);
            }
            Err(_) => {
                warn!(
                    "Active session refresh timed out after {:?}",
                    self.store_timeout
                );
                first_failure.get_or_insert(MonitorError::StorageUnavailable(format!(
                    "session count timed out after {:?}",
                    self.store_timeout
                )));
            }
        }

        debug!("Sampling pass complete");

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Read CPU utilization over the configured measurement window
    ///
    /// A single refresh yields a meaningless instantaneous value, so the
    /// read refreshes twice with a delay in between.
    pub async fn read_cpu_percent(&self) -> Result<f64, MonitorError> {
        let mut sys = self.sys.lock().await;
        sys.refresh_cpu();
        sleep(self.cpu_sample_window).await;
        sys.refresh_cpu();

        let usage = sys.global_cpu_info().cpu_usage() as f64;
        if usage.is_finite() {
            Ok(usage)
        } else {
            Err(MonitorError::SamplingFailure(
                "CPU usage reading is not finite".to_string(),
            ))
        }
    }

    /// Read memory utilization as used/total percent
    pub async fn read_memory_percent(&self) -> Result<f64, MonitorError> {
        let mut sys = self.sys.lock().await;
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Err(MonitorError::SamplingFailure(
                "total memory reported as zero".to_string(),
            ));
        }

        Ok(sys.used_memory() as f64 / total as f64 * 100.0)
    }

    /// Read disk utilization for the root mount, falling back to the
    /// largest visible disk
    pub fn read_disk_percent(&self) -> Result<f64, MonitorError> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == Path::new("/"))
            .or_else(|| disks.list().iter().max_by_key(|d| d.total_space()))
            .ok_or_else(|| MonitorError::SamplingFailure("no disks visible".to_string()))?;

        let total = disk.total_space();
        if total == 0 {
            return Err(MonitorError::SamplingFailure(
                "disk reports zero total space".to_string(),
            ));
        }

        let used = total.saturating_sub(disk.available_space());
        Ok(used as f64 / total as f64 * 100.0)
    }

    async fn store_sample(
        &self,
        name: &str,
        value: f64,
        unit: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), MonitorError> {
        match timeout(
            self.store_timeout,
            self.store.insert_metric(name, value, unit, recorded_at),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                warn!("Failed to store {} sample: {}", name, e);
                Err(e)
            }
            Err(_) => {
                warn!(
                    "Storing {} sample timed out after {:?}",
                    name, self.store_timeout
                );
                Err(MonitorError::StorageUnavailable(format!(
                    "{} write timed out after {:?}",
                    name, self.store_timeout
                )))
            }
        }
    }
}
