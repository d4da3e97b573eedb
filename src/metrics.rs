use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A single observed response time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTimeSample {
    /// Request path the observation belongs to
    pub endpoint: String,
    /// Observed duration (milliseconds)
    pub duration_ms: f64,
    /// When the observation was recorded
    pub timestamp: DateTime<Utc>,
}

/// Process-wide health metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// CPU utilization (percent)
    pub cpu_percent: f64,
    /// Memory utilization (percent)
    pub memory_percent: f64,
    /// Disk utilization (percent)
    pub disk_percent: f64,
    /// Active backend sessions
    pub active_connections: u32,
    /// Recent response time observations, oldest first
    pub response_times: VecDeque<ResponseTimeSample>,
    /// Number of failed requests recorded
    pub error_count: u64,
    /// Last mutation time
    pub last_updated: DateTime<Utc>,
}

impl Default for HealthMetrics {
    fn default() -> Self {
        Self {
            cpu_percent: 0.0,
            memory_percent: 0.0,
            disk_percent: 0.0,
            active_connections: 0,
            response_times: VecDeque::new(),
            error_count: 0,
            last_updated: Utc::now(),
        }
    }
}

/// Shared handle for reading and mutating the health metrics
///
/// All mutations go through this handle so the response time window can
/// never be observed mid-eviction. The sampler writes the resource fields,
/// request handlers record response times and errors, and the aggregator
/// reads snapshots.
pub struct HealthTracker {
    /// Current metrics
    metrics: Arc<RwLock<HealthMetrics>>,
    /// Maximum number of retained response time samples
    window_capacity: usize,
    /// Duration above which a recorded response logs a warning (milliseconds)
    slow_threshold_ms: f64,
}

impl HealthTracker {
    /// Create a new tracker with the given window capacity and slow-call
    /// threshold
    pub fn new(window_capacity: usize, slow_threshold_ms: f64) -> Self {
        Self {
            metrics: Arc::new(RwLock::new(HealthMetrics::default())),
            window_capacity,
            slow_threshold_ms,
        }
    }

    /// Record a response time observation
    ///
    /// Evicts the oldest observations once the window exceeds its capacity.
    /// Logs a warning for responses slower than the configured threshold.
    pub async fn record_response_time(&self, endpoint: &str, duration_ms: f64) {
        let mut metrics = self.metrics.write().await;
        metrics.response_times.push_back(ResponseTimeSample {
            endpoint: endpoint.to_string(),
            duration_ms,
            timestamp: Utc::now(),
        });

        // Keep only the last N samples
        while metrics.response_times.len() > self.window_capacity {
            metrics.response_times.pop_front();
        }

        metrics.last_updated = Utc::now();

        if duration_ms > self.slow_threshold_ms {
            warn!("Slow response on {}: {:.1}ms", endpoint, duration_ms);
        }
    }

    /// Record a failed request
    pub async fn record_error(&self) {
        let mut metrics = self.metrics.write().await;
        metrics.error_count += 1;
        metrics.last_updated = Utc::now();
    }

    /// Update the CPU utilization reading
    pub async fn set_cpu_percent(&self, value: f64) {
        let mut metrics = self.metrics.write().await;
        metrics.cpu_percent = value;
        metrics.last_updated = Utc::now();
    }

    /// Update the memory utilization reading
    pub async fn set_memory_percent(&self, value: f64) {
        let mut metrics = self.metrics.write().await;
        metrics.memory_percent = value;
        metrics.last_updated = Utc::now();
    }

    /// Update the disk utilization reading
    pub async fn set_disk_percent(&self, value: f64) {
        let mut metrics = self.metrics.write().await;
        metrics.disk_percent = value;
        metrics.last_updated = Utc::now();
    }

    /// Update the active session count
    pub async fn set_active_connections(&self, value: u32) {
        let mut metrics = self.metrics.write().await;
        metrics.active_connections = value;
        metrics.last_updated = Utc::now();
    }

    /// Average of the retained response times, 0.0 if none recorded
    pub async fn average_ms(&self) -> f64 {
        let metrics = self.metrics.read().await;

        if metrics.response_times.is_empty() {
            return 0.0;
        }

        let total: f64 = metrics.response_times.iter().map(|s| s.duration_ms).sum();
        total / metrics.response_times.len() as f64
    }

    /// Percentile of the retained response times, 0.0 if none recorded
    ///
    /// Sorts a copy of the retained durations ascending and returns the
    /// element at index `floor(p * count)`, clamped to the last element.
    /// For p = 0.95 over 100 samples this is index 95.
    pub async fn percentile_ms(&self, p: f64) -> f64 {
        let metrics = self.metrics.read().await;

        if metrics.response_times.is_empty() {
            return 0.0;
        }

        let mut durations: Vec<f64> = metrics
            .response_times
            .iter()
            .map(|s| s.duration_ms)
            .collect();
        durations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let index = ((p * durations.len() as f64).floor() as usize).min(durations.len() - 1);
        durations[index]
    }

    /// Number of retained observations slower than the given threshold
    pub async fn slow_request_count(&self, threshold_ms: f64) -> usize {
        let metrics = self.metrics.read().await;
        metrics
            .response_times
            .iter()
            .filter(|s| s.duration_ms > threshold_ms)
            .count()
    }

    /// Number of retained observations
    pub async fn total_requests(&self) -> usize {
        let metrics = self.metrics.read().await;
        metrics.response_times.len()
    }

    /// Get a copy of the current metrics
    pub async fn get_metrics(&self) -> HealthMetrics {
        let metrics = self.metrics.read().await;
        metrics.clone()
    }

    /// Reset all metrics
    pub async fn reset_metrics(&self) {
        let mut metrics = self.metrics.write().await;
        *metrics = HealthMetrics::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_metrics_default() {
        let metrics = HealthMetrics::default();

        assert_eq!(metrics.cpu_percent, 0.0);
        assert_eq!(metrics.memory_percent, 0.0);
        assert_eq!(metrics.disk_percent, 0.0);
        assert_eq!(metrics.active_connections, 0);
        assert!(metrics.response_times.is_empty());
        assert_eq!(metrics.error_count, 0);
    }

    #[tokio::test]
    async fn test_window_evicts_oldest_beyond_capacity() {
        let tracker = HealthTracker::new(100, 5000.0);

        for i in 0..150 {
            tracker
                .record_response_time("/api/questions", i as f64)
                .await;
        }

        let metrics = tracker.get_metrics().await;
        assert_eq!(metrics.response_times.len(), 100);

        // The first 50 observations were evicted; the last 100 survive
        // in their original relative order
        assert_eq!(metrics.response_times.front().unwrap().duration_ms, 50.0);
        assert_eq!(metrics.response_times.back().unwrap().duration_ms, 149.0);
    }

    #[tokio::test]
    async fn test_percentile_picks_index_95_of_100() {
        let tracker = HealthTracker::new(200, 5000.0);

        // Record 100 values in shuffled insertion order; the percentile
        // sorts a copy, so insertion order must not matter
        for i in (0..100).rev() {
            tracker.record_response_time("/api/answers", i as f64).await;
        }

        assert_eq!(tracker.percentile_ms(0.95).await, 95.0);
        assert_eq!(tracker.percentile_ms(0.0).await, 0.0);
        // p = 1.0 clamps to the last element instead of running past the end
        assert_eq!(tracker.percentile_ms(1.0).await, 99.0);
    }

    #[tokio::test]
    async fn test_average_and_slow_count() {
        let tracker = HealthTracker::new(100, 5000.0);

        tracker.record_response_time("/api/questions", 100.0).await;
        tracker.record_response_time("/api/questions", 200.0).await;
        tracker.record_response_time("/api/questions", 6000.0).await;

        assert_eq!(tracker.average_ms().await, 2100.0);
        assert_eq!(tracker.slow_request_count(5000.0).await, 1);
        assert_eq!(tracker.slow_request_count(50.0).await, 3);
        assert_eq!(tracker.total_requests().await, 3);
    }

    #[tokio::test]
    async fn test_empty_tracker_returns_zeros() {
        let tracker = HealthTracker::new(100, 5000.0);

        assert_eq!(tracker.average_ms().await, 0.0);
        assert_eq!(tracker.percentile_ms(0.95).await, 0.0);
        assert_eq!(tracker.slow_request_count(1000.0).await, 0);
        assert_eq!(tracker.total_requests().await, 0);
    }

    #[tokio::test]
    async fn test_record_error_and_resource_updates() {
        let tracker = HealthTracker::new(100, 5000.0);

        tracker.record_error().await;
        tracker.record_error().await;
        tracker.set_cpu_percent(42.5).await;
        tracker.set_memory_percent(61.0).await;
        tracker.set_disk_percent(17.3).await;
        tracker.set_active_connections(8).await;

        let metrics = tracker.get_metrics().await;
        assert_eq!(metrics.error_count, 2);
        assert_eq!(metrics.cpu_percent, 42.5);
        assert_eq!(metrics.memory_percent, 61.0);
        assert_eq!(metrics.disk_percent, 17.3);
        assert_eq!(metrics.active_connections, 8);
    }

    #[tokio::test]
    async fn test_reset_metrics() {
        let tracker = HealthTracker::new(100, 5000.0);

        tracker.record_response_time("/api/questions", 120.0).await;
        tracker.record_error().await;
        tracker.reset_metrics().await;

        let metrics = tracker.get_metrics().await;
        assert!(metrics.response_times.is_empty());
        assert_eq!(metrics.error_count, 0);
    }
}
