use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::AlertThresholds;
use crate::error::MonitorError;
use crate::metrics::HealthTracker;
use crate::probe::DependencyProber;
use crate::store::{MetricStore, TableSize};
use crate::thresholds::ThresholdEngine;

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Current resource utilization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub active_connections: u32,
}

/// Point-in-time health view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub metrics: ResourceMetrics,
    pub thresholds: AlertThresholds,
}

/// Aggregates over the retained response time window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub average_response_time_ms: f64,
    pub slow_request_count: usize,
    pub total_requests: usize,
    pub p95_response_time_ms: f64,
}

/// Storage-side metrics, reported best-effort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseMetrics {
    /// "ok" when every storage read succeeded, "error" otherwise
    pub status: String,
    pub database_size: String,
    pub active_connections: u32,
    pub largest_tables: Vec<TableSize>,
}

/// Composite health report combining every monitored surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealth {
    pub overall_status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub system_metrics: ResourceMetrics,
    pub performance_metrics: PerformanceSummary,
    pub database_metrics: DatabaseMetrics,
    pub external_services: HashMap<String, bool>,
}

/// Read-side health API
///
/// Pure composition over the shared metrics, the threshold engine, the
/// metric store, and the dependency prober. Safe to call concurrently and
/// frequently; never blocks on the scheduler. As long as the process is
/// alive these methods return a report, storage and dependencies down or
/// not.
pub struct HealthMonitor {
    tracker: Arc<HealthTracker>,
    engine: ThresholdEngine,
    prober: DependencyProber,
    store: Arc<dyn MetricStore>,
    store_timeout: Duration,
}

impl HealthMonitor {
    pub fn new(
        tracker: Arc<HealthTracker>,
        engine: ThresholdEngine,
        prober: DependencyProber,
        store: Arc<dyn MetricStore>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            tracker,
            engine,
            prober,
            store,
            store_timeout,
        }
    }

    /// Current status and resource readings
    pub async fn snapshot(&self) -> HealthSnapshot {
        let metrics = self.tracker.get_metrics().await;
        let status = if self.engine.is_healthy(&metrics) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        HealthSnapshot {
            status,
            timestamp: Utc::now(),
            metrics: ResourceMetrics {
                cpu_percent: metrics.cpu_percent,
                memory_percent: metrics.memory_percent,
                disk_percent: metrics.disk_percent,
                active_connections: metrics.active_connections,
            },
            thresholds: self.engine.thresholds().clone(),
        }
    }

    /// Aggregates over the retained response times; all zeros when
    /// nothing has been recorded yet
    pub async fn performance_summary(&self) -> PerformanceSummary {
        let slow_threshold = self.engine.thresholds().response_time_ms;

        PerformanceSummary {
            average_response_time_ms: self.tracker.average_ms().await,
            slow_request_count: self.tracker.slow_request_count(slow_threshold).await,
            total_requests: self.tracker.total_requests().await,
            p95_response_time_ms: self.tracker.percentile_ms(0.95).await,
        }
    }

    /// Storage-side metrics; any failed read yields `status: "error"`
    /// with zeroed fields instead of an error
    pub async fn database_metrics(&self) -> DatabaseMetrics {
        match self.read_database_metrics().await {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!("Database metrics unavailable: {}", e);
                DatabaseMetrics {
                    status: "error".to_string(),
                    database_size: "unknown".to_string(),
                    active_connections: 0,
                    largest_tables: Vec::new(),
                }
            }
        }
    }

    /// Reachability of every configured external dependency
    pub async fn check_dependencies(&self) -> HashMap<String, bool> {
        self.prober.check_all().await
    }

    /// One composite report: status, resources, request performance,
    /// storage metrics, and dependency reachability
    pub async fn detailed_health(&self) -> DetailedHealth {
        let snapshot = self.snapshot().await;
        let performance_metrics = self.performance_summary().await;
        let database_metrics = self.database_metrics().await;
        let external_services = self.prober.check_all().await;

        DetailedHealth {
            overall_status: snapshot.status,
            timestamp: snapshot.timestamp,
            system_metrics: snapshot.metrics,
            performance_metrics,
            database_metrics,
            external_services,
        }
    }

    async fn read_database_metrics(&self) -> Result<DatabaseMetrics, MonitorError> {
        let database_size = self.store_call(self.store.database_size_label()).await?;
        let active_connections = self.store_call(self.store.active_connection_count()).await?;
        let largest_tables = self.store_call(self.store.top_tables_by_size(5)).await?;

        Ok(DatabaseMetrics {
            status: "ok".to_string(),
            database_size,
            active_connections,
            largest_tables,
        })
    }

    async fn store_call<T>(
        &self,
        call: impl Future<Output = Result<T, MonitorError>>,
    ) -> Result<T, MonitorError> {
        match timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(MonitorError::StorageUnavailable(format!(
                "store call timed out after {:?}",
                self.store_timeout
            ))),
        }
    }
}
