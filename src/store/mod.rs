pub mod memory;

pub use memory::InMemoryMetricStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// A single named metric observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub recorded_at: DateTime<Utc>,
}

/// A named dataset and its human-readable storage footprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSize {
    pub name: String,
    pub size: String,
}

/// Persistence sink for metric samples, plus the aggregate reads the
/// health API builds on
///
/// Every method is treated as a fallible remote call; callers bound each
/// call with a timeout and degrade gracefully on failure.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Append one metric sample
    async fn insert_metric(
        &self,
        name: &str,
        value: f64,
        unit: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), MonitorError>;

    /// Up to `limit` largest named datasets by storage footprint,
    /// largest first
    ///
    /// Backends without size accounting return an empty list rather
    /// than failing.
    async fn top_tables_by_size(&self, limit: usize) -> Result<Vec<TableSize>, MonitorError>;

    /// Number of currently active backend sessions
    async fn active_connection_count(&self) -> Result<u32, MonitorError>;

    /// Human-readable total storage size
    async fn database_size_label(&self) -> Result<String, MonitorError>;
}
