use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::MonitorError;
use crate::store::{MetricSample, MetricStore, TableSize};

/// In-memory metric store
///
/// Reference implementation of [`MetricStore`] used by the dry-run binary
/// and tests. Holds every inserted sample in insertion order and supports
/// toggling availability to exercise the storage failure paths.
pub struct InMemoryMetricStore {
    samples: Arc<RwLock<Vec<MetricSample>>>,
    active_sessions: Arc<RwLock<u32>>,
    available: Arc<RwLock<bool>>,
}

impl InMemoryMetricStore {
    pub fn new() -> Self {
        Self {
            samples: Arc::new(RwLock::new(Vec::new())),
            active_sessions: Arc::new(RwLock::new(0)),
            available: Arc::new(RwLock::new(true)),
        }
    }

    /// Mark the store as reachable or unreachable; while unreachable,
    /// every call fails with `StorageUnavailable`
    pub async fn set_available(&self, available: bool) {
        let mut flag = self.available.write().await;
        *flag = available;
    }

    /// Set the active session count returned by the aggregate read
    pub async fn set_active_sessions(&self, count: u32) {
        let mut sessions = self.active_sessions.write().await;
        *sessions = count;
    }

    /// All stored samples, oldest first
    pub async fn samples(&self) -> Vec<MetricSample> {
        let samples = self.samples.read().await;
        samples.clone()
    }

    /// Stored samples matching a metric name, oldest first
    pub async fn samples_named(&self, name: &str) -> Vec<MetricSample> {
        let samples = self.samples.read().await;
        samples.iter().filter(|s| s.name == name).cloned().collect()
    }

    /// Total number of stored samples
    pub async fn sample_count(&self) -> usize {
        let samples = self.samples.read().await;
        samples.len()
    }

    async fn check_available(&self) -> Result<(), MonitorError> {
        let available = self.available.read().await;
        if *available {
            Ok(())
        } else {
            Err(MonitorError::StorageUnavailable(
                "in-memory store marked unavailable".to_string(),
            ))
        }
    }
}

impl Default for InMemoryMetricStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricStore for InMemoryMetricStore {
    async fn insert_metric(
        &self,
        name: &str,
        value: f64,
        unit: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), MonitorError> {
        self.check_available().await?;

        let mut samples = self.samples.write().await;
        samples.push(MetricSample {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            recorded_at,
        });

        Ok(())
    }

    async fn top_tables_by_size(&self, limit: usize) -> Result<Vec<TableSize>, MonitorError> {
        self.check_available().await?;

        let samples = self.samples.read().await;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for sample in samples.iter() {
            *counts.entry(sample.name.clone()).or_insert(0) += 1;
        }

        let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);

        Ok(entries
            .into_iter()
            .map(|(name, count)| TableSize {
                name,
                size: format!("{} samples", count),
            })
            .collect())
    }

    async fn active_connection_count(&self) -> Result<u32, MonitorError> {
        self.check_available().await?;

        let sessions = self.active_sessions.read().await;
        Ok(*sessions)
    }

    async fn database_size_label(&self) -> Result<String, MonitorError> {
        self.check_available().await?;

        let samples = self.samples.read().await;
        Ok(format!("{} samples", samples.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let store = InMemoryMetricStore::new();

        assert_ok!(
            store
                .insert_metric("cpu_percent", 42.0, "percent", Utc::now())
                .await
        );
        assert_ok!(
            store
                .insert_metric("memory_percent", 61.5, "percent", Utc::now())
                .await
        );

        assert_eq!(store.sample_count().await, 2);
        let cpu_samples = store.samples_named("cpu_percent").await;
        assert_eq!(cpu_samples.len(), 1);
        assert_eq!(cpu_samples[0].value, 42.0);
        assert_eq!(cpu_samples[0].unit, "percent");
    }

    #[tokio::test]
    async fn test_unavailable_store_rejects_all_calls() {
        let store = InMemoryMetricStore::new();
        store.set_available(false).await;

        assert_err!(
            store
                .insert_metric("cpu_percent", 42.0, "percent", Utc::now())
                .await
        );
        assert_err!(store.top_tables_by_size(5).await);
        assert_err!(store.active_connection_count().await);
        assert_err!(store.database_size_label().await);

        // Nothing was stored while unavailable
        store.set_available(true).await;
        assert_eq!(store.sample_count().await, 0);
    }

    #[tokio::test]
    async fn test_top_tables_sorted_by_count() {
        let store = InMemoryMetricStore::new();

        for _ in 0..3 {
            store
                .insert_metric("cpu_percent", 10.0, "percent", Utc::now())
                .await
                .unwrap();
        }
        store
            .insert_metric("disk_percent", 55.0, "percent", Utc::now())
            .await
            .unwrap();

        let tables = store.top_tables_by_size(5).await.unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "cpu_percent");
        assert_eq!(tables[0].size, "3 samples");
        assert_eq!(tables[1].name, "disk_percent");

        // The limit truncates the result
        let tables = store.top_tables_by_size(1).await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "cpu_percent");
    }

    #[tokio::test]
    async fn test_active_sessions() {
        let store = InMemoryMetricStore::new();
        assert_eq!(store.active_connection_count().await.unwrap(), 0);

        store.set_active_sessions(7).await;
        assert_eq!(store.active_connection_count().await.unwrap(), 7);
    }
}
